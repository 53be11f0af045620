//! Caller identity as reported by the session provider.

use serde::{Deserialize, Serialize};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Source of the current caller identity.
///
/// Every owner-scoped action asks the provider first and refuses to run when it
/// returns `None`.
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
}

/// Fixed session, used by embedded clients and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    identity: Option<Identity>,
}

impl StaticSession {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

impl SessionProvider for Option<Identity> {
    fn current_user(&self) -> Option<Identity> {
        self.clone()
    }
}
