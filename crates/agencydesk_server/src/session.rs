//! Per-request caller identity taken from proxy-set headers.

use agencydesk_core::constants::{EMAIL_HEADER, USER_HEADER};
use agencydesk_core::{Identity, SessionProvider};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use std::convert::Infallible;

/// Session resolved from `x-agencydesk-user` / `x-agencydesk-email`.
///
/// The fronting auth proxy is expected to set (and strip client-supplied)
/// copies of these headers. A missing or blank user header means anonymous.
#[derive(Debug, Clone, Default)]
pub struct HeaderSession {
    identity: Option<Identity>,
}

impl HeaderSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let identity = header(USER_HEADER).map(|user_id| {
            let identity = Identity::new(user_id);
            match header(EMAIL_HEADER) {
                Some(email) => identity.with_email(email),
                None => identity,
            }
        });
        Self { identity }
    }
}

impl SessionProvider for HeaderSession {
    fn current_user(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for HeaderSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
