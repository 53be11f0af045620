//! Status banner and toast queue shared by the page controllers.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const STATUS_TTL: Duration = Duration::from_secs(5);
pub const TOAST_TTL: Duration = Duration::from_secs(4);
pub const TOAST_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub text: String,
    pub expires_at: Instant,
}

/// Per-page feedback state. Rejected actions land here verbatim.
#[derive(Debug, Default)]
pub struct Feedback {
    status: Option<StatusMessage>,
    toasts: VecDeque<ToastMessage>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status banner message and mirrors it into the toast queue.
    pub fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.status = Some(StatusMessage {
            text: text.clone(),
            expires_at: Instant::now() + STATUS_TTL,
        });
        self.push_toast(text);
    }

    fn push_toast(&mut self, text: String) {
        let now = Instant::now();
        if let Some(last) = self.toasts.back_mut() {
            if last.text == text {
                last.expires_at = now + TOAST_TTL;
                return;
            }
        }
        self.toasts.push_back(ToastMessage {
            text,
            expires_at: now + TOAST_TTL,
        });
        while self.toasts.len() > TOAST_LIMIT {
            self.toasts.pop_front();
        }
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Drops expired banner and toasts as of `now`.
    pub fn expire(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.expires_at <= now)
        {
            self.status = None;
        }
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn toasts(&self) -> impl Iterator<Item = &ToastMessage> + '_ {
        self.toasts.iter()
    }
}
