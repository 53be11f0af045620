//! Scoped environment overrides for tests that exercise `Config::from_env`
//! and the binaries' env handling.
//!
//! The process environment is shared by every test thread, so callers hold
//! [`env_lock`] for as long as their [`EnvGuard`]s live.

use std::sync::{Mutex, OnceLock};

/// Lock that every env-mutating test takes first.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Write or clear `key`. `None` removes it.
#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock`, so no other test thread touches the
    // environment concurrently.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// One overridden variable; the value seen before the override comes back on
/// drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    /// Override `key` with `value`, e.g. `PORT` or `ADESK_SERVER`.
    pub fn set(key: &str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    /// Hide `key` so defaults apply.
    pub fn remove(key: &str) -> Self {
        Self::replace(key, None)
    }

    fn replace(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(&self.key, self.previous.as_deref());
    }
}
