//! Round-robin multi-key credential pool with per-key cooldown and disable.
//!
//! Bookkeeping is process-global state guarded by a mutex (one pool is shared
//! across every concurrent worker via `Arc<LlmClient>`), matching how the
//! rest of this workspace shares long-lived state across `tokio::spawn`ed
//! tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct KeyState {
    key: String,
    disabled: bool,
    cooldown_until: Option<Instant>,
}

/// A pool of API credentials rotated round-robin, with per-key cooldown
/// after a rate-limit/quota error and permanent disable after an auth error.
pub struct CredentialPool {
    keys: Mutex<Vec<KeyState>>,
    cursor: AtomicUsize,
    cooldown: Duration,
}

impl CredentialPool {
    /// Builds a pool from a non-empty list of keys.
    #[must_use]
    pub fn new(keys: Vec<String>, cooldown: Duration) -> Self {
        let keys =
            keys.into_iter().map(|key| KeyState { key, disabled: false, cooldown_until: None }).collect();
        Self { keys: Mutex::new(keys), cursor: AtomicUsize::new(0), cooldown }
    }

    /// Number of keys in the pool, usable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Picks the next usable key, advancing the round-robin cursor past it.
    /// Returns `None` if every key is disabled or cooling down.
    pub fn acquire(&self) -> Option<String> {
        let mut keys = self.keys.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();
        let len = keys.len();
        for _ in 0..len {
            let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % len;
            let state = &mut keys[idx];
            if state.disabled {
                continue;
            }
            if let Some(until) = state.cooldown_until {
                if now < until {
                    continue;
                }
                state.cooldown_until = None;
            }
            return Some(state.key.clone());
        }
        None
    }

    /// Marks `key` as cooling down for the pool's configured cooldown window.
    pub fn cool_down(&self, key: &str) {
        let mut keys = self.keys.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(state) = keys.iter_mut().find(|s| s.key == key) {
            state.cooldown_until = Some(Instant::now() + self.cooldown);
        }
    }

    /// Permanently disables `key`; never returned by `acquire` again.
    pub fn disable(&self, key: &str) {
        let mut keys = self.keys.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(state) = keys.iter_mut().find(|s| s.key == key) {
            state.disabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_round_robin() {
        let pool = CredentialPool::new(
            vec!["a".to_owned(), "b".to_owned()],
            Duration::from_secs(60),
        );
        let first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn cooled_down_key_is_skipped_until_it_warms() {
        let pool = CredentialPool::new(vec!["a".to_owned()], Duration::from_millis(20));
        pool.cool_down("a");
        assert_eq!(pool.acquire(), None);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(pool.acquire().as_deref(), Some("a"));
    }

    #[test]
    fn disabled_key_never_returns() {
        let pool = CredentialPool::new(vec!["a".to_owned()], Duration::from_secs(60));
        pool.disable("a");
        assert_eq!(pool.acquire(), None);
    }

    #[test]
    fn all_cold_returns_none() {
        let pool = CredentialPool::new(
            vec!["a".to_owned(), "b".to_owned()],
            Duration::from_secs(60),
        );
        pool.cool_down("a");
        pool.cool_down("b");
        assert_eq!(pool.acquire(), None);
    }
}
