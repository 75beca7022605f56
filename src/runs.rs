//! Per-session run tracking
//!
//! Each extraction for a session takes a fresh token. When settings change and
//! the client re-triggers, the older run's token goes stale and its result is
//! dropped instead of reaching the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Latest token issued for a session
struct SessionEntry {
    token: u64,
    touched_at: Instant,
}

/// Handle for one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    session: Option<String>,
    token: u64,
}

impl RunTicket {
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

pub struct RunTracker {
    ttl: Duration,
    /// Monotonic across all sessions, so a pruned and re-created session
    /// never reissues an old token
    next_token: AtomicU64,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl RunTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_token: AtomicU64::new(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a run, superseding any earlier run of the same session
    ///
    /// Runs without a session are independent and never go stale.
    pub async fn begin(&self, session: Option<&str>) -> RunTicket {
        let Some(session) = session else {
            return RunTicket {
                session: None,
                token: 0,
            };
        };

        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        sessions.retain(|_, entry| now.duration_since(entry.touched_at) <= self.ttl);

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        sessions.insert(
            session.to_string(),
            SessionEntry {
                token,
                touched_at: now,
            },
        );

        RunTicket {
            session: Some(session.to_string()),
            token,
        }
    }

    /// Whether `ticket` is still the newest run of its session
    pub async fn is_current(&self, ticket: &RunTicket) -> bool {
        let Some(session) = &ticket.session else {
            return true;
        };

        let sessions = self.sessions.read().await;
        // An expired-and-pruned session has no newer run either
        sessions
            .get(session)
            .map_or(true, |entry| entry.token == ticket.token)
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newer_run_supersedes() {
        let tracker = RunTracker::new(Duration::from_secs(60));
        let first = tracker.begin(Some("mural-1")).await;
        assert!(tracker.is_current(&first).await);

        let second = tracker.begin(Some("mural-1")).await;
        assert!(!tracker.is_current(&first).await);
        assert!(tracker.is_current(&second).await);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let tracker = RunTracker::new(Duration::from_secs(60));
        let a = tracker.begin(Some("a")).await;
        let _b = tracker.begin(Some("b")).await;
        assert!(tracker.is_current(&a).await);
        assert_eq!(tracker.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_anonymous_runs_never_stale() {
        let tracker = RunTracker::new(Duration::from_secs(60));
        let first = tracker.begin(None).await;
        let _second = tracker.begin(None).await;
        assert!(tracker.is_current(&first).await);
        assert_eq!(first.session(), None);
        assert_eq!(tracker.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_pruned() {
        let tracker = RunTracker::new(Duration::ZERO);
        let _old = tracker.begin(Some("old")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _new = tracker.begin(Some("new")).await;
        assert_eq!(tracker.session_count().await, 1);
    }
}
