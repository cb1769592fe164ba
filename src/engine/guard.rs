//! Per-session submission guard
//!
//! At most one turn-advance may be in flight per session. A second attempt
//! while one is running is rejected immediately rather than queued; the
//! permit is released unconditionally when the in-flight call finishes, so a
//! failed generator call can never wedge a session. Scoped per session id:
//! different sessions never contend.

use std::collections::HashSet;
use std::sync::Mutex;

/// Mutual-exclusion gate keyed by session id
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to admit a turn-advance for the session. Returns `None` when one
    /// is already in flight; the returned permit releases the session on
    /// drop.
    pub fn try_acquire(&self, session_id: &str) -> Option<SubmissionPermit<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if in_flight.insert(session_id.to_string()) {
            Some(SubmissionPermit {
                guard: self,
                session_id: session_id.to_string(),
            })
        } else {
            None
        }
    }

    fn release(&self, session_id: &str) {
        self.in_flight.lock().unwrap().remove(session_id);
    }
}

/// RAII permit for one in-flight turn-advance
#[must_use = "dropping the permit releases the session immediately"]
pub struct SubmissionPermit<'a> {
    guard: &'a SubmissionGuard,
    session_id: String,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        self.guard.release(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_rejected_while_held() {
        let guard = SubmissionGuard::new();

        let permit = guard.try_acquire("sess-1");
        assert!(permit.is_some());
        assert!(guard.try_acquire("sess-1").is_none());

        drop(permit);
        assert!(guard.try_acquire("sess-1").is_some());
    }

    #[test]
    fn test_sessions_do_not_contend() {
        let guard = SubmissionGuard::new();

        let _a = guard.try_acquire("sess-a").unwrap();
        let _b = guard.try_acquire("sess-b").unwrap();
        assert!(guard.try_acquire("sess-a").is_none());
        assert!(guard.try_acquire("sess-b").is_none());
    }

    #[test]
    fn test_release_on_early_return() {
        let guard = SubmissionGuard::new();

        // Simulates a failed turn: the permit drops with the error path
        let failing = |guard: &SubmissionGuard| -> Result<(), ()> {
            let _permit = guard.try_acquire("sess-1").ok_or(())?;
            Err(())
        };
        assert!(failing(&guard).is_err());
        assert!(guard.try_acquire("sess-1").is_some());
    }
}
