//! At-most-one-in-flight submission per form.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag shared by a form's submissions.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    busy: Arc<AtomicBool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the form, or `None` while another submission holds it.
    pub fn try_begin(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one submission; releases the form on drop,
/// whatever the outcome.
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected() {
        let guard = SubmissionGuard::new();
        let first = guard.try_begin();
        assert!(first.is_some());
        assert!(guard.is_busy());
        assert!(guard.try_begin().is_none());

        drop(first);
        assert!(!guard.is_busy());
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn test_released_on_error_path() {
        let guard = SubmissionGuard::new();
        let run = || -> Result<(), &'static str> {
            let _token = guard.try_begin().ok_or("busy")?;
            Err("remote failure")
        };
        assert_eq!(run(), Err("remote failure"));
        assert!(!guard.is_busy());
    }
}
