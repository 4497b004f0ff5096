//! Render admission control.
//!
//! A bounded counter protects the scarce rendering resource. Submissions
//! over the ceiling are rejected outright (the ingress marks the job
//! failed), never queued. The counter is process-wide with no
//! persistence: it resets on restart, which is acceptable because
//! in-flight renders are also lost on restart.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Error message persisted to a job rejected at the admission ceiling.
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded: maximum concurrent render requests reached";

/// Bounded counter of in-flight renders.
#[derive(Debug)]
pub struct AdmissionController {
    active: AtomicUsize,
    ceiling: usize,
}

impl AdmissionController {
    pub fn new(ceiling: usize) -> Arc<Self> {
        Arc::new(Self {
            active: AtomicUsize::new(0),
            ceiling,
        })
    }

    /// Claim one render slot, or `None` when the ceiling is reached.
    ///
    /// The returned ticket releases the slot on drop, so release is
    /// unconditional for success, failure and panic alike.
    pub fn try_acquire(self: &Arc<Self>) -> Option<AdmissionTicket> {
        loop {
            let current = self.active.load(Ordering::SeqCst);
            if current >= self.ceiling {
                return None;
            }
            if self
                .active
                .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Some(AdmissionTicket {
                    controller: Arc::clone(self),
                });
            }
        }
    }

    /// Number of slots currently in use.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

/// One in-flight render slot.
#[derive(Debug)]
pub struct AdmissionTicket {
    controller: Arc<AdmissionController>,
}

impl Drop for AdmissionTicket {
    fn drop(&mut self) {
        self.controller.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_is_enforced() {
        let controller = AdmissionController::new(1);

        let ticket = controller.try_acquire();
        assert!(ticket.is_some());
        assert_eq!(controller.active(), 1);

        assert!(controller.try_acquire().is_none());
    }

    #[test]
    fn test_drop_releases_slot() {
        let controller = AdmissionController::new(1);

        let ticket = controller.try_acquire().unwrap();
        drop(ticket);

        assert_eq!(controller.active(), 0);
        assert!(controller.try_acquire().is_some());
    }

    #[test]
    fn test_release_on_panic() {
        let controller = AdmissionController::new(1);

        let result = std::panic::catch_unwind({
            let controller = Arc::clone(&controller);
            move || {
                let _ticket = controller.try_acquire().unwrap();
                panic!("job blew up");
            }
        });

        assert!(result.is_err());
        assert_eq!(controller.active(), 0);
    }

    #[test]
    fn test_multiple_slots() {
        let controller = AdmissionController::new(3);

        let t1 = controller.try_acquire().unwrap();
        let t2 = controller.try_acquire().unwrap();
        let _t3 = controller.try_acquire().unwrap();
        assert!(controller.try_acquire().is_none());

        drop(t1);
        drop(t2);
        assert_eq!(controller.active(), 1);
        assert!(controller.try_acquire().is_some());
    }
}
