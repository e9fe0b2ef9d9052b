//! Deferred last-shot check
//!
//! A single scheduled check stored as plain data on the level state. Due
//! times are in simulated seconds, so the delay holds at any timestep. It is
//! keyed to the attempt that scheduled it, so a restart invalidates it even
//! if the caller forgets to cancel.

use serde::{Deserialize, Serialize};

/// A check due at a given simulation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeferredCheck {
    /// Attempt that scheduled the check
    pub attempt: u32,
    /// Simulated time (seconds) at which the check runs
    pub due_time: f32,
}

/// Result of polling a deferred check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPoll {
    /// Nothing scheduled
    Idle,
    /// Scheduled but not yet due
    Pending,
    /// Due now for the current attempt
    Due,
    /// Belonged to an earlier attempt and was dropped
    Stale,
}

/// Slot holding at most one scheduled check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSlot {
    check: Option<DeferredCheck>,
}

impl CheckSlot {
    /// Schedule a check, replacing any previous one
    pub fn schedule(&mut self, attempt: u32, now: f32, delay_secs: f32) {
        self.check = Some(DeferredCheck {
            attempt,
            due_time: now + delay_secs,
        });
    }

    pub fn cancel(&mut self) {
        self.check = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.check.is_some()
    }

    /// Poll at the current time; a due or stale check is consumed
    pub fn poll(&mut self, attempt: u32, now: f32) -> CheckPoll {
        match self.check {
            None => CheckPoll::Idle,
            Some(check) if check.attempt != attempt => {
                self.check = None;
                CheckPoll::Stale
            }
            Some(check) if now >= check.due_time => {
                self.check = None;
                CheckPoll::Due
            }
            Some(_) => CheckPoll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_when_due() {
        let mut slot = CheckSlot::default();
        slot.schedule(1, 0.5, 2.0);
        assert_eq!(slot.poll(1, 1.0), CheckPoll::Pending);
        assert_eq!(slot.poll(1, 2.5), CheckPoll::Due);
        assert_eq!(slot.poll(1, 2.6), CheckPoll::Idle);
    }

    #[test]
    fn test_stale_attempt_is_dropped() {
        let mut slot = CheckSlot::default();
        slot.schedule(1, 0.0, 2.0);
        assert_eq!(slot.poll(2, 3.0), CheckPoll::Stale);
        assert!(!slot.is_scheduled());
    }

    #[test]
    fn test_cancel() {
        let mut slot = CheckSlot::default();
        slot.schedule(3, 0.0, 2.0);
        slot.cancel();
        assert_eq!(slot.poll(3, 3.0), CheckPoll::Idle);
    }
}
