//! Virtual timer queue
//!
//! Simulated millisecond clock holding the timers armed through [`TimerPlan`]s.
//! Advancing the clock yields due timers in firing order; the caller feeds each
//! one back to the engine.

use super::{TimerPlan, TimerToken};
use crate::controls::BindingId;

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    binding: BindingId,
    token: TimerToken,
}

#[derive(Debug, Default)]
pub struct VirtualTimers {
    now_ms: u64,
    seq: u64,
    pending: Vec<Scheduled>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Apply a plan produced for `binding`
    pub fn apply(&mut self, binding: BindingId, plan: TimerPlan) {
        if let Some(token) = plan.cancel {
            self.pending
                .retain(|s| !(s.binding == binding && s.token == token));
        }
        if let Some(arm) = plan.arm {
            self.seq += 1;
            self.pending.push(Scheduled {
                due_ms: self.now_ms + u64::from(arm.delay_ms),
                seq: self.seq,
                binding,
                token: arm.token,
            });
        }
    }

    /// Timers still pending for `binding`
    pub fn pending(&self, binding: BindingId) -> usize {
        self.pending.iter().filter(|s| s.binding == binding).count()
    }

    /// Absolute due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.due_ms).min()
    }

    /// Advance the clock by `ms` and drain every timer due by then, ordered by
    /// due time and then arming order.
    ///
    /// Timers armed while handling the returned entries are not included; step
    /// in smaller increments when that matters.
    pub fn advance(&mut self, ms: u64) -> Vec<(BindingId, TimerToken)> {
        let target = self.now_ms + ms;
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= target {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due_ms, s.seq));
        self.now_ms = target;
        due.into_iter().map(|s| (s.binding, s.token)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::ArmTimer;

    fn arm(token: u64, delay_ms: u32) -> TimerPlan {
        TimerPlan {
            cancel: None,
            arm: Some(ArmTimer {
                token: TimerToken::new(token),
                delay_ms,
            }),
        }
    }

    #[test]
    fn fires_in_due_order() {
        let mut timers = VirtualTimers::new();
        let a = BindingId::new(1);
        let b = BindingId::new(2);
        timers.apply(a, arm(1, 300));
        timers.apply(b, arm(2, 100));

        assert_eq!(timers.next_due(), Some(100));
        assert!(timers.advance(99).is_empty());
        assert_eq!(timers.advance(1), vec![(b, TimerToken::new(2))]);
        assert_eq!(timers.advance(500), vec![(a, TimerToken::new(1))]);
        assert_eq!(timers.now_ms(), 600);
    }

    #[test]
    fn cancel_removes_only_matching_token() {
        let mut timers = VirtualTimers::new();
        let a = BindingId::new(1);
        timers.apply(a, arm(1, 100));
        timers.apply(
            a,
            TimerPlan {
                cancel: Some(TimerToken::new(1)),
                arm: Some(ArmTimer {
                    token: TimerToken::new(2),
                    delay_ms: 50,
                }),
            },
        );

        assert_eq!(timers.pending(a), 1);
        assert_eq!(timers.advance(1000), vec![(a, TimerToken::new(2))]);
    }
}
