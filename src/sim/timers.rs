//! Deferred callbacks
//!
//! Boost/penalty reversions and marker expiry run some time after the event
//! that caused them, possibly between frames. Every entry is stamped with the
//! epoch that was current when it was scheduled; bumping the epoch (reset,
//! dispose) makes all older entries inert.

/// Work to run when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Leave Boosted if the boost is still the latest speed request
    EndBoost { generation: u64 },
    /// Enter Penalized if no newer speed request arrived meanwhile
    BeginPenalty { generation: u64 },
    /// Leave Penalized if the penalty is still the latest speed request
    EndPenalty { generation: u64 },
    /// Remove a feedback marker
    ExpireMarker { id: u32 },
}

/// Handle for cancelling a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Scheduled {
    due: f64,
    epoch: u64,
    seq: u64,
    action: DeferredAction,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    entries: Vec<Scheduled>,
    epoch: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run `delay` seconds after `now`
    pub fn schedule(&mut self, now: f64, delay: f32, action: DeferredAction) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            due: now + f64::from(delay.max(0.0)),
            epoch: self.epoch,
            seq,
            action,
        });
        TimerHandle(seq)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.seq != handle.0);
        self.entries.len() != before
    }

    /// Invalidate everything scheduled so far
    pub fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    /// Drop every entry outright
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from the current epoch still waiting to fire
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| e.epoch == self.epoch).count()
    }

    /// Remove and return the earliest entry due at `now`, with its due time.
    /// Stale entries are discarded along the way.
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, DeferredAction)> {
        let epoch = self.epoch;
        let before = self.entries.len();
        self.entries.retain(|e| e.epoch == epoch);
        let stale = before - self.entries.len();
        if stale > 0 {
            log::trace!("Dropped {} stale timers", stale);
        }

        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .partial_cmp(&b.due)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(i, _)| i)?;

        let entry = self.entries.swap_remove(idx);
        Some((entry.due, entry.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(0.0, 2.0, DeferredAction::ExpireMarker { id: 2 });
        queue.schedule(0.0, 1.0, DeferredAction::ExpireMarker { id: 1 });

        assert_eq!(queue.pop_due(0.5), None);
        let (due, action) = queue.pop_due(5.0).unwrap();
        assert_eq!(due, 1.0);
        assert_eq!(action, DeferredAction::ExpireMarker { id: 1 });
        assert_eq!(
            queue.pop_due(5.0).map(|(_, a)| a),
            Some(DeferredAction::ExpireMarker { id: 2 })
        );
        assert_eq!(queue.pop_due(5.0), None);
    }

    #[test]
    fn test_epoch_bump_makes_entries_inert() {
        let mut queue = TimerQueue::new();
        queue.schedule(0.0, 0.3, DeferredAction::BeginPenalty { generation: 1 });
        assert_eq!(queue.pending(), 1);

        queue.bump_epoch();
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.pop_due(10.0), None);

        // New work after the bump still runs
        queue.schedule(0.0, 0.1, DeferredAction::EndBoost { generation: 2 });
        assert_eq!(
            queue.pop_due(10.0).map(|(_, a)| a),
            Some(DeferredAction::EndBoost { generation: 2 })
        );
    }

    #[test]
    fn test_cancel() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(0.0, 1.0, DeferredAction::ExpireMarker { id: 7 });
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert_eq!(queue.pop_due(2.0), None);
    }
}
