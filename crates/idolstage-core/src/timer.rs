//! Deferred continuations on a simulated clock.
//!
//! Time never advances on its own: the host (browser timeout, simulator,
//! test) calls [`TimerQueue::pop_due`] with the current time. Entries due at
//! the same instant fire in scheduling order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

/// Handle used to cancel a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A scheduled continuation
#[derive(Debug)]
struct Scheduled<T> {
    /// When the entry should run, relative to stage start
    due: Duration,
    /// Unique id, also the FIFO tiebreaker
    id: TimerId,
    payload: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (earliest first, then lowest id)
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Min-heap of pending continuations with lazy cancellation
#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BinaryHeap<Scheduled<T>>,
    live: HashSet<TimerId>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
        }
    }

    /// Schedule `payload` to run at absolute time `due`.
    pub fn schedule_at(&mut self, due: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.entries.push(Scheduled { due, id, payload });
        id
    }

    /// Cancel a pending entry. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains(&id)
    }

    /// Number of entries that will still run
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Deadline of the earliest live entry
    pub fn next_due(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.entries.peek().map(|e| e.due)
    }

    /// Remove and return the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerId, T)> {
        self.discard_cancelled();
        if self.entries.peek()?.due > now {
            return None;
        }
        let entry = self.entries.pop()?;
        self.live.remove(&entry.id);
        Some((entry.due, entry.id, entry.payload))
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.entries.peek() {
            if self.live.contains(&top.id) {
                break;
            }
            self.entries.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_earliest_first() {
        let mut q = TimerQueue::new();
        q.schedule_at(ms(300), "late");
        q.schedule_at(ms(10), "early");
        assert_eq!(q.next_due(), Some(ms(10)));
        assert!(q.pop_due(ms(5)).is_none());
        assert_eq!(q.pop_due(ms(10)).map(|e| e.2), Some("early"));
        assert_eq!(q.pop_due(ms(1000)).map(|e| e.2), Some("late"));
        assert!(q.is_empty());
    }

    #[test]
    fn test_same_deadline_is_fifo() {
        let mut q = TimerQueue::new();
        for n in 0..5 {
            q.schedule_at(ms(100), n);
        }
        let order: Vec<i32> = std::iter::from_fn(|| q.pop_due(ms(100)).map(|e| e.2)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        let a = q.schedule_at(ms(10), 'a');
        q.schedule_at(ms(20), 'b');
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(ms(20)));
        assert_eq!(q.pop_due(ms(50)).map(|e| e.2), Some('b'));
    }

    #[test]
    fn test_cancel_after_run_is_noop() {
        let mut q = TimerQueue::new();
        let a = q.schedule_at(ms(0), ());
        assert!(q.pop_due(ms(0)).is_some());
        assert!(!q.is_pending(a));
        assert!(!q.cancel(a));
    }
}
