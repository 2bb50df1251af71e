//! Scheduled continuations.
//!
//! Delays between an accepted action and its consequence (an enzyme finishing,
//! the ribosome shifting) are queued here as plain values, not callbacks. The
//! owner advances the clock and pops due tasks; every task has a handle that can
//! cancel it, and `cancel_all` empties the queue on restart so nothing from a
//! previous round can run in the next one.

use std::time::Duration;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

/// A logical clock with a queue of delayed tasks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Logical time since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queues `task` to run `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            task,
        });
        id
    }

    /// Cancels a task; returns it if it was still pending.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos).task)
    }

    /// Cancels every pending task; returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.task)
    }

    /// Time until the earliest task is due (zero if already due).
    pub fn until_next(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.due.saturating_sub(self.now))
            .min()
    }

    pub fn advance_clock(&mut self, step: Duration) {
        self.now += step;
    }

    /// Removes and returns the earliest due task; ties run in scheduling order.
    pub fn pop_due(&mut self) -> Option<T> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= self.now)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(pos, _)| pos)?;
        Some(self.entries.remove(pos).task)
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tasks_run_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(300), "late");
        scheduler.schedule(ms(100), "early");
        scheduler.schedule(ms(100), "early-second");

        assert_eq!(scheduler.until_next(), Some(ms(100)));
        assert_eq!(scheduler.pop_due(), None);

        scheduler.advance_clock(ms(100));
        assert_eq!(scheduler.pop_due(), Some("early"));
        assert_eq!(scheduler.pop_due(), Some("early-second"));
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.until_next(), Some(ms(200)));

        scheduler.advance_clock(ms(500));
        assert_eq!(scheduler.until_next(), Some(Duration::ZERO));
        assert_eq!(scheduler.pop_due(), Some("late"));
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.schedule(ms(10), 1);
        let _b = scheduler.schedule(ms(10), 2);
        assert_eq!(scheduler.cancel(a), Some(1));
        assert_eq!(scheduler.cancel(a), None);
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.cancel_all(), 1);
        scheduler.advance_clock(ms(100));
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.until_next(), None);
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_clock(ms(1000));
        scheduler.schedule(ms(500), ());
        assert_eq!(scheduler.until_next(), Some(ms(500)));
        assert_eq!(scheduler.now(), ms(1000));
    }
}
