use crate::events::WindowId;
use std::collections::BTreeMap;
use std::fmt;

/// Handle of a scheduled task, unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<T> {
    pub owner: WindowId,
    pub task: T,
}

/// Cooperative deferred-task queue.
///
/// Tasks are plain data interpreted by whoever owns the scheduler. They run
/// once, in scheduling order, on the turn after they were queued: `take_due`
/// hands out only what was queued before the call, so work scheduled while
/// running a turn waits for the next one. Every task belongs to one window
/// and goes away with it through `cancel_owner`.
#[derive(Debug)]
pub struct RetryScheduler<T> {
    next_id: u64,
    tasks: BTreeMap<TaskId, Scheduled<T>>,
}

impl<T> Default for RetryScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RetryScheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            tasks: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, owner: WindowId, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, Scheduled { owner, task });
        id
    }

    /// Returns `false` if the task already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub fn cancel_owner(&mut self, owner: WindowId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, scheduled| scheduled.owner != owner);
        before - self.tasks.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.tasks.len();
        self.tasks.clear();
        cancelled
    }

    pub fn take_due(&mut self) -> Vec<Scheduled<T>> {
        std::mem::take(&mut self.tasks).into_values().collect()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    #[cfg(test)]
    pub fn pending_for(&self, owner: WindowId) -> usize {
        self.tasks.values().filter(|s| s.owner == owner).count()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
