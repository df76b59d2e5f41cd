use std::collections::VecDeque;

use tracing::warn;

use super::Task;

/// Bounded FIFO of pending tasks.
///
/// Pushing past capacity evicts the oldest entry rather than rejecting the
/// new one.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
    max_size: usize,
}

impl TaskQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max_size,
        }
    }

    pub fn push(&mut self, task: Task) {
        self.queue.push_back(task);
        if self.queue.len() > self.max_size {
            if let Some(dropped) = self.queue.pop_front() {
                warn!(task_id = %dropped.id, "Queue full, dropped oldest task");
            }
        }
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q = TaskQueue::new(10);
        q.push(Task::new("first"));
        q.push(Task::new("second"));
        assert_eq!(q.pop().unwrap().text, "first");
        assert_eq!(q.pop().unwrap().text, "second");
        assert!(q.pop().is_none());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut q = TaskQueue::new(2);
        q.push(Task::new("a"));
        q.push(Task::new("b"));
        q.push(Task::new("c"));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().unwrap().text, "b");
        assert_eq!(q.pop().unwrap().text, "c");
    }

    #[test]
    fn test_clear() {
        let mut q = TaskQueue::new(5);
        q.push(Task::new("a"));
        q.clear();
        assert!(q.is_empty());
    }
}
