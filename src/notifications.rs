//! Notification queue (§4.8 of spec.md): a FIFO of `(method, params_json)`
//! pairs, ownership transferred on drain.

use std::collections::VecDeque;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: &'static str,
    pub params: Value,
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, method: &'static str, params: Value) {
        self.queue.push_back(Notification { method, params });
    }

    /// Snapshot and clear the queue in one step.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fifo_order_preserved() {
        let mut q = NotificationQueue::new();
        q.push("debug/stopped", json!({"threadId": 1}));
        q.push("debug/output", json!({"text": "hi"}));
        let drained = q.drain();
        assert_eq!(drained[0].method, "debug/stopped");
        assert_eq!(drained[1].method, "debug/output");
    }

    #[test]
    fn drain_clears_the_queue() {
        let mut q = NotificationQueue::new();
        q.push("debug/terminated", Value::Null);
        let _ = q.drain();
        assert!(q.is_empty());
        assert!(q.drain().is_empty());
    }
}
