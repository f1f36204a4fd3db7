//! Bounded run-to-completion task queue.
//!
//! Two producers feed the queue: the scan timer and the peer link's receive
//! callback. A single consumer drains it in FIFO order. Scan requests are
//! coalesced through a single pending flag, so a slow consumer never sees
//! scans stacking up behind each other.

use heapless::Deque;

use crate::config::QUEUE_DEPTH;
use crate::error::Fault;
use crate::link::SyncMessage;

/// One unit of pipeline work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    /// Scan the matrix once.
    Scan,
    /// Translate held keys, then build a report.
    Translate,
    /// Build and send a report from the current translation.
    Report,
    /// Apply a sync message received from the peer.
    Remote(SyncMessage),
}

pub struct TaskQueue {
    tasks: Deque<Task, QUEUE_DEPTH>,
    scan_pending: bool,
}

impl TaskQueue {
    pub const fn new() -> Self {
        Self {
            tasks: Deque::new(),
            scan_pending: false,
        }
    }

    /// Queue a scan unless one is already waiting.
    pub fn request_scan(&mut self) -> Result<(), Fault> {
        if self.scan_pending {
            tracing::trace!("scan already pending");
            return Ok(());
        }
        self.post(Task::Scan)?;
        self.scan_pending = true;
        Ok(())
    }

    /// Queue a task. A full queue means the consumer has fallen hopelessly
    /// behind, which is fatal.
    pub fn post(&mut self, task: Task) -> Result<(), Fault> {
        self.tasks.push_back(task).map_err(|_| {
            tracing::warn!("task queue full");
            Fault::QueueFull
        })
    }

    /// Next task in FIFO order.
    pub fn pop(&mut self) -> Option<Task> {
        let task = self.tasks.pop_front()?;
        if matches!(task, Task::Scan) {
            self.scan_pending = false;
        }
        Some(task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn scan_pending(&self) -> bool {
        self.scan_pending
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
