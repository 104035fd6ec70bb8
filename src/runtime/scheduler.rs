//! Re-render queue.
//!
//! Setters never render inline. They enqueue the owning [`InstanceId`] here;
//! the runtime drains the queue once per tick and re-renders each queued
//! instance at most once.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use tokio::sync::Notify;

use super::store::InstanceId;

// ---------------------------------------------------------------------------
// RerenderQueue
// ---------------------------------------------------------------------------

/// FIFO of pending re-render requests with duplicate suppression.
#[derive(Debug, Default)]
struct RerenderQueue {
    order: VecDeque<InstanceId>,
    queued: HashSet<InstanceId>,
}

impl RerenderQueue {
    fn push(&mut self, id: InstanceId) -> bool {
        if self.queued.insert(id) {
            self.order.push_back(id);
            true
        } else {
            false
        }
    }

    fn drain(&mut self) -> Vec<InstanceId> {
        self.queued.clear();
        self.order.drain(..).collect()
    }
}

// ---------------------------------------------------------------------------
// SchedulerHandle
// ---------------------------------------------------------------------------

/// Shared handle to one runtime's re-render queue.
///
/// Every setter holds a clone. Cloning is cheap.
#[derive(Clone, Default)]
pub struct SchedulerHandle {
    queue: Rc<RefCell<RerenderQueue>>,
    notify: Rc<Notify>,
}

impl SchedulerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a re-render of `id` at the next flush.
    ///
    /// Repeated requests before the flush collapse into one.
    pub fn request(&self, id: InstanceId) {
        let fresh = self.queue.borrow_mut().push(id);
        if fresh {
            tracing::trace!(instance = ?id, "re-render requested");
            self.notify.notify_one();
        }
    }

    /// Take every pending request, oldest first.
    pub fn drain(&self) -> Vec<InstanceId> {
        self.queue.borrow_mut().drain()
    }

    /// Number of distinct pending requests.
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().order.is_empty()
    }

    /// Resolve once a request arrives. Returns immediately if the queue is
    /// not empty.
    pub async fn notified(&self) {
        if !self.is_empty() {
            return;
        }
        self.notify.notified().await;
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<InstanceId> {
        let mut arena: SlotMap<InstanceId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn new_handle_is_empty() {
        let handle = SchedulerHandle::new();
        assert!(handle.is_empty());
        assert!(handle.drain().is_empty());
    }

    #[test]
    fn requests_are_fifo() {
        let handle = SchedulerHandle::new();
        let ids = ids(3);
        handle.request(ids[2]);
        handle.request(ids[0]);
        handle.request(ids[1]);
        assert_eq!(handle.drain(), vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn duplicate_requests_coalesce() {
        let handle = SchedulerHandle::new();
        let ids = ids(2);
        handle.request(ids[0]);
        handle.request(ids[1]);
        handle.request(ids[0]);
        assert_eq!(handle.pending_count(), 2);
        assert_eq!(handle.drain(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn drained_ids_can_be_requested_again() {
        let handle = SchedulerHandle::new();
        let ids = ids(1);
        handle.request(ids[0]);
        handle.drain();
        handle.request(ids[0]);
        assert_eq!(handle.drain(), vec![ids[0]]);
    }

    #[test]
    fn clones_share_the_queue() {
        let handle = SchedulerHandle::new();
        let other = handle.clone();
        let ids = ids(1);
        other.request(ids[0]);
        assert_eq!(handle.pending_count(), 1);
    }

    #[tokio::test]
    async fn notified_returns_when_work_is_pending() {
        let handle = SchedulerHandle::new();
        let ids = ids(1);
        handle.request(ids[0]);
        handle.notified().await;
        assert_eq!(handle.pending_count(), 1);
    }

    #[test]
    fn notified_wakes_on_request() {
        let handle = SchedulerHandle::new();
        let ids = ids(1);
        let mut waiting = tokio_test::task::spawn(handle.notified());
        tokio_test::assert_pending!(waiting.poll());
        handle.request(ids[0]);
        assert!(waiting.is_woken());
        tokio_test::assert_ready!(waiting.poll());
    }
}
