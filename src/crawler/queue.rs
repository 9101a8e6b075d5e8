//! Completion-tracked FIFO queue
//!
//! A `WorkQueue` is an unbounded multi-producer, multi-consumer FIFO. Besides
//! counting items waiting in the channel it counts *unfinished* items: an item
//! stays unfinished from `put` until the consumer's [`Claimed`] handle is dropped.
//! [`WorkQueue::join`] waits for that count to reach zero, so work enqueued while
//! processing an earlier item (comment fan-out, for example) is waited for as well,
//! as long as it is enqueued before the earlier item is released.

use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

struct Shared<T> {
    sender: mpsc::UnboundedSender<T>,
    receiver: Mutex<mpsc::UnboundedReceiver<T>>,
    unfinished: watch::Sender<usize>,
}

/// Unbounded FIFO with `join` semantics
pub struct WorkQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (unfinished, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                sender,
                receiver: Mutex::new(receiver),
                unfinished,
            }),
        }
    }

    /// Enqueues an item without waiting
    pub fn put(&self, item: T) {
        self.shared.unfinished.send_modify(|n| *n += 1);
        if self.shared.sender.send(item).is_err() {
            // The receiver lives as long as `shared`, so this cannot happen
            self.shared.unfinished.send_modify(|n| *n = n.saturating_sub(1));
        }
    }

    /// Waits for the next item
    ///
    /// Consumers are served in the order they started waiting. The returned
    /// handle marks the item finished when it is dropped. Returns `None` only if
    /// the channel is closed, which cannot happen while the queue exists.
    pub async fn get(&self) -> Option<Claimed<T>> {
        let item = {
            let mut receiver = self.shared.receiver.lock().await;
            receiver.recv().await?
        };
        Some(Claimed {
            item,
            shared: self.shared.clone(),
        })
    }

    /// Waits until every item put so far has been claimed and released
    pub async fn join(&self) {
        let mut unfinished = self.shared.unfinished.subscribe();
        // The sender is owned by `shared`, so the only possible outcome is Ok
        let _ = unfinished.wait_for(|n| *n == 0).await;
    }

    /// Number of items that have been put but not yet released
    pub fn unfinished(&self) -> usize {
        *self.shared.unfinished.borrow()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An item taken from a [`WorkQueue`]; dropping it marks the item finished
pub struct Claimed<T> {
    item: T,
    shared: Arc<Shared<T>>,
}

impl<T> Claimed<T> {
    /// Marks the item finished now
    pub fn done(self) {}
}

impl<T> Deref for Claimed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> Drop for Claimed<T> {
    fn drop(&mut self) {
        self.shared
            .unfinished
            .send_modify(|n| *n = n.saturating_sub(1));
    }
}
