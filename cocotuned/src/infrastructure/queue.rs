// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Request Queue
//!
//! A single-consumer, multi-producer, priority-ordered queue client threads
//! push onto and the serializer thread drains. Within a priority band,
//! order is FIFO by arrival -- a monotonic sequence number breaks ties in
//! the heap the way `addAndWakeup` preserves submission order for
//! same-priority requests in the original's pending list.

use cocotuned_domain::PriorityClass;
use parking_lot::{Condvar, Mutex};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

struct QueuedItem<T> {
    priority: PriorityClass,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for QueuedItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl<T> Eq for QueuedItem<T> {}

impl<T> PartialOrd for QueuedItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for QueuedItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority).then_with(|| self.sequence.cmp(&other.sequence))
    }
}

struct Inner<T> {
    heap: Mutex<BinaryHeap<Reverse<QueuedItem<T>>>>,
    condvar: Condvar,
    closed: Mutex<bool>,
}

/// Handle shared between producers and the single consumer. Cloning is
/// cheap (an `Arc` bump); every clone pushes into and pops from the same
/// underlying queue.
pub struct RequestQueue<T> {
    inner: Arc<Inner<T>>,
    next_sequence: Arc<AtomicU64>,
}

impl<T> Clone for RequestQueue<T> {
    fn clone(&self) -> Self {
        RequestQueue { inner: Arc::clone(&self.inner), next_sequence: Arc::clone(&self.next_sequence) }
    }
}

impl<T> RequestQueue<T> {
    pub fn new() -> Self {
        RequestQueue {
            inner: Arc::new(Inner { heap: Mutex::new(BinaryHeap::new()), condvar: Condvar::new(), closed: Mutex::new(false) }),
            next_sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Pushes `item` under `priority` and wakes the consumer -- `addAndWakeup`.
    pub fn push(&self, priority: PriorityClass, item: T) {
        let sequence = self.next_sequence.fetch_add(1, AtomicOrdering::Relaxed);
        self.inner.heap.lock().push(Reverse(QueuedItem { priority, sequence, item }));
        self.inner.condvar.notify_one();
    }

    /// Blocks until an item is available (highest priority, then earliest
    /// arrival) or the queue is closed, in which case it returns `None`.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut heap = self.inner.heap.lock();
        loop {
            if let Some(Reverse(queued)) = heap.pop() {
                return Some(queued.item);
            }
            if *self.inner.closed.lock() {
                return None;
            }
            self.inner.condvar.wait(&mut heap);
        }
    }

    pub fn close(&self) {
        *self.inner.closed.lock() = true;
        self.inner.condvar.notify_all();
    }

    pub fn len(&self) -> usize {
        self.inner.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for RequestQueue<T> {
    fn default() -> Self {
        RequestQueue::new()
    }
}
