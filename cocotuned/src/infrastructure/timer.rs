// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Timer Service
//!
//! A shared min-heap of pending expiries backed by an elastic worker pool,
//! mirroring `ThreadPool.h`'s desired/max capacity split: `desired_threads`
//! core workers stay parked on the condition variable for the life of the
//! service, and up to `max_scaling_capacity` additional workers are spun up
//! when a worker notices a backlog and retire on their own once the heap
//! has been idle for a while. Each worker picks up and fires exactly one
//! timer at a time; it never touches the table itself -- it only sends the
//! expired request's handle down `expired`, the same way the original
//! converts a timer firing into a synthetic untune `Request` pushed through
//! the request queue rather than mutating the table directly from the
//! timer thread.
//!
//! The pending-timer pool itself is fixed-capacity, sized from
//! `Settings::max_concurrent_requests` the same way `CocoTable`'s arena is:
//! at most one live timer per live request. `schedule` reports exhaustion
//! as a `TunerError` instead of growing unbounded, so the serializer can
//! roll back the request's already-granted resources per the INSERT
//! contract's timer-allocation-failure case.

use cocotuned_domain::{RequestHandle, TimerId, TunerError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long an elastic (above `desired_threads`) worker waits for new work
/// before retiring and shrinking the pool back toward `desired_threads`.
const ELASTIC_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

struct Entry {
    at: Instant,
    handle: RequestHandle,
}

struct Shared {
    heap: Mutex<BinaryHeap<Reverse<EntryKey>>>,
    entries: Mutex<HashMap<TimerId, Entry>>,
    condvar: Condvar,
    shutdown: Mutex<bool>,
    capacity: usize,
    max_threads: usize,
    active_workers: Mutex<usize>,
    elastic_workers: Mutex<Vec<JoinHandle<()>>>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey(Instant, TimerIdOrd);

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TimerIdOrd(u64);

pub struct TimerService {
    shared: Arc<Shared>,
    core_workers: Vec<JoinHandle<()>>,
    tx: Sender<(TimerId, RequestHandle)>,
    expired_rx: Receiver<(TimerId, RequestHandle)>,
}

impl TimerService {
    /// Starts `desired_threads` core workers immediately and allows the pool
    /// to grow to `max_scaling_capacity` under load; `capacity` bounds the
    /// number of timers that may be outstanding at once (see `Settings`).
    pub fn start(desired_threads: usize, max_scaling_capacity: usize, capacity: usize) -> Result<Self, TunerError> {
        let desired_threads = desired_threads.max(1);
        let max_threads = max_scaling_capacity.max(desired_threads);
        let shared = Arc::new(Shared {
            heap: Mutex::new(BinaryHeap::new()),
            entries: Mutex::new(HashMap::new()),
            condvar: Condvar::new(),
            shutdown: Mutex::new(false),
            capacity,
            max_threads,
            active_workers: Mutex::new(0),
            elastic_workers: Mutex::new(Vec::new()),
        });
        let (tx, rx) = unbounded();

        let mut core_workers = Vec::with_capacity(desired_threads);
        for i in 0..desired_threads {
            let worker_shared = Arc::clone(&shared);
            let worker_tx = tx.clone();
            match thread::Builder::new().name(format!("cocotuned-timer-{i}")).spawn(move || Self::run_worker(worker_shared, worker_tx, false)) {
                Ok(worker) => core_workers.push(worker),
                Err(e) => {
                    *shared.shutdown.lock() = true;
                    shared.condvar.notify_all();
                    for worker in core_workers {
                        let _ = worker.join();
                    }
                    return Err(TunerError::fatal(format!("failed to spawn timer worker: {e}")));
                }
            }
        }
        *shared.active_workers.lock() = desired_threads;

        Ok(TimerService { shared, core_workers, tx, expired_rx: rx })
    }

    /// Schedules `handle` to expire after `duration`. Fails with
    /// `TunerError::CapacityExhausted` once `capacity` outstanding timers
    /// are already live; the caller is responsible for rolling back
    /// whatever it already granted, per the INSERT contract. Callers with
    /// an infinite-duration request never call this at all.
    pub fn schedule(&self, timer_id: TimerId, handle: RequestHandle, duration: Duration) -> Result<(), TunerError> {
        let at = Instant::now() + duration;
        {
            let mut entries = self.shared.entries.lock();
            if entries.len() >= self.shared.capacity {
                return Err(TunerError::capacity_exhausted("timer pool exhausted"));
            }
            entries.insert(timer_id, Entry { at, handle });
        }
        let backlog = {
            let mut heap = self.shared.heap.lock();
            heap.push(Reverse(EntryKey(at, TimerIdOrd(timer_id.value()))));
            heap.len()
        };
        self.shared.condvar.notify_all();
        if backlog > 1 {
            Self::maybe_scale_up(&self.shared, &self.tx);
        }
        Ok(())
    }

    /// Marks `timer_id` cancelled by dropping its entry outright; the
    /// worker discards the now-dangling heap slot silently when it reaches
    /// the head. Frees the timer's capacity slot immediately.
    pub fn cancel(&self, timer_id: TimerId) {
        self.shared.entries.lock().remove(&timer_id);
    }

    /// Receiver side of expired timers: `(timer_id, request_handle)` pairs,
    /// ready for the serializer to convert into a synthetic untune request.
    pub fn expired(&self) -> &Receiver<(TimerId, RequestHandle)> {
        &self.expired_rx
    }

    /// Spawns one more worker above `desired_threads` if the pool has room
    /// and a backlog was just observed. The new worker retires itself after
    /// `ELASTIC_IDLE_TIMEOUT` of no work, shrinking the pool back down.
    fn maybe_scale_up(shared: &Arc<Shared>, tx: &Sender<(TimerId, RequestHandle)>) {
        let mut active = shared.active_workers.lock();
        if *active >= shared.max_threads {
            return;
        }
        *active += 1;
        drop(active);

        let worker_shared = Arc::clone(shared);
        let worker_tx = tx.clone();
        match thread::Builder::new().name("cocotuned-timer-elastic".into()).spawn(move || Self::run_worker(worker_shared, worker_tx, true)) {
            Ok(worker) => shared.elastic_workers.lock().push(worker),
            Err(_) => *shared.active_workers.lock() -= 1,
        }
    }

    fn run_worker(shared: Arc<Shared>, tx: Sender<(TimerId, RequestHandle)>, retire_when_idle: bool) {
        loop {
            let mut heap = shared.heap.lock();
            if *shared.shutdown.lock() {
                return;
            }
            let next_at = heap.peek().map(|Reverse(EntryKey(at, _))| *at);
            match next_at {
                None => {
                    if retire_when_idle {
                        let timed_out = shared.condvar.wait_for(&mut heap, ELASTIC_IDLE_TIMEOUT).timed_out();
                        if timed_out {
                            drop(heap);
                            *shared.active_workers.lock() -= 1;
                            return;
                        }
                    } else {
                        shared.condvar.wait(&mut heap);
                    }
                }
                Some(at) => {
                    let now = Instant::now();
                    if at > now {
                        let timeout = at - now;
                        let _ = shared.condvar.wait_for(&mut heap, timeout);
                    } else {
                        let Reverse(EntryKey(_, TimerIdOrd(id))) = heap.pop().unwrap();
                        drop(heap);
                        let timer_id = TimerId::new(id);
                        let fired = shared.entries.lock().remove(&timer_id);
                        if let Some(entry) = fired {
                            let _ = tx.send((timer_id, entry.handle));
                        }
                    }
                }
            }
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        *self.shared.shutdown.lock() = true;
        self.shared.condvar.notify_all();
        for worker in self.core_workers.drain(..) {
            let _ = worker.join();
        }
        for worker in self.shared.elastic_workers.lock().drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn scheduled_timer_fires_with_its_handle() {
        let service = TimerService::start(1, 1, 8).unwrap();
        service.schedule(TimerId::new(1), RequestHandle::new(42), Duration::from_millis(10)).unwrap();
        let (timer_id, handle) = service.expired().recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(timer_id, TimerId::new(1));
        assert_eq!(handle, RequestHandle::new(42));
    }

    #[test]
    fn cancelled_timer_does_not_fire() {
        let service = TimerService::start(1, 1, 8).unwrap();
        service.schedule(TimerId::new(2), RequestHandle::new(7), Duration::from_millis(20)).unwrap();
        service.cancel(TimerId::new(2));
        let result = service.expired().recv_timeout(Duration::from_millis(100));
        assert!(result.is_err());
    }

    #[test]
    fn schedule_past_capacity_is_rejected() {
        let service = TimerService::start(1, 1, 1).unwrap();
        service.schedule(TimerId::new(1), RequestHandle::new(1), Duration::from_secs(60)).unwrap();
        let result = service.schedule(TimerId::new(2), RequestHandle::new(2), Duration::from_secs(60));
        assert!(result.is_err());
    }

    #[test]
    fn cancelling_frees_a_capacity_slot() {
        let service = TimerService::start(1, 1, 1).unwrap();
        service.schedule(TimerId::new(1), RequestHandle::new(1), Duration::from_secs(60)).unwrap();
        service.cancel(TimerId::new(1));
        assert!(service.schedule(TimerId::new(2), RequestHandle::new(2), Duration::from_secs(60)).is_ok());
    }
}
