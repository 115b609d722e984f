// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Identity handles: the request handle returned to callers, and the opaque
//! timer id a [`Request`](crate::entities::Request) holds while it has a
//! live expiry timer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique, monotonically assigned, non-zero request identifier. A
/// successful INSERT returns a positive handle; negative handles are used as
/// the failed-INSERT sentinel at the ingress boundary (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestHandle(i64);

impl RequestHandle {
    /// Sentinel returned to callers when an INSERT fails outright.
    pub const INVALID: RequestHandle = RequestHandle(-1);

    pub fn new(value: i64) -> Self {
        RequestHandle(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically assigned id for a live timer, used only to correlate
/// `cancel` with the `start` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(value: u64) -> Self {
        TimerId(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Monotonic, process-lifetime generator for [`RequestHandle`]s and
/// [`TimerId`]s. Not thread-safe by itself -- callers serialize through the
/// same arbitration thread that owns the table.
#[derive(Debug, Default)]
pub struct HandleGenerator {
    next_request: i64,
    next_timer: u64,
}

impl HandleGenerator {
    pub fn new() -> Self {
        HandleGenerator { next_request: 0, next_timer: 0 }
    }

    pub fn next_request_handle(&mut self) -> RequestHandle {
        self.next_request += 1;
        RequestHandle(self.next_request)
    }

    pub fn next_timer_id(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }
}
