// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A client's tune/retune request: the priority it arbitrates at, how long it
//! lives, which resources it wants written, and how far it got.

use crate::entities::Resource;
use crate::value_objects::{ModeMask, PriorityClass, RequestDuration, RequestHandle, TimerId, UntuneDirection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub handle: RequestHandle,
    pub client_pid: i32,
    pub client_tid: i32,
    pub priority: PriorityClass,
    pub duration: RequestDuration,
    pub mode_gate: ModeMask,
    pub untune_direction: UntuneDirection,
    pub resources: Vec<Resource>,
    /// Count of `resources` that were actually linked into the table. A
    /// cleanup pass still runs over every index up to `resources.len()`, but
    /// only unlinks a node for `index < granted`, matching
    /// `processResourceCleanupAt`.
    granted: usize,
    pub timer_id: Option<TimerId>,
}

impl Request {
    pub fn new(
        handle: RequestHandle,
        client_pid: i32,
        client_tid: i32,
        priority: PriorityClass,
        duration: RequestDuration,
        mode_gate: ModeMask,
        untune_direction: UntuneDirection,
        resources: Vec<Resource>,
    ) -> Self {
        Request {
            handle,
            client_pid,
            client_tid,
            priority,
            duration,
            mode_gate,
            untune_direction,
            resources,
            granted: 0,
            timer_id: None,
        }
    }

    pub fn resources_count(&self) -> usize {
        self.resources.len()
    }

    pub fn granted_count(&self) -> usize {
        self.granted
    }

    pub fn is_fully_granted(&self) -> bool {
        self.granted == self.resources.len()
    }

    /// Records that `count` of this request's resources made it into the
    /// table, in order. Never decreases -- a request's grant count only ever
    /// grows as more of its resources are inserted.
    pub fn set_granted(&mut self, count: usize) {
        debug_assert!(count <= self.resources.len());
        self.granted = self.granted.max(count);
    }

    /// Clears the grant count back to zero. Used when a mode transition
    /// parks an already-granted request: its arbitration nodes have just
    /// been unlinked from the table, so nothing is granted until it is
    /// re-inserted on resume.
    pub fn reset_granted(&mut self) {
        self.granted = 0;
    }

    pub fn resource_at(&self, index: usize) -> Option<&Resource> {
        self.resources.get(index)
    }

    /// Indices of this request's resources in cleanup order, per
    /// `untune_direction`.
    pub fn cleanup_order(&self) -> Box<dyn Iterator<Item = usize>> {
        self.untune_direction.indices(self.resources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{Mode, ResourceCode, ResourceValue, ScopeKey};

    fn sample_request() -> Request {
        let resources = vec![
            Resource::new(ResourceCode::new(1, 0, false), ScopeKey::GLOBAL, ResourceValue::Single(10)),
            Resource::new(ResourceCode::new(2, 0, false), ScopeKey::GLOBAL, ResourceValue::Single(20)),
        ];
        Request::new(
            RequestHandle::new(7),
            100,
            100,
            PriorityClass::ThirdPartyHigh,
            RequestDuration::Finite(500),
            ModeMask::single(Mode::DisplayOn),
            UntuneDirection::Forward,
            resources,
        )
    }

    #[test]
    fn starts_ungranted() {
        let request = sample_request();
        assert_eq!(request.granted_count(), 0);
        assert!(!request.is_fully_granted());
    }

    #[test]
    fn grant_count_only_grows() {
        let mut request = sample_request();
        request.set_granted(2);
        request.set_granted(1);
        assert_eq!(request.granted_count(), 2);
        assert!(request.is_fully_granted());
    }

    #[test]
    fn cleanup_order_respects_direction() {
        let mut request = sample_request();
        request.untune_direction = UntuneDirection::Reverse;
        let order: Vec<usize> = request.cleanup_order().collect();
        assert_eq!(order, vec![1, 0]);
    }
}
