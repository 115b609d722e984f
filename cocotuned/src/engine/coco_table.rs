// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CocoTable
//!
//! Per-resource, priority-partitioned ordered lists of in-flight requests.
//! Each list is a doubly-linked chain of [`ArbNode`]s in an [`Arena`]; the
//! node at the head of a list is the one whose value this engine considers
//! applying. Whether a head actually reaches the device is a second gate,
//! tracked per device slot: a write only lands when its priority is at
//! least as preferred as whatever priority currently holds that slot.
//!
//! Four insert policies, taken directly from `CocoTable.cpp`:
//!
//! - `HigherBetter`/`LowerBetter`: walk from the head, insert before the
//!   first node the comparator says this value beats; apply only if the new
//!   node lands at the head; append at the tail otherwise.
//! - `LazyApply`: always append at the tail; apply only if the list was
//!   empty (the new node is both head and tail).
//! - `InstantApply`: always prepend at the head; apply unconditionally.

use crate::engine::arena::{Arena, ArenaIndex};
use cocotuned_domain::{
    Mode, ModeMask, PriorityClass, Resource, ResourceConfig, ResourceCode, ResourceValue, RequestHandle, Scope,
    TunerError,
};
use std::collections::HashMap;

struct ArbNode {
    prev: ArenaIndex,
    next: ArenaIndex,
    handle: RequestHandle,
    resource_index: usize,
    priority: PriorityClass,
    value: ResourceValue,
}

#[derive(Default)]
struct BucketList {
    head: ArenaIndex,
    tail: ArenaIndex,
}

impl Default for ArenaIndex {
    fn default() -> Self {
        ArenaIndex::NONE
    }
}

struct AppliedState {
    priority: Option<PriorityClass>,
    value: ResourceValue,
}

/// The key a bucket list (or a device's applied state) is filed under.
/// `Global` and `PerCgroup` resources fold scope into a single key component;
/// `PerCore`/`PerCluster` resources additionally fold in priority for their
/// bucket key (but not their device key), matching the original's secondary
/// index formula.
type Key = (ResourceCode, u32);

pub struct CocoTable {
    arena: Arena<ArbNode>,
    buckets: HashMap<Key, BucketList>,
    applied: HashMap<Key, AppliedState>,
    nodes_by_request: HashMap<(RequestHandle, usize), ArenaIndex>,
    /// The device's current mode, consulted by `apply_action` against each
    /// resource's configured `mode_mask` -- separate from the request-level
    /// `mode_gate` the mode controller enforces at admission.
    current_mode: ModeMask,
}

impl Default for CocoTable {
    fn default() -> Self {
        CocoTable {
            arena: Arena::new(),
            buckets: HashMap::new(),
            applied: HashMap::new(),
            nodes_by_request: HashMap::new(),
            current_mode: ModeMask::ALL,
        }
    }
}

fn bucket_key(config: &ResourceConfig, resource: &Resource, priority: PriorityClass) -> Key {
    match config.scope {
        Scope::Global => (config.code, priority.as_index() as u32),
        Scope::PerCore | Scope::PerCluster => {
            (config.code, resource.scope_key.0 * PriorityClass::COUNT as u32 + priority.as_index() as u32)
        }
        Scope::PerCgroup => (config.code, resource.value.scope_identity_value() as u32),
    }
}

fn device_key(config: &ResourceConfig, resource: &Resource) -> Key {
    match config.scope {
        Scope::Global => (config.code, 0),
        Scope::PerCore | Scope::PerCluster => (config.code, resource.scope_key.0),
        Scope::PerCgroup => (config.code, resource.value.scope_identity_value() as u32),
    }
}

impl CocoTable {
    /// An unbounded table, used where the caller has no configured node cap
    /// to enforce (mainly tests).
    pub fn new() -> Self {
        CocoTable::with_capacity(usize::MAX)
    }

    /// A table whose arbitration-node arena holds at most `node_capacity`
    /// live nodes, derived from `max_concurrent_requests *
    /// max_resources_per_request`.
    pub fn with_capacity(node_capacity: usize) -> Self {
        CocoTable { arena: Arena::with_capacity(node_capacity), ..CocoTable::default() }
    }

    /// Updates the device mode `apply_action` gates writes against. Called
    /// by the serializer whenever the mode controller reports a transition.
    pub fn set_mode(&mut self, mode: Mode) {
        self.current_mode = ModeMask::single(mode);
    }

    /// Links a new node into `config`'s arbitration list for `resource`, then
    /// runs the priority gate against that resource's current device state.
    /// Returns the value to write when the gate passes, or
    /// `Err(CapacityExhausted)` without linking anything if the node arena
    /// has no free slot.
    pub fn insert(
        &mut self,
        config: &ResourceConfig,
        handle: RequestHandle,
        resource_index: usize,
        resource: &Resource,
        priority: PriorityClass,
    ) -> Result<Option<ResourceValue>, TunerError> {
        let key = bucket_key(config, resource, priority);
        let node = ArbNode {
            prev: ArenaIndex::NONE,
            next: ArenaIndex::NONE,
            handle,
            resource_index,
            priority,
            value: resource.value.clone(),
        };
        let node_idx = self
            .arena
            .insert(node)
            .map_err(|_| TunerError::capacity_exhausted("arbitration node arena exhausted"))?;
        self.nodes_by_request.insert((handle, resource_index), node_idx);

        let became_head = match config.policy {
            cocotuned_domain::ArbitrationPolicy::HigherBetter | cocotuned_domain::ArbitrationPolicy::LowerBetter => {
                self.insert_ordered(key, node_idx, config.policy)
            }
            cocotuned_domain::ArbitrationPolicy::LazyApply => self.append_tail(key, node_idx),
            cocotuned_domain::ArbitrationPolicy::InstantApply => {
                self.prepend_head(key, node_idx);
                true
            }
        };

        Ok(if became_head {
            let device = device_key(config, resource);
            self.apply_action(device, priority, config.mode_mask, resource.value.clone())
        } else {
            None
        })
    }

    fn insert_ordered(&mut self, key: Key, node_idx: ArenaIndex, policy: cocotuned_domain::ArbitrationPolicy) -> bool {
        let new_value = self.arena.get(node_idx).and_then(|n| n.value.comparator_value());
        let list = self.buckets.entry(key).or_default();

        let Some(new_value) = new_value else {
            // Can't be ordered against peers; append at the tail like a tie.
            return Self::append_tail_raw(&mut self.arena, list, node_idx);
        };

        let mut cursor = list.head;
        while !cursor.is_none() {
            let cur_value = self.arena.get(cursor).and_then(|n| n.value.comparator_value());
            let beats = match (cur_value, policy) {
                (Some(cur), cocotuned_domain::ArbitrationPolicy::HigherBetter) => new_value > cur,
                (Some(cur), cocotuned_domain::ArbitrationPolicy::LowerBetter) => new_value < cur,
                _ => false,
            };
            if beats {
                return Self::insert_before_raw(&mut self.arena, list, cursor, node_idx);
            }
            cursor = self.arena.get(cursor).map(|n| n.next).unwrap_or(ArenaIndex::NONE);
        }

        Self::append_tail_raw(&mut self.arena, list, node_idx)
    }

    fn append_tail(&mut self, key: Key, node_idx: ArenaIndex) -> bool {
        let list = self.buckets.entry(key).or_default();
        Self::append_tail_raw(&mut self.arena, list, node_idx)
    }

    fn append_tail_raw(arena: &mut Arena<ArbNode>, list: &mut BucketList, node_idx: ArenaIndex) -> bool {
        let was_empty = list.head.is_none();
        if was_empty {
            list.head = node_idx;
            list.tail = node_idx;
        } else {
            let old_tail = list.tail;
            if let Some(tail_node) = arena.get_mut(old_tail) {
                tail_node.next = node_idx;
            }
            if let Some(new_node) = arena.get_mut(node_idx) {
                new_node.prev = old_tail;
            }
            list.tail = node_idx;
        }
        was_empty
    }

    fn insert_before_raw(arena: &mut Arena<ArbNode>, list: &mut BucketList, before: ArenaIndex, node_idx: ArenaIndex) -> bool {
        let prev = arena.get(before).map(|n| n.prev).unwrap_or(ArenaIndex::NONE);
        if let Some(node) = arena.get_mut(node_idx) {
            node.prev = prev;
            node.next = before;
        }
        if let Some(before_node) = arena.get_mut(before) {
            before_node.prev = node_idx;
        }
        if prev.is_none() {
            list.head = node_idx;
        } else if let Some(prev_node) = arena.get_mut(prev) {
            prev_node.next = node_idx;
        }
        prev.is_none()
    }

    fn prepend_head(&mut self, key: Key, node_idx: ArenaIndex) {
        let list = self.buckets.entry(key).or_default();
        let old_head = list.head;
        if let Some(node) = self.arena.get_mut(node_idx) {
            node.next = old_head;
        }
        if !old_head.is_none() {
            if let Some(head_node) = self.arena.get_mut(old_head) {
                head_node.prev = node_idx;
            }
        } else {
            list.tail = node_idx;
        }
        list.head = node_idx;
    }

    /// Writes through to `device` only if `mode_mask` accepts the table's
    /// current mode AND `priority` is at least as preferred as whatever
    /// currently holds the slot. A mode-gated write leaves `applied`
    /// untouched -- the node is still linked and still the head, it simply
    /// isn't reaching the device right now.
    fn apply_action(&mut self, device: Key, priority: PriorityClass, mode_mask: ModeMask, value: ResourceValue) -> Option<ResourceValue> {
        if !mode_mask.intersects(self.current_mode) {
            return None;
        }
        let state = self.applied.entry(device).or_insert_with(|| AppliedState { priority: None, value: value.clone() });
        let should_write = match state.priority {
            None => true,
            Some(current) => priority.at_least_as_preferred_as(current),
        };
        if should_write {
            state.priority = Some(priority);
            state.value = value.clone();
            Some(value)
        } else {
            None
        }
    }

    /// Unlinks the node for `(handle, resource_index)`, if one exists. When
    /// the removed node was its bucket's head, re-derives the device's
    /// applied state from the new head (or clears it if the bucket is now
    /// empty) and returns the value that should be torn down or reapplied.
    pub fn remove(
        &mut self,
        config: &ResourceConfig,
        handle: RequestHandle,
        resource_index: usize,
        resource: &Resource,
    ) -> Option<RemovalOutcome> {
        let node_idx = self.nodes_by_request.remove(&(handle, resource_index))?;
        let node = self.arena.get(node_idx)?;
        let priority = node.priority;
        let key = bucket_key(config, resource, priority);
        let was_head = self.buckets.get(&key).map(|l| l.head == node_idx).unwrap_or(false);
        self.unlink(key, node_idx);

        if !was_head {
            return None;
        }

        let device = device_key(config, resource);
        let new_head_value = self
            .buckets
            .get(&key)
            .filter(|l| !l.head.is_none())
            .and_then(|l| self.arena.get(l.head))
            .map(|n| (n.priority, n.value.clone()));

        match new_head_value {
            Some((new_priority, new_value)) if config.mode_mask.intersects(self.current_mode) => {
                self.applied.insert(device, AppliedState { priority: Some(new_priority), value: new_value.clone() });
                Some(RemovalOutcome::Reapply(new_value))
            }
            _ => {
                self.applied.remove(&device);
                Some(RemovalOutcome::TearToDefault)
            }
        }
    }

    fn unlink(&mut self, key: Key, node_idx: ArenaIndex) {
        let (prev, next) = match self.arena.get(node_idx) {
            Some(n) => (n.prev, n.next),
            None => return,
        };
        if let Some(prev_node) = self.arena.get_mut(prev) {
            prev_node.next = next;
        }
        if let Some(next_node) = self.arena.get_mut(next) {
            next_node.prev = prev;
        }
        if let Some(list) = self.buckets.get_mut(&key) {
            if list.head == node_idx {
                list.head = next;
            }
            if list.tail == node_idx {
                list.tail = prev;
            }
        }
        self.arena.remove(node_idx);
    }

    pub fn contains(&self, handle: RequestHandle, resource_index: usize) -> bool {
        self.nodes_by_request.contains_key(&(handle, resource_index))
    }
}

/// What the caller should do after a node leaves the head of its bucket.
pub enum RemovalOutcome {
    /// Another node took over the head; write its value to the device.
    Reapply(ResourceValue),
    /// The bucket is now empty; restore the resource's recorded default.
    TearToDefault,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocotuned_domain::{ArbitrationPolicy, Permission, ResourceConfigBuilder, ScopeKey};

    fn config(policy: ArbitrationPolicy) -> ResourceConfig {
        ResourceConfigBuilder::new()
            .res_id(1)
            .res_type(0)
            .name("r")
            .path("/sys/r")
            .policy(policy)
            .scope(Scope::Global)
            .permission(Permission::ThirdParty)
            .default_value("0")
            .build()
            .unwrap()
    }

    fn resource(value: i32) -> Resource {
        Resource::new(ResourceCode::new(1, 0, false), ScopeKey::GLOBAL, ResourceValue::Single(value))
    }

    #[test]
    fn higher_better_applies_only_the_max() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::HigherBetter);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);

        let first = table.insert(&config, h1, 0, &resource(10), PriorityClass::ThirdPartyHigh).unwrap();
        assert_eq!(first, Some(ResourceValue::Single(10)));

        let second = table.insert(&config, h2, 0, &resource(5), PriorityClass::ThirdPartyHigh).unwrap();
        assert_eq!(second, None, "lower value should not become head, so no reapply");
    }

    #[test]
    fn higher_better_reapplies_on_new_max() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::HigherBetter);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);
        table.insert(&config, h1, 0, &resource(10), PriorityClass::ThirdPartyHigh).unwrap();
        let second = table.insert(&config, h2, 0, &resource(20), PriorityClass::ThirdPartyHigh).unwrap();
        assert_eq!(second, Some(ResourceValue::Single(20)));
    }

    #[test]
    fn instant_apply_always_becomes_head() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::InstantApply);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);
        table.insert(&config, h1, 0, &resource(1), PriorityClass::ThirdPartyLow).unwrap();
        let second = table.insert(&config, h2, 0, &resource(2), PriorityClass::ThirdPartyLow).unwrap();
        assert_eq!(second, Some(ResourceValue::Single(2)));
    }

    #[test]
    fn lower_priority_cannot_preempt_higher_priority_owner() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::InstantApply);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);
        table.insert(&config, h1, 0, &resource(1), PriorityClass::SystemHigh).unwrap();
        let second = table.insert(&config, h2, 0, &resource(2), PriorityClass::ThirdPartyLow).unwrap();
        assert_eq!(second, None);
    }

    #[test]
    fn remove_of_head_reapplies_next_node() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::HigherBetter);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);
        table.insert(&config, h1, 0, &resource(20), PriorityClass::ThirdPartyHigh).unwrap();
        table.insert(&config, h2, 0, &resource(10), PriorityClass::ThirdPartyHigh).unwrap();

        let outcome = table.remove(&config, h1, 0, &resource(20));
        match outcome {
            Some(RemovalOutcome::Reapply(ResourceValue::Single(v))) => assert_eq!(v, 10),
            _ => panic!("expected reapply of the remaining node"),
        }
    }

    #[test]
    fn remove_of_only_node_tears_to_default() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::LazyApply);
        let h1 = RequestHandle::new(1);
        table.insert(&config, h1, 0, &resource(1), PriorityClass::ThirdPartyLow).unwrap();
        let outcome = table.remove(&config, h1, 0, &resource(1));
        assert!(matches!(outcome, Some(RemovalOutcome::TearToDefault)));
    }

    #[test]
    fn capacity_exhaustion_is_reported_without_linking() {
        let mut table = CocoTable::with_capacity(1);
        let config = config(ArbitrationPolicy::HigherBetter);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);
        table.insert(&config, h1, 0, &resource(10), PriorityClass::ThirdPartyHigh).unwrap();
        let err = table.insert(&config, h2, 0, &resource(20), PriorityClass::ThirdPartyHigh);
        assert!(err.is_err());
        assert!(!table.contains(h2, 0));
    }

    #[test]
    fn mode_gate_suppresses_device_write_even_at_head() {
        let mut table = CocoTable::new();
        table.set_mode(cocotuned_domain::Mode::Doze);
        // `config()`'s builder defaults `mode_mask` to DISPLAY_ON only.
        let config = config(ArbitrationPolicy::InstantApply);
        let h1 = RequestHandle::new(1);
        let outcome = table.insert(&config, h1, 0, &resource(7), PriorityClass::ThirdPartyHigh).unwrap();
        assert_eq!(outcome, None, "resource's mode_mask excludes the current mode");
    }

    #[test]
    fn mode_gate_allows_device_write_once_mode_matches() {
        let mut table = CocoTable::new();
        table.set_mode(cocotuned_domain::Mode::DisplayOn);
        let config = config(ArbitrationPolicy::InstantApply);
        let h1 = RequestHandle::new(1);
        let outcome = table.insert(&config, h1, 0, &resource(7), PriorityClass::ThirdPartyHigh).unwrap();
        assert_eq!(outcome, Some(ResourceValue::Single(7)));
    }

    #[test]
    fn lazy_apply_only_applies_when_list_was_empty() {
        let mut table = CocoTable::new();
        let config = config(ArbitrationPolicy::LazyApply);
        let h1 = RequestHandle::new(1);
        let h2 = RequestHandle::new(2);
        let first = table.insert(&config, h1, 0, &resource(1), PriorityClass::ThirdPartyLow).unwrap();
        assert!(first.is_some());
        let second = table.insert(&config, h2, 0, &resource(2), PriorityClass::ThirdPartyLow).unwrap();
        assert!(second.is_none());
    }
}
