// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Serializer
//!
//! The single thread that owns the [`CocoTable`], the [`ResourceRegistry`],
//! and the [`ModeController`]. Every op drained from the [`RequestQueue`] is
//! handled to completion before the next is drained, which is what makes the
//! table's internal linking safe to leave un-synchronized: it is only ever
//! touched from here.

use crate::engine::{CocoTable, ModeController};
use crate::engine::coco_table::RemovalOutcome;
use crate::infrastructure::{RecoveryStore, RequestQueue, TimerService};
use cocotuned_domain::{
    Applier, DefaultApplier, Mode, Request, RequestDuration, RequestHandle, Resource, ResourceConfig, ResourceRegistry,
    TunerError,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One unit of work drained from the request queue.
pub enum Op {
    Tune(Request),
    Update { handle: RequestHandle, new_duration: RequestDuration },
    Untune { handle: RequestHandle },
    TimerExpired { handle: RequestHandle },
    ModeChanged(Mode),
}

pub struct Serializer {
    registry: ResourceRegistry,
    table: CocoTable,
    mode_controller: ModeController,
    requests: HashMap<RequestHandle, Request>,
    timers: TimerService,
    timer_ids: cocotuned_domain::HandleGenerator,
    recovery: RecoveryStore,
    default_applier: Arc<dyn DefaultApplier>,
    max_concurrent_requests: usize,
    max_resources_per_request: usize,
}

impl Serializer {
    /// `max_concurrent_requests`/`max_resources_per_request` size the
    /// request pool and the arbitration-node arena; see `Settings`.
    pub fn new(
        registry: ResourceRegistry,
        timers: TimerService,
        recovery: RecoveryStore,
        default_applier: Arc<dyn DefaultApplier>,
        initial_mode: Mode,
        max_concurrent_requests: usize,
        max_resources_per_request: usize,
    ) -> Self {
        let mut table = CocoTable::with_capacity(max_concurrent_requests.saturating_mul(max_resources_per_request));
        table.set_mode(initial_mode);
        Serializer {
            registry,
            table,
            mode_controller: ModeController::new(initial_mode),
            requests: HashMap::new(),
            timers,
            timer_ids: cocotuned_domain::HandleGenerator::new(),
            recovery,
            default_applier,
            max_concurrent_requests,
            max_resources_per_request,
        }
    }

    /// Drains `queue` until it is closed, applying each op in turn.
    pub fn run(&mut self, queue: &RequestQueue<Op>) {
        while let Some(op) = queue.pop_blocking() {
            self.handle(op);
        }
    }

    pub fn handle(&mut self, op: Op) {
        match op {
            Op::Tune(request) => self.handle_tune(request),
            Op::Update { handle, new_duration } => self.handle_update(handle, new_duration),
            Op::Untune { handle } => self.handle_untune(handle),
            Op::TimerExpired { handle } => self.handle_untune(handle),
            Op::ModeChanged(mode) => self.handle_mode_changed(mode),
        }
    }

    fn handle_tune(&mut self, mut request: Request) {
        if request.resources_count() > self.max_resources_per_request {
            warn!(
                handle = %request.handle,
                count = request.resources_count(),
                max = self.max_resources_per_request,
                "tune request exceeds max.resources.per.request, dropped"
            );
            return;
        }
        if self.requests.len() >= self.max_concurrent_requests {
            warn!(
                handle = %request.handle,
                live = self.requests.len(),
                max = self.max_concurrent_requests,
                "max.concurrent.requests reached, tune request dropped"
            );
            return;
        }

        if !self.mode_controller.gate(request.handle, request.mode_gate) {
            info!(handle = %request.handle, "request parked pending mode change");
            self.requests.insert(request.handle, request);
            return;
        }
        self.grant(&mut request);
        if request.resources_count() > 0 && request.granted_count() == 0 {
            warn!(handle = %request.handle, "no resources could be allocated, request dropped");
            return;
        }
        if let Err(e) = self.schedule_timer_if_finite(&mut request) {
            warn!(error = %e, handle = %request.handle, "timer pool exhausted, rolling back granted resources");
            self.release_granted_resources(request.handle, &request);
            return;
        }
        self.requests.insert(request.handle, request);
    }

    /// Attempts to link every resource of `request` that isn't already
    /// linked, writing through whichever resource became the new head of
    /// its bucket. Stops early, leaving the remainder unlinked, the moment
    /// the arbitration-node arena reports exhaustion -- the caller sees a
    /// partial grant (`granted_count() < resources_count()`) rather than an
    /// error, per the partial-grant INSERT contract.
    fn grant(&mut self, request: &mut Request) {
        let already_granted = request.granted_count();
        for index in already_granted..request.resources_count() {
            let resource = request.resource_at(index).expect("index within bounds").clone();
            let Some(config) = self.registry.lookup(resource.code).cloned() else {
                warn!(code = %resource.code, "tune request references unknown resource");
                break;
            };
            match self.table.insert(&config, request.handle, index, &resource, request.priority) {
                Ok(write_value) => {
                    request.set_granted(index + 1);
                    if let Some(value) = write_value {
                        if let Err(e) = self.write_value(&config, &resource, &value) {
                            warn!(error = %e, code = %resource.code, "failed to apply resource value");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, handle = %request.handle, granted = index, "arbitration node arena exhausted, partial grant");
                    break;
                }
            }
        }
    }

    /// No-ops for an infinite-duration request. For a finite one, schedules
    /// the expiry timer and fails with whatever `TimerService::schedule`
    /// reports (pool exhaustion) without touching `request.timer_id`, so the
    /// caller can tell a failed schedule from a successful one.
    fn schedule_timer_if_finite(&mut self, request: &mut Request) -> Result<(), TunerError> {
        let Some(millis) = request.duration.as_millis() else {
            return Ok(());
        };
        let timer_id = self.timer_ids.next_timer_id();
        self.timers.schedule(timer_id, request.handle, Duration::from_millis(millis))?;
        request.timer_id = Some(timer_id);
        Ok(())
    }

    fn handle_update(&mut self, handle: RequestHandle, new_duration: RequestDuration) {
        let Some(mut request) = self.requests.remove(&handle) else {
            warn!(%handle, "update for unknown handle");
            return;
        };
        if !request.duration.is_monotonic_extension(new_duration) {
            warn!(%handle, "rejected non-monotonic duration update");
            self.requests.insert(handle, request);
            return;
        }
        if let Some(timer_id) = request.timer_id.take() {
            self.timers.cancel(timer_id);
        }
        request.duration = new_duration;
        match self.schedule_timer_if_finite(&mut request) {
            Ok(()) => {
                self.requests.insert(handle, request);
            }
            Err(e) => {
                warn!(error = %e, %handle, "timer pool exhausted on update, removing request as if expired");
                self.release_granted_resources(handle, &request);
            }
        }
    }

    fn handle_untune(&mut self, handle: RequestHandle) {
        let Some(mut request) = self.requests.remove(&handle) else {
            warn!(%handle, "untune for unknown handle");
            return;
        };
        if let Some(timer_id) = request.timer_id.take() {
            self.timers.cancel(timer_id);
        }
        self.release_granted_resources(handle, &request);
    }

    /// Walks `request`'s granted resources in `cleanup_order`, unlinking
    /// each from the table and reapplying or tearing the device value per
    /// what `CocoTable::remove` reports. Shared by untune, mode-transition
    /// parking, and the rollback after a timer-allocation failure -- all
    /// three need the exact same unwind, just with different bookkeeping
    /// around it.
    fn release_granted_resources(&mut self, handle: RequestHandle, request: &Request) {
        let order: Vec<usize> = request.cleanup_order().collect();
        for index in order {
            if index >= request.granted_count() {
                continue;
            }
            let Some(resource) = request.resource_at(index) else { continue };
            let resource = resource.clone();
            let Some(config) = self.registry.lookup(resource.code).cloned() else { continue };
            match self.table.remove(&config, handle, index, &resource) {
                Some(RemovalOutcome::Reapply(value)) => {
                    if let Err(e) = self.write_value(&config, &resource, &value) {
                        warn!(error = %e, code = %resource.code, "failed to reapply resource value");
                    }
                }
                Some(RemovalOutcome::TearToDefault) => {
                    if let Err(e) = self.tear(&config) {
                        warn!(error = %e, code = %resource.code, "failed to restore default value");
                    }
                }
                None => {}
            }
        }
    }

    /// Scans live requests for ones `mode` just gated out, parks them (same
    /// per-resource cleanup as untune, but the request is kept rather than
    /// freed), then resumes whatever the mode controller's pending list now
    /// accepts -- mirroring a suspend/resume cycle's REMOVE-then-reinsert.
    fn handle_mode_changed(&mut self, mode: Mode) {
        self.table.set_mode(mode);
        let new_mask = cocotuned_domain::ModeMask::single(mode);
        let to_park: Vec<RequestHandle> = self
            .requests
            .iter()
            .filter(|(_, r)| r.granted_count() > 0 && !r.mode_gate.intersects(new_mask))
            .map(|(handle, _)| *handle)
            .collect();

        for handle in to_park {
            if let Some(mut request) = self.requests.remove(&handle) {
                self.release_granted_resources(handle, &request);
                request.reset_granted();
                self.mode_controller.park(handle, request.mode_gate);
                self.requests.insert(handle, request);
            }
        }

        let resumed = self.mode_controller.notify(mode);
        for handle in resumed {
            if let Some(mut request) = self.requests.remove(&handle) {
                self.grant(&mut request);
                let timer_ok = if request.timer_id.is_none() {
                    self.schedule_timer_if_finite(&mut request).is_ok()
                } else {
                    true
                };
                if timer_ok {
                    self.requests.insert(handle, request);
                } else {
                    warn!(%handle, "timer pool exhausted on resume, dropping request");
                    self.release_granted_resources(handle, &request);
                }
            }
        }
    }

    fn write_value(&self, config: &ResourceConfig, resource: &Resource, value: &cocotuned_domain::ResourceValue) -> Result<(), TunerError> {
        if let Some(applier) = self.registry.applier_for(config.code) {
            return applier.apply(resource);
        }
        match &config.path {
            Some(path) => self.default_applier.apply_default(path, &value.render()),
            None => Err(TunerError::invalid_argument(format!("resource {} has no path and no custom applier", config.code))),
        }
    }

    fn tear(&self, config: &ResourceConfig) -> Result<(), TunerError> {
        if let Some(tear) = self.registry.tear_for(config.code) {
            let placeholder = Resource::new(config.code, cocotuned_domain::ScopeKey::GLOBAL, cocotuned_domain::ResourceValue::Single(0));
            return tear.apply(&placeholder);
        }
        match &config.path {
            Some(path) => self.default_applier.apply_default(path, &config.default_value),
            None => Ok(()),
        }
    }

    /// Replays the recovery log and resource catalog before the queue
    /// starts draining, restoring every previously-recorded default.
    pub fn restore_from_recovery(&self) -> Result<(), TunerError> {
        for (path, default_value) in self.recovery.replay()? {
            self.default_applier.apply_default(&path, &default_value)?;
        }
        Ok(())
    }

    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::appliers::InMemoryApplier;
    use cocotuned_domain::{ArbitrationPolicy, HandleGenerator, ModeMask, PriorityClass, ResourceCode, ResourceConfigBuilder, ResourceValue, Scope, ScopeKey, UntuneDirection};
    use std::path::PathBuf;

    fn resource_config(res_id: u16, path: &str) -> ResourceConfig {
        ResourceConfigBuilder::new()
            .res_id(res_id)
            .res_type(1)
            .name(format!("resource-{res_id}"))
            .path(path)
            .policy(ArbitrationPolicy::HigherBetter)
            .scope(Scope::Global)
            .low_threshold(i32::MIN)
            .high_threshold(i32::MAX)
            .default_value("0")
            .build()
            .unwrap()
    }

    fn serializer(max_concurrent_requests: usize, max_resources_per_request: usize) -> (Serializer, PathBuf) {
        let path = std::env::temp_dir().join(format!("cocotuned-serializer-test-{:p}", &max_concurrent_requests as *const _));
        let recovery = RecoveryStore::open(&path).unwrap();
        let applier: Arc<dyn DefaultApplier> = Arc::new(InMemoryApplier::new());
        let serializer = Serializer::new(
            ResourceRegistry::new(),
            TimerService::start(1, 2, max_concurrent_requests.max(1)).unwrap(),
            recovery,
            applier,
            Mode::DisplayOn,
            max_concurrent_requests,
            max_resources_per_request,
        );
        (serializer, path)
    }

    fn tune_request(handle: RequestHandle, resources: Vec<Resource>) -> Request {
        Request::new(
            handle,
            1,
            1,
            PriorityClass::ThirdPartyHigh,
            RequestDuration::Infinite,
            ModeMask::single(Mode::DisplayOn),
            UntuneDirection::Forward,
            resources,
        )
    }

    #[test]
    fn tune_request_exceeding_max_resources_per_request_is_dropped() {
        let (mut serializer, path) = serializer(10, 1);
        let resources = vec![
            Resource::new(ResourceCode::new(1, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(1)),
            Resource::new(ResourceCode::new(2, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(2)),
        ];
        let request = tune_request(RequestHandle::new(1), resources);
        serializer.handle(Op::Tune(request));
        assert!(serializer.requests.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn tune_request_beyond_max_concurrent_requests_is_dropped() {
        let (mut serializer, path) = serializer(1, 5);
        let config = resource_config(1, "/sys/a");
        serializer.registry_mut().register(config, |_, _| {}).unwrap();

        let mut handles = HandleGenerator::new();
        let first = tune_request(
            handles.next_request_handle(),
            vec![Resource::new(ResourceCode::new(1, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(1))],
        );
        serializer.handle(Op::Tune(first));
        assert_eq!(serializer.requests.len(), 1);

        let second = tune_request(
            handles.next_request_handle(),
            vec![Resource::new(ResourceCode::new(1, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(2))],
        );
        serializer.handle(Op::Tune(second));
        assert_eq!(serializer.requests.len(), 1, "second request should be rejected once at capacity");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn partial_grant_stops_at_the_first_unregistered_resource() {
        // max_concurrent_requests * max_resources_per_request sizes the
        // arbitration-node arena to the worst-case simultaneous usage under
        // the admission checks above, so it can never itself be exhausted by
        // a single admitted request (see the dedicated exhaustion coverage
        // in `engine::coco_table`'s tests). An unregistered resource code
        // produces the same "admit with a partial grant" outcome through a
        // different path: `grant()` stops the moment a lookup misses.
        let (mut serializer, path) = serializer(10, 5);
        let config_a = resource_config(1, "/sys/a");
        serializer.registry_mut().register(config_a, |_, _| {}).unwrap();

        let resources = vec![
            Resource::new(ResourceCode::new(1, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(10)),
            Resource::new(ResourceCode::new(99, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(20)),
        ];
        let handle = RequestHandle::new(1);
        let request = tune_request(handle, resources);
        serializer.handle(Op::Tune(request));

        let stored = serializer.requests.get(&handle).expect("request should be admitted with a partial grant");
        assert_eq!(stored.granted_count(), 1);
        assert_eq!(stored.resources_count(), 2);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn request_with_zero_possible_grants_is_dropped_entirely() {
        let (mut serializer, path) = serializer(10, 5);
        // No resource registered under this code, so grant() can't find a
        // config and stops immediately with zero grants.
        let resources = vec![Resource::new(ResourceCode::new(99, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(1))];
        let handle = RequestHandle::new(1);
        let request = tune_request(handle, resources);
        serializer.handle(Op::Tune(request));
        assert!(serializer.requests.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn timer_pool_exhaustion_rolls_back_the_grant_and_drops_the_request() {
        let path = std::env::temp_dir().join("cocotuned-serializer-test-timer-exhaustion");
        let recovery = RecoveryStore::open(&path).unwrap();
        let applier: Arc<dyn DefaultApplier> = Arc::new(InMemoryApplier::new());
        // A timer pool with zero capacity: any finite-duration request fails
        // to schedule, no matter how much table/request headroom is left.
        let mut serializer = Serializer::new(ResourceRegistry::new(), TimerService::start(1, 1, 0).unwrap(), recovery, applier, Mode::DisplayOn, 10, 5);
        let config = resource_config(1, "/sys/a");
        serializer.registry_mut().register(config, |_, _| {}).unwrap();

        let handle = RequestHandle::new(1);
        let request = Request::new(
            handle,
            1,
            1,
            PriorityClass::ThirdPartyHigh,
            RequestDuration::Finite(60_000),
            ModeMask::single(Mode::DisplayOn),
            UntuneDirection::Forward,
            vec![Resource::new(ResourceCode::new(1, 1, false), ScopeKey::GLOBAL, ResourceValue::Single(5))],
        );
        serializer.handle(Op::Tune(request));

        assert!(serializer.requests.is_empty(), "request should be dropped entirely once its timer can't be scheduled");
        let _ = std::fs::remove_file(path);
    }
}
