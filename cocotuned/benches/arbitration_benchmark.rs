// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Benchmarks the `CocoTable` insert/remove hot path under each of the four
//! arbitration policies, since this is the per-request code path the daemon
//! runs on its single table-owning thread.

use cocotuned::{
    ArbitrationPolicy, CocoTable, PriorityClass, RequestHandle, Resource, ResourceConfig, ResourceConfigBuilder, ResourceValue, Scope,
    ScopeKey,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const REQUEST_COUNT: usize = 64;

fn config_for(policy: ArbitrationPolicy) -> ResourceConfig {
    ResourceConfigBuilder::new()
        .res_id(1)
        .res_type(0)
        .name("bench")
        .path("/sys/bench")
        .policy(policy)
        .scope(Scope::Global)
        .low_threshold(0)
        .high_threshold(i32::MAX)
        .default_value("0")
        .build()
        .unwrap()
}

fn insert_then_remove_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_then_remove_all");
    for policy in [
        ArbitrationPolicy::HigherBetter,
        ArbitrationPolicy::LowerBetter,
        ArbitrationPolicy::LazyApply,
        ArbitrationPolicy::InstantApply,
    ] {
        group.bench_with_input(BenchmarkId::new("policy", format!("{policy:?}")), &policy, |b, &policy| {
            let config = config_for(policy);
            b.iter(|| {
                let mut table = CocoTable::with_capacity(REQUEST_COUNT);
                let handles: Vec<RequestHandle> = (0..REQUEST_COUNT as u64).map(RequestHandle::new).collect();
                for (i, &handle) in handles.iter().enumerate() {
                    let res = Resource::new(config.code, ScopeKey::GLOBAL, ResourceValue::Single(i as i32));
                    let outcome = table.insert(&config, handle, 0, &res, PriorityClass::ThirdPartyHigh).unwrap();
                    black_box(outcome);
                }
                for (i, &handle) in handles.iter().enumerate() {
                    let res = Resource::new(config.code, ScopeKey::GLOBAL, ResourceValue::Single(i as i32));
                    let outcome = table.remove(&config, handle, 0, &res);
                    black_box(outcome);
                }
            });
        });
    }
    group.finish();
}

fn per_core_scatter(c: &mut Criterion) {
    let config = ResourceConfigBuilder::new()
        .res_id(2)
        .res_type(0)
        .name("bench_per_core")
        .path("/sys/bench_per_core")
        .policy(ArbitrationPolicy::HigherBetter)
        .scope(Scope::PerCore)
        .default_value("0")
        .build()
        .unwrap();

    c.bench_function("per_core_insert", |b| {
        b.iter(|| {
            let mut table = CocoTable::with_capacity(REQUEST_COUNT);
            for i in 0..REQUEST_COUNT as u64 {
                let handle = RequestHandle::new(i);
                let res = Resource::new(config.code, ScopeKey((i % 8) as u32), ResourceValue::Single(i as i32));
                let outcome = table.insert(&config, handle, 0, &res, PriorityClass::ThirdPartyHigh).unwrap();
                black_box(outcome);
            }
        });
    });
}

criterion_group!(benches, insert_then_remove_all, per_core_scatter);
criterion_main!(benches);
