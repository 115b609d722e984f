// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Settings
//!
//! Layered runtime configuration: a built-in default, an optional file (TOML
//! or YAML, by extension), then `COCOTUNED_*` environment overrides, in that
//! order of increasing precedence.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the resource catalog describing every tunable this daemon
    /// knows about.
    pub resource_catalog_path: String,
    /// Path to the recovery log appended on every registration with a
    /// non-empty path, and replayed on startup.
    pub recovery_log_path: String,
    /// Socket or named-pipe path clients connect to.
    pub listen_path: String,
    /// Core (always-alive) worker thread count for the timer service's
    /// expiry pool.
    pub timer_worker_threads: usize,
    /// Ceiling the timer service's expiry pool may grow to under load,
    /// above `timer_worker_threads`; elastic workers above the core count
    /// retire once the backlog clears.
    pub timer_max_scaling_threads: usize,
    pub log_level: String,

    /// `max.concurrent.requests` -- upper bound on live requests; also sizes
    /// the arbitration-node arena together with `max_resources_per_request`.
    pub max_concurrent_requests: usize,
    /// `max.resources.per.request` -- upper bound on resources per request.
    pub max_resources_per_request: usize,
    /// `pulse.duration` (ms) -- heartbeat interval.
    pub pulse_duration_ms: u64,
    /// `garbage_collection.duration` (ms) -- client GC cadence.
    pub garbage_collection_duration_ms: u64,
    /// `rate_limiter.delta` -- reserved, carried through unused.
    pub rate_limiter_delta: u32,
    /// `penalty.factor` -- reserved, carried through unused.
    pub penalty_factor: f64,
    /// `reward.factor` -- reserved, carried through unused.
    pub reward_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            resource_catalog_path: "/etc/cocotuned/resources.yaml".to_string(),
            recovery_log_path: "/var/lib/cocotuned/recovery.log".to_string(),
            listen_path: "/run/cocotuned.sock".to_string(),
            timer_worker_threads: 2,
            timer_max_scaling_threads: 4,
            log_level: "info".to_string(),
            max_concurrent_requests: 120,
            max_resources_per_request: 5,
            pulse_duration_ms: 60_000,
            garbage_collection_duration_ms: 83_000,
            rate_limiter_delta: 5,
            penalty_factor: 2.0,
            reward_factor: 0.4,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (if it exists) layered over the defaults,
    /// then applies `COCOTUNED_*` environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let defaults = Settings::default();
        let mut builder = config::Config::builder().add_source(
            config::Config::try_from(&defaults).context("failed to seed settings with defaults")?,
        );

        if let Some(path) = path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("COCOTUNED").separator("__"));

        let settings = builder.build().context("failed to build settings")?;
        settings.try_deserialize().context("failed to deserialize settings")
    }
}
