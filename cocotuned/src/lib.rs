// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Cocotuned
//!
//! The arbitration engine for a conflict-coordination daemon: a resource
//! registry, an in-memory arbitration table, a mode controller, a timer
//! service for request expiry, a priority-ordered request queue, and the
//! serializer thread that wires them together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Bootstrap                              │
//! │  (CLI, signal handling, process entry point)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Serializer                              │
//! │  (drains the request queue, the only table-mutating thread) │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────┬────────────────────┬─────────────────┐
//! │        Engine         │    Infrastructure  │       Domain    │
//! │ CocoTable, ModeCtrl,  │  Queue, Timer,      │  Requests,      │
//! │ Arena                 │  Appliers, Recovery │  Resources,     │
//! │                       │  Settings, Logging  │  Registry       │
//! └──────────────────────┴────────────────────┴─────────────────┘
//! ```
//!
//! ## Concurrency model
//!
//! The engine is thread-and-condvar based, not async: one dedicated thread
//! owns the [`engine::CocoTable`] and drains the [`infrastructure::RequestQueue`];
//! client threads only ever push onto that queue or the [`infrastructure::TimerService`].
//! `tokio` is used at the bootstrap layer alone, for signal handling and
//! graceful shutdown coordination.

pub mod engine;
pub mod infrastructure;
pub mod serializer;

pub use cocotuned_domain::{
    ArbitrationPolicy, HandleGenerator, Mode, ModeMask, Permission, PriorityClass, Request, RequestDuration,
    RequestHandle, Resource, ResourceConfig, ResourceConfigBuilder, ResourceRegistry, Scope, ScopeKey, TimerId,
    TunerError, UntuneDirection,
};
pub use engine::{Arena, CocoTable, ModeController};
pub use infrastructure::{InMemoryApplier, RecoveryStore, RequestQueue, Settings, SysfsApplier, TimerService};
pub use serializer::{Op, Serializer};
