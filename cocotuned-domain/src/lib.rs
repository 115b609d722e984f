// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cocotuned Domain
//!
//! The transport- and storage-independent core of the conflict-coordination
//! table: resource identity and values, requests, the resource catalog, and
//! the registry that holds it. Nothing in this crate performs I/O, spawns a
//! thread, or reaches for a clock -- those belong to the `cocotuned`
//! application crate, which depends on this one.

pub mod applier;
pub mod entities;
pub mod error;
pub mod registry;
pub mod value_objects;

pub use applier::{Applier, DefaultApplier};
pub use entities::{ApplierBinding, Request, Resource, ResourceConfig, ResourceConfigBuilder};
pub use error::TunerError;
pub use registry::ResourceRegistry;
pub use value_objects::{
    ArbitrationPolicy, HandleGenerator, Mode, ModeMask, Permission, PriorityClass, RequestDuration, RequestHandle,
    ResourceCode, ResourceValue, Scope, ScopeKey, TimerId, UntuneDirection,
};
