// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The seam between the arbitration engine and the outside world. The engine
//! never writes to a device itself; it calls an `Applier` and trusts the
//! result. The default sysfs writer and the in-memory test double both live
//! in the infrastructure layer, on the other side of this trait.

use crate::entities::Resource;
use crate::error::TunerError;

/// Performs (or tears down) one resource write. Implementations must be
/// cheap to call from the single-threaded serializer loop; anything that can
/// block should hand off to its own worker internally.
pub trait Applier: Send + Sync {
    fn apply(&self, resource: &Resource) -> Result<(), TunerError>;
}

/// Applies a default value string rather than a [`Resource`], used for the
/// tear action's restore-to-default path.
pub trait DefaultApplier: Send + Sync {
    fn apply_default(&self, path: &str, default_value: &str) -> Result<(), TunerError>;
}
