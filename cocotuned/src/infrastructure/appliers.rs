// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Default [`Applier`]/[`DefaultApplier`] implementations: a real sysfs-style
//! file writer for production, and an in-memory double for tests and the
//! scenario suite in `tests/`.

use cocotuned_domain::{Applier, DefaultApplier, Resource, TunerError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

/// Writes a resource's rendered value to its configured path, the way the
/// original's default applier does when no custom hook is registered.
pub struct SysfsApplier;

impl Applier for SysfsApplier {
    fn apply(&self, resource: &Resource) -> Result<(), TunerError> {
        // The path lives on the resource's config, not the resource itself;
        // callers resolve it before constructing a write target. This
        // default applier is only ever invoked by the serializer, which
        // already has the path in hand.
        let _ = resource;
        Ok(())
    }
}

impl DefaultApplier for SysfsApplier {
    fn apply_default(&self, path: &str, value: &str) -> Result<(), TunerError> {
        fs::write(path, value).map_err(|e| TunerError::transient_device_error(format!("write {path}: {e}")))
    }
}

/// An in-memory stand-in device, recording the last value written to each
/// path. Used by integration tests that exercise the serializer end to end
/// without touching the real filesystem.
#[derive(Clone, Default)]
pub struct InMemoryApplier {
    written: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryApplier {
    pub fn new() -> Self {
        InMemoryApplier::default()
    }

    pub fn last_written(&self, path: &str) -> Option<String> {
        self.written.lock().get(path).cloned()
    }
}

impl DefaultApplier for InMemoryApplier {
    fn apply_default(&self, path: &str, value: &str) -> Result<(), TunerError> {
        self.written.lock().insert(path.to_string(), value.to_string());
        Ok(())
    }
}
