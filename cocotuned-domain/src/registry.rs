// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Registry
//!
//! The catalog of every tunable the daemon knows about, keyed by
//! [`ResourceCode`]. Registration is append-or-overwrite: a second
//! registration under the exact same code (vendor bit included) replaces the
//! first in place; a vendor-flagged code and its plain counterpart never
//! collide, because the vendor bit is part of the key, so both entries
//! coexist. See DESIGN.md's registry divergence notes for how this differs
//! from the source this was distilled from.

use crate::applier::Applier;
use crate::entities::ResourceConfig;
use crate::error::TunerError;
use crate::value_objects::ResourceCode;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ResourceRegistry {
    configs: Vec<ResourceConfig>,
    index_by_code: HashMap<u32, usize>,
    appliers: HashMap<u32, Arc<dyn Applier>>,
    tears: HashMap<u32, Arc<dyn Applier>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        ResourceRegistry::default()
    }

    /// Registers `config`, overwriting any prior entry under the same exact
    /// code (vendor bit included). When `config.path` is non-empty, invokes
    /// `recovery` with `(path, default_value)` so the caller can persist a
    /// restore record -- gated on the path, not the default value, per the
    /// documented contract (see DESIGN.md).
    pub fn register(
        &mut self,
        config: ResourceConfig,
        mut recovery: impl FnMut(&str, &str),
    ) -> Result<ResourceCode, TunerError> {
        let code = config.code;
        let key = code.raw();

        if let Some(path) = config.path.as_deref() {
            if !path.is_empty() {
                recovery(path, &config.default_value);
            }
        }

        match self.index_by_code.get(&key) {
            Some(&index) => {
                self.configs[index] = config;
            }
            None => {
                let index = self.configs.len();
                self.configs.push(config);
                self.index_by_code.insert(key, index);
            }
        }

        Ok(code)
    }

    pub fn lookup(&self, code: ResourceCode) -> Option<&ResourceConfig> {
        self.index_by_code.get(&code.raw()).map(|&index| &self.configs[index])
    }

    pub fn primary_index(&self, code: ResourceCode) -> Option<usize> {
        self.index_by_code.get(&code.raw()).copied()
    }

    pub fn total_count(&self) -> usize {
        self.configs.len()
    }

    pub fn configs(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.configs.iter()
    }

    /// Binds custom apply/tear callbacks for `code`, flipping its
    /// [`crate::entities::ApplierBinding`] to `Custom`. Returns an error if
    /// `code` was never registered.
    pub fn attach_hooks(
        &mut self,
        code: ResourceCode,
        applier: Arc<dyn Applier>,
        tear: Arc<dyn Applier>,
    ) -> Result<(), TunerError> {
        let index = self
            .primary_index(code)
            .ok_or_else(|| TunerError::invalid_argument(format!("unknown resource code {code}")))?;
        self.configs[index].applier = crate::entities::ApplierBinding::Custom;
        self.configs[index].tear = crate::entities::ApplierBinding::Custom;
        self.appliers.insert(code.raw(), applier);
        self.tears.insert(code.raw(), tear);
        Ok(())
    }

    pub fn applier_for(&self, code: ResourceCode) -> Option<&Arc<dyn Applier>> {
        self.appliers.get(&code.raw())
    }

    pub fn tear_for(&self, code: ResourceCode) -> Option<&Arc<dyn Applier>> {
        self.tears.get(&code.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ResourceConfigBuilder;
    use crate::value_objects::{ArbitrationPolicy, Scope};

    fn config(vendor: bool, path: &str) -> ResourceConfig {
        ResourceConfigBuilder::new()
            .res_id(10)
            .res_type(1)
            .vendor(vendor)
            .name("test_resource")
            .path(path)
            .policy(ArbitrationPolicy::HigherBetter)
            .scope(Scope::Global)
            .default_value("0")
            .build()
            .unwrap()
    }

    #[test]
    fn second_registration_under_same_code_overwrites() {
        let mut registry = ResourceRegistry::new();
        registry.register(config(false, "/sys/a"), |_, _| {}).unwrap();
        registry.register(config(false, "/sys/b"), |_, _| {}).unwrap();
        assert_eq!(registry.total_count(), 1);
        let code = ResourceCode::new(10, 1, false);
        assert_eq!(registry.lookup(code).unwrap().path.as_deref(), Some("/sys/b"));
    }

    #[test]
    fn vendor_and_plain_codes_coexist() {
        let mut registry = ResourceRegistry::new();
        registry.register(config(false, "/sys/a"), |_, _| {}).unwrap();
        registry.register(config(true, "/sys/b"), |_, _| {}).unwrap();
        assert_eq!(registry.total_count(), 2);
        assert!(registry.lookup(ResourceCode::new(10, 1, false)).is_some());
        assert!(registry.lookup(ResourceCode::new(10, 1, true)).is_some());
    }

    #[test]
    fn recovery_sink_fires_only_for_non_empty_path() {
        let mut registry = ResourceRegistry::new();
        let mut recorded = Vec::new();
        registry.register(config(false, "/sys/a"), |path, default| recorded.push((path.to_string(), default.to_string()))).unwrap();
        assert_eq!(recorded, vec![("/sys/a".to_string(), "0".to_string())]);

        let mut recorded_empty = Vec::new();
        registry.register(config(false, ""), |path, default| recorded_empty.push((path.to_string(), default.to_string()))).unwrap();
        assert!(recorded_empty.is_empty());
    }

    #[test]
    fn attach_hooks_requires_known_code() {
        let mut registry = ResourceRegistry::new();
        struct NoopApplier;
        impl Applier for NoopApplier {
            fn apply(&self, _resource: &crate::entities::Resource) -> Result<(), TunerError> {
                Ok(())
            }
        }
        let result = registry.attach_hooks(ResourceCode::new(99, 1, false), Arc::new(NoopApplier), Arc::new(NoopApplier));
        assert!(result.is_err());
    }
}
