// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Resource Config
//!
//! The read-mostly catalog entry for a single tunable, created once at
//! registry init and never reallocated. `ResourceConfigBuilder` mirrors the
//! original registry's string-keyed `ResourceConfigInfoBuilder`, so the
//! infrastructure-layer config loader can build one entry per catalog row
//! without re-deriving parsing rules here.

use crate::error::TunerError;
use crate::value_objects::{ArbitrationPolicy, ModeMask, Permission, ResourceCode, Scope};
use serde::{Deserialize, Serialize};

/// Whether a resource's apply/tear action is the default sysfs write or a
/// callback bound through [`crate::registry::ResourceRegistry::attach_hooks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApplierBinding {
    #[default]
    Default,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub code: ResourceCode,
    pub name: String,
    pub path: Option<String>,
    pub policy: ArbitrationPolicy,
    pub scope: Scope,
    pub permission: Permission,
    pub mode_mask: ModeMask,
    pub low_threshold: i32,
    pub high_threshold: i32,
    pub default_value: String,
    pub applier: ApplierBinding,
    pub tear: ApplierBinding,
}

impl ResourceConfig {
    pub fn bounds_contain(&self, value: i32) -> bool {
        value >= self.low_threshold && value <= self.high_threshold
    }
}

/// Builds a [`ResourceConfig`] from the string-keyed fields the config loader
/// reads out of the resource catalog, the way `ResourceConfigInfoBuilder`
/// builds a `ResourceConfigInfo` in the original registry.
#[derive(Debug, Default)]
pub struct ResourceConfigBuilder {
    res_id: Option<u16>,
    res_type: Option<u8>,
    vendor: bool,
    name: Option<String>,
    path: Option<String>,
    policy: Option<ArbitrationPolicy>,
    scope: Option<Scope>,
    permission: Permission_,
    mode_mask: ModeMask,
    low_threshold: i32,
    high_threshold: i32,
    default_value: String,
}

// Keeps the field above terse while avoiding a name collision with the
// `Permission` value object re-exported at crate root.
type Permission_ = Permission;

impl ResourceConfigBuilder {
    pub fn new() -> Self {
        ResourceConfigBuilder {
            permission: Permission::ThirdParty,
            mode_mask: ModeMask::single(crate::value_objects::Mode::DisplayOn),
            ..Default::default()
        }
    }

    pub fn res_id(mut self, res_id: u16) -> Self {
        self.res_id = Some(res_id);
        self
    }

    pub fn res_type(mut self, res_type: u8) -> Self {
        self.res_type = Some(res_type);
        self
    }

    pub fn vendor(mut self, vendor: bool) -> Self {
        self.vendor = vendor;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn policy(mut self, policy: ArbitrationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Accumulates a mode bit, matching the original builder's
    /// `setModes` being callable once per mode.
    pub fn add_mode(mut self, mode: crate::value_objects::Mode) -> Self {
        self.mode_mask |= ModeMask::single(mode);
        self
    }

    pub fn low_threshold(mut self, value: i32) -> Self {
        self.low_threshold = value;
        self
    }

    pub fn high_threshold(mut self, value: i32) -> Self {
        self.high_threshold = value;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Rejects malformed entries (missing identity or invalid bounds), as
    /// `ResourceRegistry::isResourceConfigMalformed` does before registration.
    pub fn build(self) -> Result<ResourceConfig, TunerError> {
        let res_id = self
            .res_id
            .ok_or_else(|| TunerError::invalid_argument("resource config missing res_id"))?;
        let res_type = self
            .res_type
            .ok_or_else(|| TunerError::invalid_argument("resource config missing res_type"))?;
        let policy = self
            .policy
            .ok_or_else(|| TunerError::invalid_argument("resource config missing policy"))?;
        let scope = self
            .scope
            .ok_or_else(|| TunerError::invalid_argument("resource config missing scope"))?;

        if self.low_threshold > self.high_threshold {
            return Err(TunerError::invalid_argument(format!(
                "low_threshold {} exceeds high_threshold {}",
                self.low_threshold, self.high_threshold
            )));
        }

        Ok(ResourceConfig {
            code: ResourceCode::new(res_id, res_type, self.vendor),
            name: self.name.unwrap_or_default(),
            path: self.path,
            policy,
            scope,
            permission: self.permission,
            mode_mask: self.mode_mask,
            low_threshold: self.low_threshold,
            high_threshold: self.high_threshold,
            default_value: self.default_value,
            applier: ApplierBinding::Default,
            tear: ApplierBinding::Default,
        })
    }
}
