// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A single tunable write a request asks to make: which resource, at which
//! scope instance, carrying which value.

use crate::value_objects::{ResourceCode, ResourceValue, ScopeKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub code: ResourceCode,
    pub scope_key: ScopeKey,
    pub value: ResourceValue,
}

impl Resource {
    pub fn new(code: ResourceCode, scope_key: ScopeKey, value: ResourceValue) -> Self {
        Resource { code, scope_key, value }
    }
}
