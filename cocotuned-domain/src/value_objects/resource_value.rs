// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The value carried by a resource assignment: a single integer, or an
//! ordered array of integers for resources that require a custom applier.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceValue {
    Single(i32),
    Multi(Vec<i32>),
}

impl ResourceValue {
    pub fn values_count(&self) -> usize {
        match self {
            ResourceValue::Single(_) => 1,
            ResourceValue::Multi(values) => values.len(),
        }
    }

    /// The value the arbitration comparator sorts by.
    ///
    /// For `Single`, this is the value itself. For `Multi`, the original
    /// engine reads index 1 (the second element), not index 0 -- preserved
    /// here unchanged; see DESIGN.md's Open Question #1. Returns `None` for
    /// a `Multi` value too short to have an index 1, which the caller should
    /// treat as "cannot be ordered, append at tail".
    pub fn comparator_value(&self) -> Option<i32> {
        match self {
            ResourceValue::Single(v) => Some(*v),
            ResourceValue::Multi(values) => values.get(1).copied(),
        }
    }

    /// The value read for scope identification (e.g. the cgroup id a
    /// `PerCgroup`-scoped resource targets) -- always index 0, distinct from
    /// [`Self::comparator_value`]'s index 1.
    pub fn scope_identity_value(&self) -> i32 {
        match self {
            ResourceValue::Single(v) => *v,
            ResourceValue::Multi(values) => values.first().copied().unwrap_or(0),
        }
    }

    /// `true` when writing this value requires a custom applier (the default
    /// applier only stringifies single values; see §4.5 `apply_action`).
    pub fn requires_custom_applier(&self) -> bool {
        matches!(self, ResourceValue::Multi(_))
    }

    /// Renders the value the way the default applier would write it to a
    /// sysfs-style path: a bare integer, or space-joined integers.
    pub fn render(&self) -> String {
        match self {
            ResourceValue::Single(v) => v.to_string(),
            ResourceValue::Multi(values) => values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
