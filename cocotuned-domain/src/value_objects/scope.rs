// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scope: the partitioning dimension over which conflicts for a resource arise,
//! and the `ScopeKey` that selects a partition within it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Global,
    PerCore,
    PerCluster,
    PerCgroup,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Global => "global",
            Scope::PerCore => "core",
            Scope::PerCluster => "cluster",
            Scope::PerCgroup => "cgroup",
        };
        f.write_str(s)
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Scope::Global),
            "core" => Ok(Scope::PerCore),
            "cluster" => Ok(Scope::PerCluster),
            "cgroup" => Ok(Scope::PerCgroup),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

/// The physical core/cluster/cgroup index selecting a partition within a scope.
/// Ignored (always logically 0) for `Scope::Global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey(pub u32);

impl ScopeKey {
    pub const GLOBAL: ScopeKey = ScopeKey(0);
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_registry_scope_names() {
        assert_eq!("global".parse::<Scope>().unwrap(), Scope::Global);
        assert_eq!("core".parse::<Scope>().unwrap(), Scope::PerCore);
        assert_eq!("cluster".parse::<Scope>().unwrap(), Scope::PerCluster);
        assert_eq!("cgroup".parse::<Scope>().unwrap(), Scope::PerCgroup);
        assert!("node".parse::<Scope>().is_err());
    }

    #[test]
    fn global_scope_key_is_zero() {
        assert_eq!(ScopeKey::GLOBAL, ScopeKey(0));
    }
}
