// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Arbitration policy: how a resource's per-slot ordered list accepts new nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArbitrationPolicy {
    /// Insert before the first node with a strictly smaller value; append otherwise.
    HigherBetter,
    /// Insert before the first node with a strictly greater value; append otherwise.
    LowerBetter,
    /// Always append at the tail.
    LazyApply,
    /// Always prepend at the head.
    InstantApply,
}

impl fmt::Display for ArbitrationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArbitrationPolicy::HigherBetter => "higher_is_better",
            ArbitrationPolicy::LowerBetter => "lower_is_better",
            ArbitrationPolicy::LazyApply => "lazy_apply",
            ArbitrationPolicy::InstantApply => "instant_apply",
        };
        f.write_str(s)
    }
}

/// Parses the registry's string-keyed policy names (see `ResourceConfigInfoBuilder::setPolicy`
/// in the original registry).
impl FromStr for ArbitrationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "higher_is_better" => Ok(ArbitrationPolicy::HigherBetter),
            "lower_is_better" => Ok(ArbitrationPolicy::LowerBetter),
            "lazy_apply" => Ok(ArbitrationPolicy::LazyApply),
            "instant_apply" => Ok(ArbitrationPolicy::InstantApply),
            other => Err(format!("unknown arbitration policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for policy in [
            ArbitrationPolicy::HigherBetter,
            ArbitrationPolicy::LowerBetter,
            ArbitrationPolicy::LazyApply,
            ArbitrationPolicy::InstantApply,
        ] {
            let parsed: ArbitrationPolicy = policy.to_string().parse().unwrap();
            assert_eq!(parsed, policy);
        }
    }

    #[test]
    fn rejects_unknown_policy_name() {
        assert!("best_effort".parse::<ArbitrationPolicy>().is_err());
    }
}
