// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Priority Class
//!
//! The four priority bands a request is admitted under. Numeric value doubles
//! as arbitration rank: `SystemHigh` (0) is the most preferred, `ThirdPartyLow`
//! (3) the least. `Ord` is derived directly off declaration order so that
//! `a < b` means "`a` wins over `b`".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering of variants is load-bearing: it is the arbitration rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PriorityClass {
    SystemHigh = 0,
    SystemLow = 1,
    ThirdPartyHigh = 2,
    ThirdPartyLow = 3,
}

impl PriorityClass {
    pub const COUNT: usize = 4;

    pub fn as_index(self) -> usize {
        self as u8 as usize
    }

    /// `true` when `self` is at least as preferred as `other` (numerically `<=`).
    pub fn at_least_as_preferred_as(self, other: PriorityClass) -> bool {
        self <= other
    }

    pub fn all() -> [PriorityClass; 4] {
        [
            PriorityClass::SystemHigh,
            PriorityClass::SystemLow,
            PriorityClass::ThirdPartyHigh,
            PriorityClass::ThirdPartyLow,
        ]
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriorityClass::SystemHigh => "SYSTEM_HIGH",
            PriorityClass::SystemLow => "SYSTEM_LOW",
            PriorityClass::ThirdPartyHigh => "THIRD_PARTY_HIGH",
            PriorityClass::ThirdPartyLow => "THIRD_PARTY_LOW",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_preference() {
        assert!(PriorityClass::SystemHigh < PriorityClass::SystemLow);
        assert!(PriorityClass::SystemLow < PriorityClass::ThirdPartyHigh);
        assert!(PriorityClass::ThirdPartyHigh < PriorityClass::ThirdPartyLow);
    }

    #[test]
    fn at_least_as_preferred() {
        assert!(PriorityClass::SystemHigh.at_least_as_preferred_as(PriorityClass::SystemHigh));
        assert!(PriorityClass::SystemHigh.at_least_as_preferred_as(PriorityClass::ThirdPartyLow));
        assert!(!PriorityClass::ThirdPartyLow.at_least_as_preferred_as(PriorityClass::SystemHigh));
    }

    #[test]
    fn index_matches_declared_value() {
        assert_eq!(PriorityClass::SystemHigh.as_index(), 0);
        assert_eq!(PriorityClass::ThirdPartyLow.as_index(), 3);
    }

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(PriorityClass::SystemHigh.to_string(), "SYSTEM_HIGH");
        assert_eq!(PriorityClass::ThirdPartyLow.to_string(), "THIRD_PARTY_LOW");
    }
}
