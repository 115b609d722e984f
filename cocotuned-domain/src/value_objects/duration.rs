// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Request duration: a finite number of milliseconds, or the infinite
//! sentinel. The wire encoding is `-1` for infinite and `>= 0` for finite,
//! matching the original's `int64_t duration` field.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestDuration {
    Finite(u64),
    Infinite,
}

impl RequestDuration {
    /// Parses the wire encoding: `-1` means infinite, `>= 0` is milliseconds.
    /// Any other negative value is not a valid duration.
    pub fn from_millis_or_infinite(raw: i64) -> Result<Self, String> {
        match raw {
            -1 => Ok(RequestDuration::Infinite),
            v if v >= 0 => Ok(RequestDuration::Finite(v as u64)),
            other => Err(format!("invalid duration: {other}")),
        }
    }

    pub fn as_millis(self) -> Option<u64> {
        match self {
            RequestDuration::Finite(ms) => Some(ms),
            RequestDuration::Infinite => None,
        }
    }

    /// `true` when extending from `self` (the remaining duration) to `new`
    /// is a valid monotonic extension (§4.5's `update` contract): `new` must
    /// be at least as long as `self`. `Infinite` is greater than every
    /// `Finite` duration, so extending a finite request to infinite is
    /// always valid -- see DESIGN.md's Open Question #3.
    pub fn is_monotonic_extension(self, new: RequestDuration) -> bool {
        match (self, new) {
            (_, RequestDuration::Infinite) => true,
            (RequestDuration::Infinite, RequestDuration::Finite(_)) => false,
            (RequestDuration::Finite(old), RequestDuration::Finite(new)) => new >= old,
        }
    }
}

impl fmt::Display for RequestDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestDuration::Finite(ms) => write!(f, "{ms}ms"),
            RequestDuration::Infinite => write!(f, "infinite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_infinite_sentinel() {
        assert_eq!(RequestDuration::from_millis_or_infinite(-1).unwrap(), RequestDuration::Infinite);
    }

    #[test]
    fn parses_finite_duration() {
        assert_eq!(
            RequestDuration::from_millis_or_infinite(50).unwrap(),
            RequestDuration::Finite(50)
        );
    }

    #[test]
    fn rejects_other_negative_values() {
        assert!(RequestDuration::from_millis_or_infinite(-2).is_err());
    }

    #[test]
    fn finite_to_longer_finite_is_monotonic() {
        assert!(RequestDuration::Finite(100).is_monotonic_extension(RequestDuration::Finite(200)));
        assert!(!RequestDuration::Finite(200).is_monotonic_extension(RequestDuration::Finite(100)));
    }

    #[test]
    fn finite_to_infinite_is_always_monotonic() {
        // Open Question #3: preserved as valid, not rejected.
        assert!(RequestDuration::Finite(50).is_monotonic_extension(RequestDuration::Infinite));
    }

    #[test]
    fn infinite_to_finite_is_never_monotonic() {
        assert!(!RequestDuration::Infinite.is_monotonic_extension(RequestDuration::Finite(50)));
    }

    #[test]
    fn equal_finite_duration_is_monotonic() {
        assert!(RequestDuration::Finite(50).is_monotonic_extension(RequestDuration::Finite(50)));
    }
}
