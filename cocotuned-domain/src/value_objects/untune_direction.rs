// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The order in which a request's resources are cleaned up on REMOVE.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UntuneDirection {
    #[default]
    Forward,
    Reverse,
}

impl UntuneDirection {
    /// Yields indices `0..len` in cleanup order.
    pub fn indices(self, len: usize) -> Box<dyn Iterator<Item = usize>> {
        match self {
            UntuneDirection::Forward => Box::new(0..len),
            UntuneDirection::Reverse => Box::new((0..len).rev()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_yields_ascending_indices() {
        let indices: Vec<usize> = UntuneDirection::Forward.indices(3).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn reverse_yields_descending_indices() {
        let indices: Vec<usize> = UntuneDirection::Reverse.indices(3).collect();
        assert_eq!(indices, vec![2, 1, 0]);
    }
}
