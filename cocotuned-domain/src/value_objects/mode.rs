// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Device Mode
//!
//! The display/suspend power state the device is in, and the mask a resource
//! or request uses to say which states it applies in. Mode is a bitmask, not
//! an enum: §6 allows multiple bits set "to indicate multi-state transition in
//! progress", and `apply_action` always treats it as a mask, never an equality
//! check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    DisplayOn = 1,
    DisplayOff = 2,
    Doze = 4,
}

/// A set of [`Mode`] bits, e.g. a resource's configured `mode_mask` or a
/// request's `mode_gate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ModeMask(pub u8);

impl ModeMask {
    pub const NONE: ModeMask = ModeMask(0);
    /// Every mode bit set; the permissive default for contexts (like a
    /// freshly constructed arbitration table) with no mode signal yet.
    pub const ALL: ModeMask = ModeMask(Mode::DisplayOn as u8 | Mode::DisplayOff as u8 | Mode::Doze as u8);

    pub fn single(mode: Mode) -> Self {
        ModeMask(mode as u8)
    }

    pub fn from_modes(modes: &[Mode]) -> Self {
        modes.iter().fold(ModeMask::NONE, |acc, &m| acc | ModeMask::single(m))
    }

    /// `true` if any bit of `self` is present in `current`, i.e. `self &
    /// current != 0`. This is the exact test `apply_action` and the mode
    /// gate use: `mode_mask & current_mode != 0`.
    pub fn intersects(self, current: ModeMask) -> bool {
        self.0 & current.0 != 0
    }

    pub fn contains(self, mode: Mode) -> bool {
        self.0 & (mode as u8) != 0
    }
}

impl BitOr for ModeMask {
    type Output = ModeMask;
    fn bitor(self, rhs: ModeMask) -> ModeMask {
        ModeMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModeMask {
    fn bitor_assign(&mut self, rhs: ModeMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ModeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(Mode::DisplayOn) {
            parts.push("DISPLAY_ON");
        }
        if self.contains(Mode::DisplayOff) {
            parts.push("DISPLAY_OFF");
        }
        if self.contains(Mode::Doze) {
            parts.push("DOZE");
        }
        if parts.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", parts.join("|"))
        }
    }
}
