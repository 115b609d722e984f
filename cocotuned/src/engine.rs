// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Arbitration Engine
//!
//! The table of in-flight requests, the arena it's built on, and the mode
//! controller that gates which requests may currently be applied. Everything
//! here is single-threaded by contract -- callers serialize access through
//! the `cocotuned::serializer` loop, the same way the original's single
//! worker thread owned the table.

pub mod arena;
pub mod coco_table;
pub mod mode_controller;

pub use arena::{Arena, ArenaIndex};
pub use coco_table::CocoTable;
pub use mode_controller::ModeController;
