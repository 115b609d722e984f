// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error Module
//!
//! Re-exports [`TunerError`], the single error type used throughout the
//! arbitration domain and application layers.

mod tuner_error;

pub use tuner_error::TunerError;
