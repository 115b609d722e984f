// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.
//!
//! The subcommands here stand in for the daemon's local transport (out of
//! scope for the core): `tune`/`retune`/`untune` drive one request at a time
//! against a freshly-wired engine for operator testing and scripting, and
//! `daemon` runs the persistent serializer loop.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "cocotuned")]
#[command(about = concat!("Cocotuned conflict-coordination daemon v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML), layered under the built-in defaults
    /// and any `COCOTUNED_*` environment overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the daemon loop: restore recovery state, start the serializer
    /// thread, block on SIGTERM/SIGINT for shutdown and SIGHUP for a mode
    /// transition.
    Daemon,

    /// Issue a single tune request against a freshly-loaded resource
    /// catalog and print the granted handle.
    Tune {
        /// Packed resource code (res_type | res_id | vendor bit)
        #[arg(long)]
        resource: u32,

        /// Value to request
        #[arg(long)]
        value: i32,

        /// Requesting priority class
        #[arg(long, value_parser = parse_priority, default_value = "third-party-low")]
        priority: String,

        /// Duration in milliseconds; omit for an infinite-duration request
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Scope key (core id, cluster id, or cgroup id depending on the
        /// resource's configured scope); ignored for GLOBAL-scoped resources
        #[arg(long, default_value = "0")]
        scope_key: u32,
    },

    /// Extend a live request's duration.
    Retune {
        /// Handle returned by a prior `tune`
        #[arg(long)]
        handle: u64,

        /// New duration in milliseconds; omit for infinite
        #[arg(long)]
        duration_ms: Option<u64>,
    },

    /// Remove a live request, releasing every resource it held.
    Untune {
        /// Handle returned by a prior `tune`
        #[arg(long)]
        handle: u64,
    },
}

/// Validates a priority-class argument against the four known classes.
fn parse_priority(s: &str) -> Result<String, String> {
    match s {
        "system-high" | "system-low" | "third-party-high" | "third-party-low" => Ok(s.to_string()),
        _ => Err(format!(
            "Invalid priority '{s}'. Valid options: system-high, system-low, third-party-high, third-party-low"
        )),
    }
}

/// Parse CLI arguments
///
/// # Panics
///
/// Clap will exit the process with appropriate error message if parsing fails
pub fn parse_cli() -> Cli {
    Cli::parse()
}
