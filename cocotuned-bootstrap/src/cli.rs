// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse()                 │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validator::validate()           │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedConfig                 │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer
//!
//! `ValidatedCommand` stays in terms of primitives (no dependency on the
//! domain crate): the composition-root binary is the one place that knows
//! how to turn a `priority: String` into a `PriorityClass`.

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration
///
/// This structure holds all CLI arguments after security validation.
/// All paths are canonicalized and all values are range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Validated command variants
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Daemon,
    Tune {
        resource: u32,
        value: i32,
        priority: String,
        duration_ms: Option<u64>,
        scope_key: u32,
    },
    Retune {
        handle: u64,
        duration_ms: Option<u64>,
    },
    Untune {
        handle: u64,
    },
}

/// Parse and validate CLI arguments
///
/// This function combines parsing and validation:
/// 1. Parse CLI with clap
/// 2. Validate all paths with SecureArgParser
/// 3. Validate all numeric values
/// 4. Return ValidatedCli on success
///
/// # Returns
///
/// `ValidatedCli` with all arguments security-checked
///
/// # Errors
///
/// Returns `ParseError` if any validation fails
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

/// Validate parsed CLI arguments
///
/// Applies security validation to all CLI arguments:
/// - Path canonicalization and security checks
/// - Numeric range validation
/// - String pattern validation
///
/// # Errors
///
/// Returns `ParseError` if any validation fails
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    // Validate global config path if provided
    let config = if let Some(ref path) = cli.config {
        // Config file should already exist - caller supplies a real path
        Some(SecureArgParser::validate_path(&path.to_string_lossy())?)
    } else {
        None
    };

    let command = match cli.command {
        Commands::Daemon => ValidatedCommand::Daemon,
        Commands::Tune {
            resource,
            value,
            priority,
            duration_ms,
            scope_key,
        } => {
            SecureArgParser::validate_argument(&priority)?;
            ValidatedCommand::Tune {
                resource,
                value,
                priority,
                duration_ms,
                scope_key,
            }
        }
        Commands::Retune { handle, duration_ms } => ValidatedCommand::Retune { handle, duration_ms },
        Commands::Untune { handle } => ValidatedCommand::Untune { handle },
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
    })
}
