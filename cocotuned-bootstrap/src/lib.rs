// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the domain and core layers and
//! provides the pieces a daemon entry point needs but that have no business
//! being domain logic:
//!
//! - **CLI parsing** - a `tune`/`retune`/`untune`/`daemon` subcommand surface
//! - **Platform abstraction** - OS-specific operations (POSIX vs Windows)
//! - **Signal handling** - SIGTERM/SIGINT for shutdown, SIGHUP for a mode
//!   transition
//! - **Exit codes** - BSD `sysexits.h`-style mapping from errors to process
//!   exit status
//! - **Shutdown coordination** - a cancellation token the composition-root
//!   binary drives the Request Queue's drain-and-exit from
//!
//! This crate deliberately stays in terms of primitives (`PathBuf`, `String`,
//! `u32`, `u64`, `i32`, `bool`) -- it does not depend on `cocotuned-domain` or
//! `cocotuned`. The composition-root binary (in the `cocotuned` crate, which
//! depends on both this crate and the domain crate) is the one place that
//! knows how to turn a `ValidatedCommand::Tune { priority: String, .. }` into
//! a `PriorityClass` and wire it into a running engine.
//!
//! ## Architecture Position
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          BOOTSTRAP (this crate)             │
//! │  - CLI parsing & validation                 │
//! │  - Platform abstraction                     │
//! │  - Signal handling                          │
//! │  - Exit codes                               │
//! │  - Shutdown coordination                    │
//! └─────────────────────────────────────────────┘
//!                      │ depended on by
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │    cocotuned (composition-root binary)      │
//! │  - Wires ResourceRegistry/CocoTable/         │
//! │    ModeController/TimerService/Serializer    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Domain-agnostic** -- no dependency cycle back to `cocotuned-domain`
//!    or `cocotuned`.
//! 2. **Platform abstraction** -- OS-specific functionality lives behind the
//!    `Platform` trait, selected at compile time.
//! 3. **Graceful shutdown** -- SIGTERM/SIGINT drive a `CancellationToken`
//!    with a grace period; SIGHUP is handled separately and never triggers
//!    shutdown.
//! 4. **Security first** -- CLI arguments and paths pass through
//!    `SecureArgParser` before anything else sees them.
//! 5. **Testability** -- every OS-facing trait has a no-op or capturing
//!    implementation for tests.
//!
//! ## Usage Example
//!
//! ```rust
//! use cocotuned_bootstrap::platform::create_platform;
//!
//! let platform = create_platform();
//! println!("Running on: {}", platform.platform_name());
//! ```
//!
//! ## Module Structure
//!
//! - `platform` - OS abstraction (Unix/Windows)
//! - `signals` - Signal handling (SIGTERM/SIGINT for shutdown, SIGHUP for mode)
//! - `cli` - Secure argument parsing
//! - `config` - Bootstrap-level application configuration
//! - `exit_code` - Unix exit code enumeration
//! - `logger` - Bootstrap-specific logging
//! - `shutdown` - Shutdown coordination

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Bootstrap and parse CLI arguments
///
/// This is the main entry point for the bootstrap layer. It handles:
/// 1. CLI parsing with clap
/// 2. Security validation
/// 3. Returns validated configuration
///
/// The caller is responsible for running the application logic and mapping
/// its result to an exit code using `result_to_exit_code`.
///
/// # Errors
///
/// Returns `cli::ParseError` if CLI parsing or validation fails.
/// Clap handles `--help` and `--version` automatically and exits the process.
///
/// # Example
///
/// ```no_run
/// use cocotuned_bootstrap::{bootstrap_cli, result_to_exit_code};
///
/// #[tokio::main]
/// async fn main() -> std::process::ExitCode {
///     let validated_cli = match bootstrap_cli() {
///         Ok(cli) => cli,
///         Err(e) => {
///             eprintln!("CLI Error: {}", e);
///             return std::process::ExitCode::from(65); // EX_DATAERR
///         }
///     };
///
///     let result = run_application(validated_cli).await;
///     result_to_exit_code(result)
/// }
///
/// async fn run_application(cli: cocotuned_bootstrap::ValidatedCli) -> Result<(), std::io::Error> {
///     let _ = cli;
///     Ok(())
/// }
/// ```
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
