// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Bootstrap-level configuration holding the CLI-derived values a
//! composition-root binary needs before it can build a `cocotuned::infrastructure::Settings`
//! or initialize logging -- app name, log level, requested paths, and
//! verbosity/dry-run flags. This struct stays in terms of primitives so this
//! crate never depends on `cocotuned-domain` or `cocotuned`.
//!
//! ## Usage
//!
//! ```rust
//! use cocotuned_bootstrap::config::{AppConfig, LogLevel};
//!
//! let config = AppConfig::builder()
//!     .app_name("cocotuned")
//!     .log_level(LogLevel::Info)
//!     .verbose(true)
//!     .build();
//!
//! assert_eq!(config.app_name(), "cocotuned");
//! ```

use std::path::PathBuf;

/// Logging verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a `tracing::Level`
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Application-level configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,
    config_path: Option<PathBuf>,
    worker_threads: Option<usize>,
    verbose: bool,
    dry_run: bool,
}

impl AppConfig {
    /// Start building an `AppConfig`
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for `AppConfig`
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: LogLevel,
    config_path: Option<PathBuf>,
    worker_threads: Option<usize>,
    verbose: bool,
    dry_run: bool,
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the `AppConfig`.
    ///
    /// # Panics
    ///
    /// Panics if `app_name` was never set.
    pub fn build(self) -> AppConfig {
        self.try_build().expect("app_name is required")
    }

    /// Build the `AppConfig`, returning an error instead of panicking.
    pub fn try_build(self) -> Result<AppConfig, &'static str> {
        Ok(AppConfig {
            app_name: self.app_name.ok_or("app_name is required")?,
            log_level: self.log_level,
            config_path: self.config_path,
            worker_threads: self.worker_threads,
            verbose: self.verbose,
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_required_fields() {
        let config = AppConfig::builder().app_name("cocotuned").build();
        assert_eq!(config.app_name(), "cocotuned");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert!(!config.verbose());
    }

    #[test]
    fn try_build_fails_without_app_name() {
        let result = AppConfig::builder().verbose(true).try_build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_chains_all_fields() {
        let config = AppConfig::builder()
            .app_name("cocotuned")
            .log_level(LogLevel::Debug)
            .config_path("/tmp/cocotuned.toml")
            .worker_threads(4)
            .verbose(true)
            .dry_run(true)
            .build();

        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.worker_threads(), Some(4));
        assert!(config.dry_run());
    }

    #[test]
    fn log_level_maps_to_tracing_level() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
