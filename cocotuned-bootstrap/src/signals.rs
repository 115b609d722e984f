// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # System Signal Handling
//!
//! Cross-platform shutdown and mode-transition signal handling.
//!
//! Unlike a signal handler that treats every incoming signal as a shutdown
//! request, this one distinguishes two roles:
//!
//! - `wait_for_shutdown` resolves on SIGTERM or SIGINT (Ctrl+C) and drives
//!   the `ShutdownCoordinator`.
//! - `wait_for_mode_signal` resolves on SIGHUP, standing in for the
//!   out-of-scope D-Bus `PrepareForSleep` trigger; the binary calls it in a
//!   loop and forwards each firing to the Mode Controller.
//!
//! Windows has no SIGHUP equivalent, so `WindowsSignalHandler::wait_for_mode_signal`
//! never resolves -- mode transitions on that platform would need a
//! different trigger, out of scope here.

use std::future::Future;
use std::pin::Pin;

/// Callback invoked when a shutdown signal is received
pub type ShutdownCallback = Box<dyn Fn() + Send + Sync>;

/// Platform-independent system signal handling
pub trait SystemSignals: Send + Sync {
    /// Wait for a shutdown signal (SIGTERM or SIGINT), invoking `on_shutdown`
    /// once it fires.
    fn wait_for_shutdown(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Wait for a single mode-transition signal (SIGHUP on Unix). Resolves
    /// once per signal; callers loop to keep listening.
    fn wait_for_mode_signal(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

#[cfg(unix)]
pub struct UnixSignalHandler;

#[cfg(unix)]
impl SystemSignals for UnixSignalHandler {
    fn wait_for_shutdown(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
            let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT");
                }
            }

            on_shutdown();
        })
    }

    fn wait_for_mode_signal(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sighup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");
            sighup.recv().await;
            tracing::info!("received SIGHUP");
        })
    }
}

#[cfg(windows)]
pub struct WindowsSignalHandler;

#[cfg(windows)]
impl SystemSignals for WindowsSignalHandler {
    fn wait_for_shutdown(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            tokio::signal::ctrl_c().await.expect("failed to register Ctrl+C handler");
            tracing::info!("received Ctrl+C");
            on_shutdown();
        })
    }

    fn wait_for_mode_signal(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(std::future::pending())
    }
}

/// No-op signal handler for testing -- never resolves either future.
pub struct NoOpSignalHandler;

impl SystemSignals for NoOpSignalHandler {
    fn wait_for_shutdown(&self, _on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(std::future::pending())
    }

    fn wait_for_mode_signal(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(std::future::pending())
    }
}

/// Create the platform-appropriate signal handler
pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    #[cfg(unix)]
    {
        Box::new(UnixSignalHandler)
    }
    #[cfg(windows)]
    {
        Box::new(WindowsSignalHandler)
    }
    #[cfg(not(any(unix, windows)))]
    {
        Box::new(NoOpSignalHandler)
    }
}
