// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cocotuned daemon entry point
//!
//! The composition root: wires the bootstrap layer's CLI parsing, signal
//! handling, and shutdown coordination to the core engine's registry, table,
//! mode controller, timer service, recovery store, and serializer.
//!
//! Each `tune`/`retune`/`untune` invocation wires a fresh, empty engine,
//! restores whatever the recovery log remembers, performs the one requested
//! operation directly against the serializer, and exits -- these subcommands
//! stand in for a real client transport (out of scope for the core), so
//! handles do not persist across separate invocations the way they would
//! across calls from a single connected client. `daemon` is the persistent
//! mode: it starts the serializer thread draining the request queue, forwards
//! expired timers into it, and blocks on SIGTERM/SIGINT for shutdown and
//! SIGHUP for a mode transition, exactly as a real client's tune requests
//! would be fed in over the (out-of-scope) local transport.

use cocotuned::{InMemoryApplier, RecoveryStore, RequestQueue, ResourceRegistry, Serializer, Settings, SysfsApplier, TimerService};
use cocotuned::infrastructure::logging;
use cocotuned::serializer::Op;
use cocotuned_bootstrap::config::LogLevel;
use cocotuned_bootstrap::shutdown::ShutdownCoordinator;
use cocotuned_bootstrap::signals::create_signal_handler;
use cocotuned_bootstrap::{bootstrap_cli, result_to_exit_code, ValidatedCommand};
use cocotuned_domain::{
    ArbitrationPolicy, DefaultApplier, HandleGenerator, Mode, ModeMask, PriorityClass, Request, RequestDuration,
    ResourceCode, ResourceConfigBuilder, ResourceValue, Scope, ScopeKey, TunerError, UntuneDirection,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

fn priority_from_str(s: &str) -> PriorityClass {
    match s {
        "system-high" => PriorityClass::SystemHigh,
        "system-low" => PriorityClass::SystemLow,
        "third-party-high" => PriorityClass::ThirdPartyHigh,
        _ => PriorityClass::ThirdPartyLow,
    }
}

/// Registers `code_raw` with a permissive, unthresholded default config if
/// it isn't already known, so a standalone `tune` invocation has something
/// to arbitrate over. Real clients would rely on a pre-populated registry;
/// this is the CLI demo's stand-in for that out-of-scope catalog build step.
fn ensure_registered(registry: &mut ResourceRegistry, recovery: &mut RecoveryStore, code_raw: u32) -> Result<ResourceCode, TunerError> {
    let code = ResourceCode::from_raw(code_raw);
    if registry.lookup(code).is_some() {
        return Ok(code);
    }

    let path = format!("{}/cocotuned-resource-{code_raw:#010x}", std::env::temp_dir().display());
    let config = ResourceConfigBuilder::new()
        .res_id(code.res_id())
        .res_type(code.res_type())
        .vendor(code.is_vendor())
        .name(format!("resource-{code_raw:#010x}"))
        .path(path)
        .policy(ArbitrationPolicy::HigherBetter)
        .scope(Scope::Global)
        .low_threshold(i32::MIN)
        .high_threshold(i32::MAX)
        .default_value("0")
        .build()?;

    registry.register(config, |path, default| {
        if let Err(e) = recovery.record(path, default) {
            warn!(error = %e, "failed to append recovery record");
        }
    })?;

    Ok(code)
}

fn run_single_shot(settings: &Settings, build_op: impl FnOnce(&mut ResourceRegistry, &mut RecoveryStore) -> Result<Op, TunerError>) -> Result<(), TunerError> {
    let mut registry = ResourceRegistry::new();
    let mut recovery = RecoveryStore::open(&settings.recovery_log_path)?;
    let op = build_op(&mut registry, &mut recovery)?;

    let default_applier: Arc<dyn DefaultApplier> = Arc::new(SysfsApplier);
    let timers = TimerService::start(settings.timer_worker_threads, settings.timer_max_scaling_threads, settings.max_concurrent_requests)?;
    let mut serializer = Serializer::new(
        registry,
        timers,
        recovery,
        default_applier,
        Mode::DisplayOn,
        settings.max_concurrent_requests,
        settings.max_resources_per_request,
    );
    serializer.restore_from_recovery()?;
    serializer.handle(op);
    Ok(())
}

fn run_tune(settings: &Settings, resource: u32, value: i32, priority: String, duration_ms: Option<u64>, scope_key: u32) -> Result<(), TunerError> {
    let mut handles = HandleGenerator::new();
    run_single_shot(settings, |registry, recovery| {
        let code = ensure_registered(registry, recovery, resource)?;
        let duration = match duration_ms {
            Some(ms) => RequestDuration::Finite(ms),
            None => RequestDuration::Infinite,
        };
        let handle = handles.next_request_handle();
        let resource_value = cocotuned_domain::Resource::new(code, ScopeKey(scope_key), ResourceValue::Single(value));
        let request = Request::new(
            handle,
            std::process::id() as i32,
            0,
            priority_from_str(&priority),
            duration,
            ModeMask::single(Mode::DisplayOn),
            UntuneDirection::Forward,
            vec![resource_value],
        );
        info!(%handle, "submitting tune request");
        Ok(Op::Tune(request))
    })
}

fn run_retune(settings: &Settings, handle: u64, duration_ms: Option<u64>) -> Result<(), TunerError> {
    run_single_shot(settings, |_registry, _recovery| {
        let duration = match duration_ms {
            Some(ms) => RequestDuration::Finite(ms),
            None => RequestDuration::Infinite,
        };
        Ok(Op::Update { handle: cocotuned_domain::RequestHandle::new(handle as i64), new_duration: duration })
    })
}

fn run_untune(settings: &Settings, handle: u64) -> Result<(), TunerError> {
    run_single_shot(settings, |_registry, _recovery| {
        Ok(Op::Untune { handle: cocotuned_domain::RequestHandle::new(handle as i64) })
    })
}

async fn run_daemon(settings: &Settings) -> Result<(), TunerError> {
    let registry = ResourceRegistry::new();
    let recovery = RecoveryStore::open(&settings.recovery_log_path)?;
    let default_applier: Arc<dyn DefaultApplier> = Arc::new(InMemoryApplier::new());
    let timers = TimerService::start(settings.timer_worker_threads, settings.timer_max_scaling_threads, settings.max_concurrent_requests)?;
    let expired = timers.expired().clone();
    let mut serializer = Serializer::new(
        registry,
        timers,
        recovery,
        default_applier,
        Mode::DisplayOn,
        settings.max_concurrent_requests,
        settings.max_resources_per_request,
    );
    serializer.restore_from_recovery()?;

    let queue: RequestQueue<Op> = RequestQueue::new();
    let queue_for_serializer = queue.clone();
    let serializer_thread = std::thread::Builder::new()
        .name("cocotuned-serializer".into())
        .spawn(move || serializer.run(&queue_for_serializer))
        .map_err(|e| TunerError::fatal(format!("failed to spawn serializer thread: {e}")))?;

    let queue_for_timers = queue.clone();
    let timer_forwarder = std::thread::Builder::new()
        .name("cocotuned-timer-forwarder".into())
        .spawn(move || {
            while let Ok((_timer_id, handle)) = expired.recv() {
                queue_for_timers.push(PriorityClass::SystemHigh, Op::TimerExpired { handle });
            }
        })
        .map_err(|e| TunerError::fatal(format!("failed to spawn timer forwarder thread: {e}")))?;

    let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
    let signals = create_signal_handler();

    info!("daemon started, waiting for shutdown (SIGTERM/SIGINT) or mode signal (SIGHUP)");

    let mut current_display = true;
    loop {
        tokio::select! {
            _ = signals.wait_for_shutdown(Box::new({
                let coordinator = coordinator.clone();
                move || coordinator.initiate_shutdown()
            })) => {
                break;
            }
            _ = signals.wait_for_mode_signal() => {
                current_display = !current_display;
                let mode = if current_display { Mode::DisplayOn } else { Mode::DisplayOff };
                info!(?mode, "mode signal received, forwarding to mode controller");
                queue.push(PriorityClass::SystemHigh, Op::ModeChanged(mode));
            }
        }
    }

    queue.close();
    if serializer_thread.join().is_err() {
        warn!("serializer thread panicked during shutdown");
    }
    // Dropping the serializer (above) drops its `TimerService`, closing the
    // expiry channel and letting the forwarder's `recv()` loop end on its own.
    if timer_forwarder.join().is_err() {
        warn!("timer forwarder thread panicked during shutdown");
    }
    coordinator.complete_shutdown();
    info!("daemon shut down cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated_cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("CLI error: {e}");
            return std::process::ExitCode::from(64); // EX_USAGE
        }
    };

    let settings = match Settings::load(validated_cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("failed to load settings: {e}");
            return std::process::ExitCode::from(78); // EX_CONFIG
        }
    };

    let log_level = if validated_cli.verbose { LogLevel::Debug } else { LogLevel::Info };
    logging::init(log_level.to_tracing_level().as_str());

    let result = match validated_cli.command {
        ValidatedCommand::Daemon => run_daemon(&settings).await,
        ValidatedCommand::Tune { resource, value, priority, duration_ms, scope_key } => {
            run_tune(&settings, resource, value, priority, duration_ms, scope_key)
        }
        ValidatedCommand::Retune { handle, duration_ms } => run_retune(&settings, handle, duration_ms),
        ValidatedCommand::Untune { handle } => run_untune(&settings, handle),
    };

    result_to_exit_code(result)
}
