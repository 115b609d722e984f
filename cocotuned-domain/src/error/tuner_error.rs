// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! Error taxonomy for the arbitration engine. The variants below are the concrete
//! expression of five abstract kinds: capacity exhaustion, invalid arguments,
//! transient device-write failures, policy violations, and fatal startup errors.
//!
//! Errors inside the arbitration thread are always contained: nothing here is
//! meant to unwind the serializer. Call sites classify an error with
//! [`TunerError::is_recoverable`] or [`TunerError::category`] and either log and
//! continue, or (for [`TunerError::Fatal`] only) abort startup.

use thiserror::Error;

/// Domain-specific errors for the arbitration engine.
#[derive(Error, Debug, Clone)]
pub enum TunerError {
    /// A memory arena or the request queue has no free capacity.
    #[error("capacity exhausted: {0}")]
    CapacityExhausted(String),

    /// A malformed request, out-of-range value, or unknown resource code.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A default-applier write to a tunable failed.
    #[error("transient device error: {0}")]
    TransientDeviceError(String),

    /// UPDATE with a shorter duration, REMOVE of an unknown handle, and similar
    /// contract violations that leave arbitration state unchanged.
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// The registry was not initialized before arbitration start, or another
    /// condition that cannot happen at runtime and must abort startup.
    #[error("fatal: {0}")]
    Fatal(String),

    /// Settings or recovery-file I/O failure at the infrastructure boundary.
    #[error("io error: {0}")]
    Io(String),

    /// Settings (de)serialization failure at the infrastructure boundary.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TunerError {
    pub fn capacity_exhausted(msg: impl Into<String>) -> Self {
        Self::CapacityExhausted(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn transient_device_error(msg: impl Into<String>) -> Self {
        Self::TransientDeviceError(msg.into())
    }

    pub fn policy_violation(msg: impl Into<String>) -> Self {
        Self::PolicyViolation(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// Transient conditions worth retrying: capacity pressure and device I/O.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TunerError::CapacityExhausted(_) | TunerError::TransientDeviceError(_) | TunerError::Io(_)
        )
    }

    /// Whether this error must abort daemon startup rather than be logged and absorbed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TunerError::Fatal(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            TunerError::CapacityExhausted(_) => "capacity",
            TunerError::InvalidArgument(_) => "argument",
            TunerError::TransientDeviceError(_) => "device",
            TunerError::PolicyViolation(_) => "policy",
            TunerError::Fatal(_) => "fatal",
            TunerError::Io(_) => "io",
            TunerError::Serialization(_) => "serialization",
        }
    }
}

impl From<std::io::Error> for TunerError {
    fn from(err: std::io::Error) -> Self {
        TunerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TunerError {
    fn from(err: serde_json::Error) -> Self {
        TunerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_kinds() {
        assert!(TunerError::capacity_exhausted("arena full").is_recoverable());
        assert!(TunerError::transient_device_error("write failed").is_recoverable());
        assert!(!TunerError::invalid_argument("bad code").is_recoverable());
        assert!(!TunerError::fatal("registry uninitialized").is_recoverable());
    }

    #[test]
    fn fatal_classification() {
        assert!(TunerError::fatal("x").is_fatal());
        assert!(!TunerError::policy_violation("x").is_fatal());
    }

    #[test]
    fn category_names() {
        assert_eq!(TunerError::capacity_exhausted("x").category(), "capacity");
        assert_eq!(TunerError::invalid_argument("x").category(), "argument");
        assert_eq!(TunerError::transient_device_error("x").category(), "device");
        assert_eq!(TunerError::policy_violation("x").category(), "policy");
        assert_eq!(TunerError::fatal("x").category(), "fatal");
    }

    #[test]
    fn io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TunerError = io_err.into();
        assert_eq!(err.category(), "io");
    }
}
