// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Entities
//!
//! The mutable, identity-bearing objects the arbitration engine operates on:
//! the resource catalog entry, a client's tune request, and the resource
//! write that request carries.

pub mod request;
pub mod resource;
pub mod resource_config;

pub use request::Request;
pub use resource::Resource;
pub use resource_config::{ApplierBinding, ResourceConfig, ResourceConfigBuilder};
