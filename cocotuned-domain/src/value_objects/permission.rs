// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Permission class of a resource registration: who is allowed to request it.
//! Audit/validation concern only; arbitration itself keys off `PriorityClass`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    System,
    ThirdParty,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Permission::System => "system",
            Permission::ThirdParty => "third_party",
        };
        f.write_str(s)
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Permission::System),
            "third_party" => Ok(Permission::ThirdParty),
            other => Err(format!("unknown permission class: {other}")),
        }
    }
}
