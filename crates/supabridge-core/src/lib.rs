// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supabridge: Core types, errors and the backend seam shared across all crates.

pub mod backend;
pub mod config;
pub mod error;
pub mod operation;
pub mod query;
pub mod types;

pub use config::{BridgeSettings, ClientConfig};
pub use error::SupabridgeError;
pub use operation::{FailureConvention, Operation};
pub use types::*;
