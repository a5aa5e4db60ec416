// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supabridge: HTTP backend binding.
//
// Implements the `BackendSdk` seam against a Supabase project:
//   - GoTrue auth API     (`/auth/v1/...`)
//   - PostgREST data API  (`/rest/v1/<table>`)
//
// The session lives in memory for the lifetime of the client handle.
// Token refresh is explicit (`refresh_session`); nothing runs in the
// background.

pub mod auth;
pub mod client;
pub mod events;
pub mod postgrest;
pub mod wire;

pub use client::{HttpConnector, HttpSdk};
pub use postgrest::query_params;
