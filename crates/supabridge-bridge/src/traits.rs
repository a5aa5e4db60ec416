// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic bridge contract.
//
// The shell sees one surface regardless of platform: seventeen calls that
// take a generic key/value object and resolve with another (or reject with a
// message), plus the `authStateChange` notification channel.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::operation::Operation;

use crate::relay::{AuthStateListener, ListenerId};

/// Generic key/value object exchanged with the shell.
pub type BridgeObject = Map<String, Value>;

/// Name of the auth-state notification channel.
pub const AUTH_STATE_CHANGE: &str = "authStateChange";

/// A failed bridge call, carrying the message the shell receives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Rejection(pub String);

impl Rejection {
    /// Rejection for `op`, with the operation's prefix applied.
    pub fn for_operation(op: Operation, err: &SupabridgeError) -> Self {
        Self(op.rejection_message(err))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Outcome of one bridge call.
pub type CallResult = std::result::Result<BridgeObject, Rejection>;

/// The bridge surface, implemented once per platform binding.
///
/// Option-taking calls receive the shell's object as-is; each implementation
/// validates it before touching the backend.
#[async_trait]
pub trait SupabasePlugin: Send + Sync {
    /// Human-readable platform name (e.g. "Android", "Web").
    fn platform_name(&self) -> &str;

    /// Create the backend client from `supabaseUrl` / `supabaseKey`.
    async fn initialize(&self, options: BridgeObject) -> CallResult;

    async fn sign_in_with_password(&self, options: BridgeObject) -> CallResult;
    async fn sign_up(&self, options: BridgeObject) -> CallResult;
    async fn sign_in_anonymously(&self) -> CallResult;
    async fn sign_in_with_oauth(&self, options: BridgeObject) -> CallResult;
    async fn sign_in_with_otp(&self, options: BridgeObject) -> CallResult;
    async fn verify_otp(&self, options: BridgeObject) -> CallResult;
    async fn sign_out(&self) -> CallResult;

    /// Never rejects once initialised; resolves `{session: null}` on failure.
    async fn get_session(&self) -> CallResult;
    async fn refresh_session(&self) -> CallResult;
    /// Never rejects once initialised; resolves `{user: null}` on failure.
    async fn get_user(&self) -> CallResult;
    async fn set_session(&self, options: BridgeObject) -> CallResult;

    // Data calls embed failures as `{data: null, error}` instead of rejecting.
    async fn select(&self, options: BridgeObject) -> CallResult;
    async fn insert(&self, options: BridgeObject) -> CallResult;
    async fn update(&self, options: BridgeObject) -> CallResult;
    async fn delete(&self, options: BridgeObject) -> CallResult;

    async fn get_plugin_version(&self) -> CallResult;

    /// Register a listener on a notification channel.
    ///
    /// Only [`AUTH_STATE_CHANGE`] exists; other names are rejected.
    fn add_listener(&self, event_name: &str) -> std::result::Result<AuthStateListener, Rejection>;

    /// Detach one listener. Returns false if it was already gone.
    fn remove_listener(&self, id: ListenerId) -> bool;

    fn remove_all_listeners(&self);
}

/// Opens URLs outside the app (system browser, custom tabs).
///
/// `open_url` runs on whichever thread polls the bridge future, usually a
/// runtime worker rather than the UI thread. Implementations that touch UI
/// APIs must hand the work to the UI thread themselves and not fail because
/// of the calling thread.
pub trait ExternalBrowser: Send + Sync {
    fn open_url(&self, url: &Url) -> Result<()>;
}
