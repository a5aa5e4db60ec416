// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web build of the plugin.
//
// Browsers use the vendor's JavaScript SDK directly, so every call fails
// immediately with `WebUnavailable`. Only the version call succeeds.
// Listeners can still be registered; nothing is ever delivered to them.

use async_trait::async_trait;
use serde_json::Value;

use supabridge_core::error::SupabridgeError;
use supabridge_core::operation::Operation;

use crate::relay::{AuthStateListener, ListenerId, ListenerRegistry};
use crate::traits::{AUTH_STATE_CHANGE, BridgeObject, CallResult, Rejection, SupabasePlugin};

/// Version string the web build reports.
pub const WEB_PLUGIN_VERSION: &str = "web";

/// Every call rejects; see the module docs.
#[derive(Default)]
pub struct WebPlugin {
    listeners: ListenerRegistry,
}

impl WebPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unavailable(op: Operation) -> CallResult {
    tracing::warn!(method = op.method_name(), "called on web build");
    Err(Rejection::for_operation(op, &SupabridgeError::WebUnavailable))
}

#[async_trait]
impl SupabasePlugin for WebPlugin {
    fn platform_name(&self) -> &str {
        "Web"
    }

    async fn initialize(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::Initialize)
    }

    async fn sign_in_with_password(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::SignInWithPassword)
    }

    async fn sign_up(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::SignUp)
    }

    async fn sign_in_anonymously(&self) -> CallResult {
        unavailable(Operation::SignInAnonymously)
    }

    async fn sign_in_with_oauth(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::SignInWithOAuth)
    }

    async fn sign_in_with_otp(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::SignInWithOtp)
    }

    async fn verify_otp(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::VerifyOtp)
    }

    async fn sign_out(&self) -> CallResult {
        unavailable(Operation::SignOut)
    }

    async fn get_session(&self) -> CallResult {
        unavailable(Operation::GetSession)
    }

    async fn refresh_session(&self) -> CallResult {
        unavailable(Operation::RefreshSession)
    }

    async fn get_user(&self) -> CallResult {
        unavailable(Operation::GetUser)
    }

    async fn set_session(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::SetSession)
    }

    async fn select(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::Select)
    }

    async fn insert(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::Insert)
    }

    async fn update(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::Update)
    }

    async fn delete(&self, _options: BridgeObject) -> CallResult {
        unavailable(Operation::Delete)
    }

    async fn get_plugin_version(&self) -> CallResult {
        let mut obj = BridgeObject::new();
        obj.insert("version".into(), Value::from(WEB_PLUGIN_VERSION));
        Ok(obj)
    }

    fn add_listener(&self, event_name: &str) -> Result<AuthStateListener, Rejection> {
        if event_name != AUTH_STATE_CHANGE {
            return Err(Rejection(format!("unknown event \"{event_name}\"")));
        }
        Ok(self.listeners.add())
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn remove_all_listeners(&self) {
        self.listeners.clear();
    }
}
