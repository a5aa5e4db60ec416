// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native build of the plugin.
//
// One `NativePlugin` owns the client holder, the listener registry and the
// event relay. The adapters in `auth` and `data` do the call shaping; this
// type applies each operation's failure convention and the lifecycle rules.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use supabridge_core::backend::{BackendSdk, SdkConnector};
use supabridge_core::config::{BridgeSettings, ClientConfig};
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::operation::Operation;
use supabridge_sdk::HttpConnector;

use crate::holder::ClientHolder;
use crate::marshal::Args;
use crate::relay::{AuthStateListener, EventRelay, ListenerId, ListenerRegistry};
use crate::traits::{
    AUTH_STATE_CHANGE, BridgeObject, CallResult, ExternalBrowser, Rejection, SupabasePlugin,
};
use crate::{auth, data};

/// Version string native builds report.
pub const NATIVE_PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform name for the current native target.
pub fn native_platform_name() -> &'static str {
    if cfg!(target_os = "ios") {
        "iOS"
    } else if cfg!(target_os = "android") {
        "Android"
    } else {
        "Desktop"
    }
}

/// The plugin as it runs on a native target.
///
/// Generic over the SDK connector so the same call shaping runs against the
/// HTTP binding in production and an in-memory backend in tests.
pub struct NativePlugin<C: SdkConnector> {
    connector: C,
    settings: BridgeSettings,
    browser: Arc<dyn ExternalBrowser>,
    holder: ClientHolder,
    listeners: Arc<ListenerRegistry>,
    relay: EventRelay,
}

/// Native plugin backed by the HTTP binding.
pub type HttpPlugin = NativePlugin<HttpConnector>;

impl HttpPlugin {
    /// HTTP-backed plugin using the settings' request timeout.
    pub fn http(settings: BridgeSettings, browser: Arc<dyn ExternalBrowser>) -> Self {
        let connector = HttpConnector::new(settings.request_timeout());
        Self::new(connector, settings, browser)
    }
}

impl<C: SdkConnector> NativePlugin<C> {
    pub fn new(connector: C, settings: BridgeSettings, browser: Arc<dyn ExternalBrowser>) -> Self {
        let listeners = Arc::new(ListenerRegistry::default());
        Self {
            connector,
            settings,
            browser,
            holder: ClientHolder::default(),
            relay: EventRelay::new(Arc::clone(&listeners)),
            listeners,
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.holder.is_initialized()
    }

    /// Whether an auth-state subscription is currently forwarding.
    pub fn is_relaying(&self) -> bool {
        self.relay.is_subscribed()
    }

    /// Cancel the relay and drop the client.
    ///
    /// No notification is delivered once this returns. Listeners stay
    /// registered and resume receiving after the next `initialize`.
    pub fn teardown(&self) {
        let relayed = self.relay.cancel();
        let had_client = self.holder.clear();
        if relayed || had_client {
            info!("plugin torn down");
        }
    }

    fn connect(&self, args: &Args) -> Result<Arc<dyn BackendSdk>> {
        let config = ClientConfig::new(
            args.optional_str("supabaseUrl")?.unwrap_or_default(),
            args.optional_str("supabaseKey")?.unwrap_or_default(),
        )?;
        self.connector.connect(&config)
    }

    fn client(&self, op: Operation) -> std::result::Result<Arc<dyn BackendSdk>, Rejection> {
        self.holder.current().map_err(|e| {
            debug!(method = op.method_name(), "call before initialize");
            Rejection::for_operation(op, &e)
        })
    }
}

fn rejected(op: Operation, err: SupabridgeError) -> Rejection {
    warn!(method = op.method_name(), error = %err, "bridge call rejected");
    Rejection::for_operation(op, &err)
}

impl<C: SdkConnector> Drop for NativePlugin<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[async_trait]
impl<C: SdkConnector + 'static> SupabasePlugin for NativePlugin<C> {
    fn platform_name(&self) -> &str {
        native_platform_name()
    }

    async fn initialize(&self, options: BridgeObject) -> CallResult {
        let op = Operation::Initialize;
        let client = self
            .connect(&Args::new(options))
            .map_err(|e| rejected(op, e))?;

        self.relay.cancel();
        let stream = client.auth_state_changes();
        if self.holder.install(client).is_some() {
            info!("replacing existing backend client");
        }
        self.relay.subscribe(stream);
        info!(binding = self.connector.binding_name(), "backend client initialised");
        Ok(BridgeObject::new())
    }

    async fn sign_in_with_password(&self, options: BridgeObject) -> CallResult {
        let op = Operation::SignInWithPassword;
        let sdk = self.client(op)?;
        auth::sign_in_with_password(sdk.as_ref(), &Args::new(options))
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn sign_up(&self, options: BridgeObject) -> CallResult {
        let op = Operation::SignUp;
        let sdk = self.client(op)?;
        auth::sign_up(sdk.as_ref(), &Args::new(options))
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn sign_in_anonymously(&self) -> CallResult {
        let op = Operation::SignInAnonymously;
        let sdk = self.client(op)?;
        auth::sign_in_anonymously(sdk.as_ref())
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn sign_in_with_oauth(&self, options: BridgeObject) -> CallResult {
        let op = Operation::SignInWithOAuth;
        let sdk = self.client(op)?;
        auth::sign_in_with_oauth(sdk.as_ref(), self.browser.as_ref(), &Args::new(options))
            .map_err(|e| rejected(op, e))
    }

    async fn sign_in_with_otp(&self, options: BridgeObject) -> CallResult {
        let op = Operation::SignInWithOtp;
        let sdk = self.client(op)?;
        auth::sign_in_with_otp(sdk.as_ref(), &Args::new(options))
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn verify_otp(&self, options: BridgeObject) -> CallResult {
        let op = Operation::VerifyOtp;
        let sdk = self.client(op)?;
        auth::verify_otp(sdk.as_ref(), &Args::new(options))
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn sign_out(&self) -> CallResult {
        let op = Operation::SignOut;
        let sdk = self.client(op)?;
        auth::sign_out(sdk.as_ref())
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn get_session(&self) -> CallResult {
        let sdk = self.client(Operation::GetSession)?;
        Ok(auth::get_session(sdk.as_ref()).await)
    }

    async fn refresh_session(&self) -> CallResult {
        let op = Operation::RefreshSession;
        let sdk = self.client(op)?;
        auth::refresh_session(sdk.as_ref())
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn get_user(&self) -> CallResult {
        let sdk = self.client(Operation::GetUser)?;
        Ok(auth::get_user(sdk.as_ref()).await)
    }

    async fn set_session(&self, options: BridgeObject) -> CallResult {
        let op = Operation::SetSession;
        let sdk = self.client(op)?;
        auth::set_session(sdk.as_ref(), &Args::new(options))
            .await
            .map_err(|e| rejected(op, e))
    }

    async fn select(&self, options: BridgeObject) -> CallResult {
        let op = Operation::Select;
        let sdk = self.client(op)?;
        let built = data::select_query(&self.settings, &Args::new(options));
        Ok(data::run(sdk.as_ref(), op, built).await)
    }

    async fn insert(&self, options: BridgeObject) -> CallResult {
        let op = Operation::Insert;
        let sdk = self.client(op)?;
        let built = data::insert_query(&Args::new(options));
        Ok(data::run(sdk.as_ref(), op, built).await)
    }

    async fn update(&self, options: BridgeObject) -> CallResult {
        let op = Operation::Update;
        let sdk = self.client(op)?;
        let built = data::update_query(&Args::new(options));
        Ok(data::run(sdk.as_ref(), op, built).await)
    }

    async fn delete(&self, options: BridgeObject) -> CallResult {
        let op = Operation::Delete;
        let sdk = self.client(op)?;
        let built = data::delete_query(&Args::new(options));
        Ok(data::run(sdk.as_ref(), op, built).await)
    }

    async fn get_plugin_version(&self) -> CallResult {
        let mut obj = BridgeObject::new();
        obj.insert("version".into(), Value::from(NATIVE_PLUGIN_VERSION));
        Ok(obj)
    }

    fn add_listener(&self, event_name: &str) -> std::result::Result<AuthStateListener, Rejection> {
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
