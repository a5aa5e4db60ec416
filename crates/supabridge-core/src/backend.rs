// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend SDK seam.
//
// The bridge adapters are written once against these traits. Each platform
// binding supplies an `SdkConnector` that builds a `BackendSdk` for a project;
// nothing above this seam knows how requests reach the backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use url::Url;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::query::TableQuery;
use crate::types::{
    AuthChangeEvent, AuthResult, JsonObject, OAuthProvider, OtpTarget, OtpType, Session, User,
};

/// Auth-state transitions as the backend SDK reports them.
///
/// This set is wider than what the bridge forwards; see
/// [`VendorAuthEvent::bridge_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorAuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    UserDeleted,
    PasswordRecovery,
    MfaChallengeVerified,
}

impl VendorAuthEvent {
    /// The bridge event this transition maps to, if it is forwarded at all.
    pub fn bridge_event(self) -> Option<AuthChangeEvent> {
        match self {
            Self::InitialSession => Some(AuthChangeEvent::InitialSession),
            Self::SignedIn => Some(AuthChangeEvent::SignedIn),
            Self::SignedOut => Some(AuthChangeEvent::SignedOut),
            Self::TokenRefreshed => Some(AuthChangeEvent::TokenRefreshed),
            Self::UserUpdated => Some(AuthChangeEvent::UserUpdated),
            Self::PasswordRecovery => Some(AuthChangeEvent::PasswordRecovery),
            Self::UserDeleted | Self::MfaChallengeVerified => None,
        }
    }
}

/// One item of the SDK's auth-state stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorAuthState {
    pub event: VendorAuthEvent,
    pub session: Option<Session>,
}

/// Receiving end of the SDK's auth-state stream, in production order.
pub type AuthStateStream = mpsc::UnboundedReceiver<VendorAuthState>;

/// Authentication half of the backend SDK.
#[async_trait]
pub trait AuthSdk: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthResult>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Option<JsonObject>,
    ) -> Result<AuthResult>;

    async fn sign_in_anonymously(&self) -> Result<AuthResult>;

    /// Build the provider's authorization URL. No network traffic.
    fn oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&Url>,
        scopes: Option<&str>,
    ) -> Result<Url>;

    /// Dispatch a one-time password to the target.
    async fn send_otp(&self, target: &OtpTarget) -> Result<()>;

    async fn verify_otp(
        &self,
        target: &OtpTarget,
        token: &str,
        kind: OtpType,
    ) -> Result<AuthResult>;

    async fn sign_out(&self) -> Result<()>;

    async fn current_session(&self) -> Result<Option<Session>>;

    async fn current_user(&self) -> Result<Option<User>>;

    async fn refresh_session(&self) -> Result<Session>;

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session>;

    /// Open a new subscription to auth-state transitions.
    fn auth_state_changes(&self) -> AuthStateStream;
}

/// Data half of the backend SDK.
#[async_trait]
pub trait PostgrestSdk: Send + Sync {
    /// Run one query and return the response body: an array of rows, or a
    /// single row object when the query is in single mode.
    async fn execute(&self, query: TableQuery) -> Result<Value>;
}

/// A fully configured client handle.
pub trait BackendSdk: AuthSdk + PostgrestSdk {}

impl<T: AuthSdk + PostgrestSdk> BackendSdk for T {}

/// Per-platform factory for client handles.
pub trait SdkConnector: Send + Sync {
    /// Short name of the binding, for logs.
    fn binding_name(&self) -> &str;

    fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn BackendSdk>>;
}
