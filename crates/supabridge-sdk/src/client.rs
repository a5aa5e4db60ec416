// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP client handle and connector.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use supabridge_core::backend::{BackendSdk, SdkConnector, VendorAuthEvent};
use supabridge_core::config::ClientConfig;
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::types::{AuthResult, Session};

use crate::events::AuthEventHub;

/// Builds [`HttpSdk`] handles for the native platforms.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl SdkConnector for HttpConnector {
    fn binding_name(&self) -> &str {
        "http"
    }

    fn connect(&self, config: &ClientConfig) -> Result<Arc<dyn BackendSdk>> {
        Ok(Arc::new(HttpSdk::new(config.clone(), self.timeout)?))
    }
}

/// One configured connection to a backend project.
///
/// Auth and data requests share the stored session: once signed in, table
/// queries run with the user's access token instead of the public key.
pub struct HttpSdk {
    config: ClientConfig,
    http: Client,
    session: RwLock<Option<Session>>,
    pub(crate) events: AuthEventHub,
}

impl HttpSdk {
    pub fn new(config: ClientConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SupabridgeError::Transport(format!("failed to build HTTP client: {e}")))?;

        debug!(url = %config.supabase_url(), "HTTP backend client created");
        Ok(Self {
            config,
            http,
            session: RwLock::new(None),
            events: AuthEventHub::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Snapshot of the stored session.
    pub fn stored_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn store_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Store a fresh session, announce it, and shape it as an auth result.
    pub(crate) fn adopt_session(&self, session: Session, event: VendorAuthEvent) -> AuthResult {
        self.store_session(Some(session.clone()));
        self.events.emit(event, Some(session.clone()));
        AuthResult::from_session(session)
    }

    /// Request authorised with the public key only.
    pub(crate) fn keyed_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.config.supabase_key())
            .bearer_auth(self.config.supabase_key())
    }

    /// Request authorised with the given user token.
    pub(crate) fn token_request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.config.supabase_key())
            .bearer_auth(token)
    }

    /// Request authorised with the stored session, falling back to the key.
    pub(crate) fn session_request(&self, method: Method, url: Url) -> RequestBuilder {
        match self.stored_session() {
            Some(session) => self.token_request(method, url, &session.access_token),
            None => self.keyed_request(method, url),
        }
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> SupabridgeError {
    if err.is_timeout() {
        SupabridgeError::Transport(format!("request timed out: {err}"))
    } else {
        SupabridgeError::Transport(err.to_string())
    }
}

/// Read a response body, returning the status alongside the raw text.
pub(crate) async fn read_body(response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    Ok((status, text))
}

/// Parse a JSON body, treating an empty body as `null`.
pub(crate) fn parse_json(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// Best human-readable message from a GoTrue error body.
pub fn auth_error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if let Some(obj) = parsed.as_ref().and_then(Value::as_object) {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(text) = obj.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.to_owned();
                }
            }
        }
    }
    status_message(status)
}

/// Best human-readable message from a PostgREST error body.
pub fn postgrest_error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let Some(obj) = parsed.as_ref().and_then(Value::as_object) else {
        return status_message(status);
    };
    let Some(message) = obj.get("message").and_then(Value::as_str) else {
        return status_message(status);
    };

    let mut out = message.to_owned();
    for key in ["details", "hint"] {
        if let Some(extra) = obj.get(key).and_then(Value::as_str) {
            if !extra.trim().is_empty() {
                out.push_str(&format!(" ({extra})"));
            }
        }
    }
    out
}

fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {reason}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}
