// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// GoTrue wire models and their conversion into core types.
//
// GoTrue speaks snake_case and is loose about optional fields (phone users
// get `"email": ""`, older servers omit `expires_at`). Everything is
// normalised here so the bridge only ever sees the core shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::types::{AuthResult, JsonObject, Session, User};

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    last_sign_in_at: Option<String>,
    #[serde(default)]
    user_metadata: Option<JsonObject>,
    #[serde(default)]
    app_metadata: Option<JsonObject>,
}

#[derive(Debug, Deserialize)]
struct WireSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<WireUser>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<WireUser> for User {
    fn from(wire: WireUser) -> Self {
        Self {
            id: wire.id,
            email: non_empty(wire.email),
            phone: non_empty(wire.phone),
            created_at: non_empty(wire.created_at),
            last_sign_in_at: non_empty(wire.last_sign_in_at),
            user_metadata: wire.user_metadata,
            app_metadata: wire.app_metadata,
        }
    }
}

impl WireSession {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_in = self.expires_in.unwrap_or(3600);
        let expires_at = self
            .expires_at
            .or_else(|| Some(now.timestamp() + expires_in));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: non_empty(self.token_type).unwrap_or_else(|| "bearer".into()),
            expires_in,
            expires_at,
            user: self.user.map(User::from),
        }
    }
}

/// Decode a token response into a session.
pub fn session_from_value(value: Value) -> Result<Session> {
    session_at(value, Utc::now())
}

fn session_at(value: Value, now: DateTime<Utc>) -> Result<Session> {
    let wire: WireSession = serde_json::from_value(value)
        .map_err(|e| SupabridgeError::Auth(format!("malformed session response: {e}")))?;
    Ok(wire.into_session(now))
}

/// Decode a user object.
pub fn user_from_value(value: Value) -> Result<User> {
    let wire: WireUser = serde_json::from_value(value)
        .map_err(|e| SupabridgeError::Auth(format!("malformed user response: {e}")))?;
    Ok(wire.into())
}

/// Decode the response of a sign-up style call.
///
/// Accepted shapes: a bare session (tokens at top level), a
/// `{session, user}` envelope, or a bare user when confirmation is pending.
pub fn auth_result_from_value(value: Value) -> Result<AuthResult> {
    let Value::Object(mut obj) = value else {
        return Err(SupabridgeError::Auth("unexpected auth response".into()));
    };

    if obj.contains_key("access_token") {
        return Ok(AuthResult::from_session(session_from_value(Value::Object(obj))?));
    }

    if obj.contains_key("session") || obj.contains_key("user") {
        let session = match obj.remove("session") {
            Some(Value::Null) | None => None,
            Some(raw) => Some(session_from_value(raw)?),
        };
        let user = match obj.remove("user") {
            Some(Value::Null) | None => session.as_ref().and_then(|s| s.user.clone()),
            Some(raw) => Some(user_from_value(raw)?),
        };
        return Ok(AuthResult { session, user });
    }

    if obj.contains_key("id") {
        return Ok(AuthResult {
            session: None,
            user: Some(user_from_value(Value::Object(obj))?),
        });
    }

    Err(SupabridgeError::Auth("unexpected auth response".into()))
}
