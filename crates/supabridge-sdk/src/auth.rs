// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// GoTrue auth API binding.
//
// Endpoints used (all below `/auth/v1/`):
//   - token?grant_type=password       password sign-in
//   - token?grant_type=refresh_token  session refresh
//   - signup                          sign-up, anonymous sign-in
//   - otp / verify                    one-time passwords
//   - user                            current user, token validation
//   - logout                          server-side sign-out
//   - authorize                       OAuth redirect (URL only)

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use supabridge_core::backend::{AuthSdk, AuthStateStream, VendorAuthEvent};
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::types::{
    AuthResult, JsonObject, OAuthProvider, OtpTarget, OtpType, Session, User,
};

use crate::client::{HttpSdk, auth_error_message, parse_json, read_body, transport_error};
use crate::wire;

/// Lifetime assumed for a session imported through `set_session`.
const IMPORTED_SESSION_TTL_SECS: i64 = 3600;

impl HttpSdk {
    fn auth_endpoint(&self, path: &str) -> Url {
        self.config().endpoint(&["auth", "v1", path])
    }

    /// Send an auth request and decode its JSON body.
    async fn send_auth(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(transport_error)?;
        let (status, text) = read_body(response).await?;
        if !status.is_success() {
            return Err(SupabridgeError::Auth(auth_error_message(status, &text)));
        }
        parse_json(&text)
    }

    async fn post_token(&self, grant_type: &str, body: Value) -> Result<Session> {
        let request = self
            .keyed_request(Method::POST, self.auth_endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        wire::session_from_value(self.send_auth(request).await?)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User> {
        let request = self.token_request(Method::GET, self.auth_endpoint("user"), access_token);
        wire::user_from_value(self.send_auth(request).await?)
    }
}

/// A token the server no longer knows is as good as signed out.
fn logout_accepted(status: StatusCode) -> bool {
    status.is_success()
        || matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        )
}

fn otp_target_body(target: &OtpTarget) -> JsonObject {
    let mut body = JsonObject::new();
    match target {
        OtpTarget::Email(email) => body.insert("email".into(), json!(email)),
        OtpTarget::Phone(phone) => body.insert("phone".into(), json!(phone)),
    };
    body
}

#[async_trait]
impl AuthSdk for HttpSdk {
    #[instrument(skip_all)]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthResult> {
        let session = self
            .post_token("password", json!({ "email": email, "password": password }))
            .await?;
        info!("signed in with password");
        Ok(self.adopt_session(session, VendorAuthEvent::SignedIn))
    }

    #[instrument(skip_all)]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Option<JsonObject>,
    ) -> Result<AuthResult> {
        let body = json!({
            "email": email,
            "password": password,
            "data": metadata.unwrap_or_default(),
        });
        let request = self
            .keyed_request(Method::POST, self.auth_endpoint("signup"))
            .json(&body);
        let result = wire::auth_result_from_value(self.send_auth(request).await?)?;

        match result.session {
            Some(session) => {
                info!("signed up with immediate session");
                let mut adopted = self.adopt_session(session, VendorAuthEvent::SignedIn);
                if adopted.user.is_none() {
                    adopted.user = result.user;
                }
                Ok(adopted)
            }
            None => {
                info!("signed up, confirmation pending");
                Ok(result)
            }
        }
    }

    #[instrument(skip_all)]
    async fn sign_in_anonymously(&self) -> Result<AuthResult> {
        let request = self
            .keyed_request(Method::POST, self.auth_endpoint("signup"))
            .json(&json!({ "data": {} }));
        let result = wire::auth_result_from_value(self.send_auth(request).await?)?;
        let session = result
            .session
            .ok_or_else(|| SupabridgeError::Auth("anonymous sign-in returned no session".into()))?;
        info!("signed in anonymously");
        Ok(self.adopt_session(session, VendorAuthEvent::SignedIn))
    }

    fn oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&Url>,
        scopes: Option<&str>,
    ) -> Result<Url> {
        let mut url = self.auth_endpoint("authorize");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider.as_str());
            if let Some(redirect) = redirect_to {
                query.append_pair("redirect_to", redirect.as_str());
            }
            if let Some(scopes) = scopes.filter(|s| !s.trim().is_empty()) {
                query.append_pair("scopes", scopes);
            }
        }
        debug!(%provider, "built OAuth authorize URL");
        Ok(url)
    }

    #[instrument(skip_all)]
    async fn send_otp(&self, target: &OtpTarget) -> Result<()> {
        let mut body = otp_target_body(target);
        body.insert("create_user".into(), Value::Bool(true));
        let request = self
            .keyed_request(Method::POST, self.auth_endpoint("otp"))
            .json(&body);
        self.send_auth(request).await?;
        info!("one-time password dispatched");
        Ok(())
    }

    #[instrument(skip_all, fields(kind = kind.as_str()))]
    async fn verify_otp(
        &self,
        target: &OtpTarget,
        token: &str,
        kind: OtpType,
    ) -> Result<AuthResult> {
        let mut body = otp_target_body(target);
        body.insert("token".into(), json!(token));
        body.insert("type".into(), json!(kind.as_str()));
        let request = self
            .keyed_request(Method::POST, self.auth_endpoint("verify"))
            .json(&body);
        let result = wire::auth_result_from_value(self.send_auth(request).await?)?;

        let session = match result.session {
            Some(session) => session,
            None => return Ok(result),
        };
        let event = if kind.is_recovery() {
            VendorAuthEvent::PasswordRecovery
        } else {
            VendorAuthEvent::SignedIn
        };
        info!("one-time password verified");
        Ok(self.adopt_session(session, event))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self) -> Result<()> {
        let outcome = match self.stored_session() {
            Some(session) => {
                let request = self.token_request(
                    Method::POST,
                    self.auth_endpoint("logout"),
                    &session.access_token,
                );
                match request.send().await {
                    Ok(response) => match read_body(response).await {
                        Ok((status, _)) if logout_accepted(status) => Ok(()),
                        Ok((status, text)) => {
                            Err(SupabridgeError::Auth(auth_error_message(status, &text)))
                        }
                        Err(e) => Err(e),
                    },
                    Err(e) => Err(transport_error(e)),
                }
            }
            None => Ok(()),
        };

        // The local session goes away even if the server could not be told.
        self.store_session(None);
        self.events.emit(VendorAuthEvent::SignedOut, None);
        match &outcome {
            Ok(()) => info!("signed out"),
            Err(e) => warn!(error = %e, "server sign-out failed; local session cleared"),
        }
        outcome
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.stored_session())
    }

    #[instrument(skip_all)]
    async fn current_user(&self) -> Result<Option<User>> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };
        let user = self.fetch_user(&session.access_token).await?;

        // Keep the stored copy current unless the session changed meanwhile.
        if let Some(mut stored) = self.stored_session() {
            if stored.access_token == session.access_token {
                stored.user = Some(user.clone());
                self.store_session(Some(stored));
            }
        }
        Ok(Some(user))
    }

    #[instrument(skip_all)]
    async fn refresh_session(&self) -> Result<Session> {
        let current = self.stored_session().ok_or(SupabridgeError::NoSession)?;
        let session = self
            .post_token(
                "refresh_token",
                json!({ "refresh_token": current.refresh_token }),
            )
            .await?;
        info!("session refreshed");
        let result = self.adopt_session(session, VendorAuthEvent::TokenRefreshed);
        result.session.ok_or(SupabridgeError::NoSession)
    }

    #[instrument(skip_all)]
    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session> {
        let user = self.fetch_user(access_token).await?;
        let session = Session {
            access_token: access_token.to_owned(),
            refresh_token: refresh_token.to_owned(),
            token_type: "bearer".into(),
            expires_in: IMPORTED_SESSION_TTL_SECS,
            expires_at: Some(Utc::now().timestamp() + IMPORTED_SESSION_TTL_SECS),
            user: Some(user),
        };
        info!("session imported");
        let result = self.adopt_session(session, VendorAuthEvent::SignedIn);
        result.session.ok_or(SupabridgeError::NoSession)
    }

    fn auth_state_changes(&self) -> AuthStateStream {
        self.events.subscribe(|| self.stored_session())
    }
}
