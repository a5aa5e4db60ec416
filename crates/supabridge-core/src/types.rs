// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the SDK binding and the bridge.
//
// Serialised field names follow the bridge's camelCase object model; the
// HTTP binding keeps its own snake_case wire structs and converts into these.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SupabridgeError;

/// Opaque JSON object passed through unmodified (user/app metadata, rows).
pub type JsonObject = Map<String, Value>;

/// An authenticated user as exposed to the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<JsonObject>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            phone: None,
            created_at: None,
            last_sign_in_at: None,
            user_metadata: None,
            app_metadata: None,
        }
    }
}

/// Access/refresh token pair plus metadata for an authenticated period.
///
/// Both tokens are plain fields, so a session can never carry one without
/// the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Uniform result of every auth operation that may yield a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    pub session: Option<Session>,
    pub user: Option<User>,
}

impl AuthResult {
    /// Result built from a fresh session; the user is taken from it.
    pub fn from_session(session: Session) -> Self {
        let user = session.user.clone();
        Self {
            session: Some(session),
            user,
        }
    }
}

/// Auth-state events forwarded to the shell on `authStateChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

impl AuthChangeEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of one `authStateChange` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthStateChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

/// OAuth providers the auth API can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthProvider {
    Apple,
    Azure,
    Bitbucket,
    Discord,
    Facebook,
    Figma,
    Github,
    Gitlab,
    Google,
    Kakao,
    Keycloak,
    Linkedin,
    LinkedinOidc,
    Notion,
    Slack,
    SlackOidc,
    Spotify,
    Twitch,
    Twitter,
    Workos,
    Zoom,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 21] = [
        Self::Apple,
        Self::Azure,
        Self::Bitbucket,
        Self::Discord,
        Self::Facebook,
        Self::Figma,
        Self::Github,
        Self::Gitlab,
        Self::Google,
        Self::Kakao,
        Self::Keycloak,
        Self::Linkedin,
        Self::LinkedinOidc,
        Self::Notion,
        Self::Slack,
        Self::SlackOidc,
        Self::Spotify,
        Self::Twitch,
        Self::Twitter,
        Self::Workos,
        Self::Zoom,
    ];

    /// Provider name as the auth API expects it in `?provider=`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Azure => "azure",
            Self::Bitbucket => "bitbucket",
            Self::Discord => "discord",
            Self::Facebook => "facebook",
            Self::Figma => "figma",
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Google => "google",
            Self::Kakao => "kakao",
            Self::Keycloak => "keycloak",
            Self::Linkedin => "linkedin",
            Self::LinkedinOidc => "linkedin_oidc",
            Self::Notion => "notion",
            Self::Slack => "slack",
            Self::SlackOidc => "slack_oidc",
            Self::Spotify => "spotify",
            Self::Twitch => "twitch",
            Self::Twitter => "twitter",
            Self::Workos => "workos",
            Self::Zoom => "zoom",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = SupabridgeError;

    /// Case-insensitive match against the fixed provider list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| SupabridgeError::UnknownProvider(s.to_owned()))
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an OTP is delivered. Exactly one channel per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpTarget {
    Email(String),
    Phone(String),
}

/// Verification types accepted for email OTPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOtpType {
    Signup,
    Magiclink,
    Recovery,
    Email,
}

/// Verification types accepted for phone OTPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneOtpType {
    Sms,
}

/// OTP verification type, tied to the channel it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpType {
    Email(EmailOtpType),
    Phone(PhoneOtpType),
}

impl OtpType {
    /// Resolve a type name for the given target.
    ///
    /// Matching is case-insensitive. An absent name defaults to `email`
    /// for email targets and `sms` for phone targets; a name from the
    /// other channel's list is rejected.
    pub fn for_target(target: &OtpTarget, name: Option<&str>) -> Result<Self, SupabridgeError> {
        let lower = name.map(|n| n.trim().to_ascii_lowercase());
        match target {
            OtpTarget::Email(_) => {
                let kind = match lower.as_deref() {
                    None | Some("email") => EmailOtpType::Email,
                    Some("signup") => EmailOtpType::Signup,
                    Some("magiclink") => EmailOtpType::Magiclink,
                    Some("recovery") => EmailOtpType::Recovery,
                    Some(_) => {
                        return Err(SupabridgeError::UnknownOtpType(
                            name.unwrap_or_default().to_owned(),
                        ));
                    }
                };
                Ok(Self::Email(kind))
            }
            OtpTarget::Phone(_) => match lower.as_deref() {
                None | Some("sms") => Ok(Self::Phone(PhoneOtpType::Sms)),
                Some(_) => Err(SupabridgeError::UnknownOtpType(
                    name.unwrap_or_default().to_owned(),
                )),
            },
        }
    }

    /// Type name as the auth API expects it in the `verify` body.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email(EmailOtpType::Signup) => "signup",
            Self::Email(EmailOtpType::Magiclink) => "magiclink",
            Self::Email(EmailOtpType::Recovery) => "recovery",
            Self::Email(EmailOtpType::Email) => "email",
            Self::Phone(PhoneOtpType::Sms) => "sms",
        }
    }

    pub fn is_recovery(self) -> bool {
        matches!(self, Self::Email(EmailOtpType::Recovery))
    }
}

/// Outcome of a data operation: exactly one of `data` / `error` is set.
///
/// `data` and `error` always serialise (as `null` when unset) so the shell
/// sees a stable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub data: Option<Value>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl QueryResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
            count: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "query failed".into();
        }
        Self {
            data: None,
            error: Some(message),
            count: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}
