// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge operations and their failure conventions.
//
// Every method on the bridge surface fails in exactly one of three ways.
// The convention is fixed per operation and drives how the adapters turn a
// `SupabridgeError` into what the shell sees.

use std::fmt;
use std::str::FromStr;

use crate::error::SupabridgeError;

/// How an operation reports failure to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureConvention {
    /// The call is rejected with a message prefixed by the operation's purpose.
    Reject,
    /// The call resolves with the result field set to `null`.
    NullField,
    /// The call resolves with `{data: null, error: message}`.
    EmbeddedError,
    /// The call cannot fail.
    Infallible,
}

/// One method of the bridge surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    SignInWithPassword,
    SignUp,
    SignInAnonymously,
    SignInWithOAuth,
    SignInWithOtp,
    VerifyOtp,
    SignOut,
    GetSession,
    RefreshSession,
    GetUser,
    SetSession,
    Select,
    Insert,
    Update,
    Delete,
    GetPluginVersion,
}

impl Operation {
    pub const ALL: [Operation; 17] = [
        Self::Initialize,
        Self::SignInWithPassword,
        Self::SignUp,
        Self::SignInAnonymously,
        Self::SignInWithOAuth,
        Self::SignInWithOtp,
        Self::VerifyOtp,
        Self::SignOut,
        Self::GetSession,
        Self::RefreshSession,
        Self::GetUser,
        Self::SetSession,
        Self::Select,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::GetPluginVersion,
    ];

    /// Method name as the shell invokes it.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::SignInWithPassword => "signInWithPassword",
            Self::SignUp => "signUp",
            Self::SignInAnonymously => "signInAnonymously",
            Self::SignInWithOAuth => "signInWithOAuth",
            Self::SignInWithOtp => "signInWithOtp",
            Self::VerifyOtp => "verifyOtp",
            Self::SignOut => "signOut",
            Self::GetSession => "getSession",
            Self::RefreshSession => "refreshSession",
            Self::GetUser => "getUser",
            Self::SetSession => "setSession",
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::GetPluginVersion => "getPluginVersion",
        }
    }

    pub fn convention(self) -> FailureConvention {
        match self {
            Self::GetSession | Self::GetUser => FailureConvention::NullField,
            Self::Select | Self::Insert | Self::Update | Self::Delete => {
                FailureConvention::EmbeddedError
            }
            Self::GetPluginVersion => FailureConvention::Infallible,
            _ => FailureConvention::Reject,
        }
    }

    /// Prefix placed in front of the cause when the call is rejected.
    pub fn failure_prefix(self) -> Option<&'static str> {
        match self {
            Self::Initialize => Some("Failed to initialize Supabase client"),
            Self::SignInWithPassword => Some("Sign in failed"),
            Self::SignUp => Some("Sign up failed"),
            Self::SignInAnonymously => Some("Anonymous sign in failed"),
            Self::SignInWithOAuth => Some("OAuth sign in failed"),
            Self::SignInWithOtp => Some("OTP sign in failed"),
            Self::VerifyOtp => Some("OTP verification failed"),
            Self::SignOut => Some("Sign out failed"),
            Self::RefreshSession => Some("Session refresh failed"),
            Self::SetSession => Some("Set session failed"),
            _ => None,
        }
    }

    /// Message the shell sees when this operation is rejected.
    ///
    /// The uninitialised and web-unavailable messages are shared by every
    /// operation and are never prefixed.
    pub fn rejection_message(self, err: &SupabridgeError) -> String {
        match (err, self.failure_prefix()) {
            (SupabridgeError::NotInitialized | SupabridgeError::WebUnavailable, _) => {
                err.to_string()
            }
            (_, Some(prefix)) => format!("{prefix}: {err}"),
            (_, None) => err.to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Error for a method name the bridge does not expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" is not implemented", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Operation {
    type Err = UnknownMethod;

    /// Exact, case-sensitive match on the method name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.method_name() == s)
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventions_split_as_documented() {
        let rejecting: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.convention() == FailureConvention::Reject)
            .collect();
        assert_eq!(rejecting.len(), 10);
        assert!(rejecting.iter().all(|op| op.failure_prefix().is_some()));

        assert_eq!(Operation::GetSession.convention(), FailureConvention::NullField);
        assert_eq!(Operation::GetUser.convention(), FailureConvention::NullField);
        assert_eq!(Operation::Delete.convention(), FailureConvention::EmbeddedError);
        assert_eq!(
            Operation::GetPluginVersion.convention(),
            FailureConvention::Infallible
        );
    }

    #[test]
    fn rejection_is_prefixed_by_purpose() {
        let err = SupabridgeError::Auth("Invalid login credentials".into());
        assert_eq!(
            Operation::SignInWithPassword.rejection_message(&err),
            "Sign in failed: Invalid login credentials"
        );

        let err = SupabridgeError::missing("email or password");
        assert_eq!(
            Operation::SignUp.rejection_message(&err),
            "Sign up failed: missing email or password"
        );
    }

    #[test]
    fn uninitialised_is_never_prefixed() {
        assert_eq!(
            Operation::SignOut.rejection_message(&SupabridgeError::NotInitialized),
            "Supabase client not initialized. Call initialize() first."
        );
    }

    #[test]
    fn method_names_parse_back() {
        for op in Operation::ALL {
            assert_eq!(op.method_name().parse::<Operation>().unwrap(), op);
        }
        let err = "signin".parse::<Operation>().unwrap_err();
        assert_eq!(err.to_string(), "\"signin\" is not implemented");
    }
}
