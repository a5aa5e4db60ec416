// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Supabridge.

use thiserror::Error;

/// Top-level error type for all Supabridge operations.
///
/// Validation variants are raised before any request leaves the device.
/// Backend variants carry the message reported by the auth or data API.
#[derive(Debug, Error)]
pub enum SupabridgeError {
    // -- Lifecycle --
    #[error("Supabase client not initialized. Call initialize() first.")]
    NotInitialized,

    // -- Validation --
    #[error("missing {0}")]
    MissingField(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("invalid OTP type: {0}")]
    UnknownOtpType(String),

    #[error("unsupported filter value for column '{column}': {kind}")]
    UnsupportedFilterValue { column: String, kind: String },

    #[error("missing filter for {0} operation")]
    EmptyFilter(String),

    // -- Backend --
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Query(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("no active session")]
    NoSession,

    // -- Platform bridge --
    #[error("could not open browser: {0}")]
    Browser(String),

    #[error("Web implementation not available. Use @supabase/supabase-js directly for web.")]
    WebUnavailable,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SupabridgeError {
    /// Shorthand for a required option that was absent or empty.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Shorthand for an option that was present but unusable.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors detected locally, before any backend call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidField { .. }
                | Self::InvalidUrl { .. }
                | Self::UnknownProvider(_)
                | Self::UnknownOtpType(_)
                | Self::UnsupportedFilterValue { .. }
                | Self::EmptyFilter(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SupabridgeError>;
