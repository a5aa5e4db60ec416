// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client and bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SupabridgeError};

/// Connection settings for one backend project: base URL plus public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    supabase_url: Url,
    supabase_key: String,
}

impl ClientConfig {
    /// Validate and build a config.
    ///
    /// Both inputs must be non-empty, and the URL must be an absolute
    /// `http`/`https` URL. The base path always ends in `/` so that
    /// endpoint joins keep any path prefix the project URL carries.
    pub fn new(supabase_url: &str, supabase_key: &str) -> Result<Self> {
        let url_str = supabase_url.trim();
        if url_str.is_empty() {
            return Err(SupabridgeError::missing("supabaseUrl"));
        }
        if supabase_key.trim().is_empty() {
            return Err(SupabridgeError::missing("supabaseKey"));
        }

        let mut url = Url::parse(url_str).map_err(|e| SupabridgeError::InvalidUrl {
            url: url_str.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SupabridgeError::InvalidUrl {
                url: url_str.to_owned(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(SupabridgeError::InvalidUrl {
                url: url_str.to_owned(),
                reason: "missing host".into(),
            });
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self {
            supabase_url: url,
            supabase_key: supabase_key.trim().to_owned(),
        })
    }

    /// Normalised project URL (always ends in `/`).
    pub fn supabase_url(&self) -> &Url {
        &self.supabase_url
    }

    /// Public (anon) API key.
    pub fn supabase_key(&self) -> &str {
        &self.supabase_key
    }

    /// Build an endpoint URL below the project URL.
    ///
    /// Each segment is percent-encoded on its own, so table names with
    /// reserved characters cannot escape the `rest/v1/` prefix.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.supabase_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }
}

/// Bridge-wide tunables shared by every platform binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Column used to order `select` results when the call names none.
    /// `None` leaves the backend's natural order untouched.
    pub default_order_by: Option<String>,
    /// Page size assumed when `offset` is given without `limit`.
    pub default_page_size: u64,
    /// Request timeout handed to the HTTP connector, in seconds.
    pub request_timeout_secs: u64,
}

impl BridgeSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            default_order_by: None,
            default_page_size: 1000,
            request_timeout_secs: 30,
        }
    }
}
