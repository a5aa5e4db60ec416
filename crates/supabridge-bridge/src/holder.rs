// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client lifecycle holder.

use std::sync::{Arc, PoisonError, RwLock};

use supabridge_core::backend::BackendSdk;
use supabridge_core::error::{Result, SupabridgeError};

/// The one backend client owned by a plugin instance.
///
/// Empty until `initialize` succeeds. A later `initialize` replaces the
/// handle wholesale; callers that already cloned the old `Arc` finish on it.
#[derive(Default)]
pub struct ClientHolder {
    client: RwLock<Option<Arc<dyn BackendSdk>>>,
}

impl ClientHolder {
    /// Install a new client, returning the one it replaced.
    pub fn install(&self, client: Arc<dyn BackendSdk>) -> Option<Arc<dyn BackendSdk>> {
        self.client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(client)
    }

    /// The installed client, or `NotInitialized`.
    pub fn current(&self) -> Result<Arc<dyn BackendSdk>> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SupabridgeError::NotInitialized)
    }

    /// Drop the installed client. Returns true if there was one.
    pub fn clear(&self) -> bool {
        self.client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
