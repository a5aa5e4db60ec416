// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fan-out of auth-state transitions to every open subscription.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::trace;

use supabridge_core::backend::{AuthStateStream, VendorAuthEvent, VendorAuthState};
use supabridge_core::types::Session;

/// Subscriber list for the auth-state stream.
///
/// Each subscription is an unbounded channel, so a slow consumer never
/// drops or reorders transitions. Subscribers whose receiver is gone are
/// pruned on the next emit.
#[derive(Default)]
pub struct AuthEventHub {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<VendorAuthState>>>,
}

impl AuthEventHub {
    /// Open a subscription. The first item is always `InitialSession`.
    ///
    /// `current` is read while the subscriber list is locked, so a
    /// concurrent `emit` is either reflected in the initial item or
    /// delivered after it, never lost.
    pub fn subscribe(&self, current: impl FnOnce() -> Option<Session>) -> AuthStateStream {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (tx, rx) = mpsc::unbounded_channel();
        let initial = VendorAuthState {
            event: VendorAuthEvent::InitialSession,
            session: current(),
        };
        if tx.send(initial).is_ok() {
            subscribers.push(tx);
        }
        rx
    }

    /// Deliver one transition to every live subscriber.
    pub fn emit(&self, event: VendorAuthEvent, session: Option<Session>) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let state = VendorAuthState { event, session };
        subscribers.retain(|tx| tx.send(state.clone()).is_ok());
        trace!(?event, live = subscribers.len(), "auth state emitted");
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
