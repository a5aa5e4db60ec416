// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auth-state event relay.
//
// One background task per plugin instance consumes the SDK's auth-state
// stream and republishes each transition on `authStateChange`. The task is
// an explicit subscription: `initialize` replaces it, teardown cancels it.
//
// Cancellation is gated under the listener lock. Forwarding checks the gate
// and delivers while holding that lock, and cancelling closes the gate while
// holding it, so once `cancel` returns nothing more reaches a listener.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use supabridge_core::backend::{AuthStateStream, VendorAuthState};
use supabridge_core::types::AuthStateChange;

use crate::marshal::to_object;
use crate::traits::BridgeObject;

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Receiving side of an `authStateChange` registration.
///
/// Each notification is `{event, session}` with `session` null when signed
/// out.
#[derive(Debug)]
pub struct AuthStateListener {
    id: ListenerId,
    events: mpsc::UnboundedReceiver<BridgeObject>,
}

impl AuthStateListener {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next notification; `None` once the listener has been removed.
    pub async fn recv(&mut self) -> Option<BridgeObject> {
        self.events.recv().await
    }

    /// Next notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<BridgeObject> {
        self.events.try_recv().ok()
    }
}

struct Registration {
    id: ListenerId,
    sender: mpsc::UnboundedSender<BridgeObject>,
}

/// Listeners registered from the shell.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<Registration>>,
}

impl ListenerRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self) -> AuthStateListener {
        let (sender, events) = mpsc::unbounded_channel();
        let id = ListenerId(Uuid::new_v4());
        self.lock().push(Registration { id, sender });
        debug!(%id, "auth state listener added");
        AuthStateListener { id, events }
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver `payload` unless `gate` is closed. Returns false when closed.
    fn forward(&self, gate: &AtomicBool, payload: &BridgeObject) -> bool {
        let mut listeners = self.lock();
        if gate.load(Ordering::Acquire) {
            return false;
        }
        listeners.retain(|r| r.sender.send(payload.clone()).is_ok());
        true
    }

    fn close(&self, gate: &AtomicBool) {
        let _listeners = self.lock();
        gate.store(true, Ordering::Release);
    }
}

/// Shape one transition as an `authStateChange` payload.
///
/// Returns `None` for transitions the bridge does not forward.
pub fn envelope(state: VendorAuthState) -> Option<BridgeObject> {
    let event = state.event.bridge_event()?;
    let change = AuthStateChange {
        event,
        session: state.session,
    };
    match to_object(&change) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(error = %e, %event, "could not serialise auth state change");
            let mut payload = BridgeObject::new();
            payload.insert("event".into(), Value::from(event.as_str()));
            payload.insert("session".into(), Value::Null);
            Some(payload)
        }
    }
}

struct Subscription {
    cancelled: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

/// Owner of the single active auth-state subscription.
pub struct EventRelay {
    listeners: Arc<ListenerRegistry>,
    active: Mutex<Option<Subscription>>,
}

impl EventRelay {
    pub fn new(listeners: Arc<ListenerRegistry>) -> Self {
        Self {
            listeners,
            active: Mutex::new(None),
        }
    }

    /// Start forwarding `stream`, cancelling any previous subscription first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, stream: AuthStateStream) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            self.stop(previous);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(Self::forward_loop(
            stream,
            Arc::clone(&self.listeners),
            Arc::clone(&cancelled),
            Arc::clone(&shutdown),
        ));

        *active = Some(Subscription {
            cancelled,
            shutdown,
            task,
        });
        info!("auth state relay subscribed");
    }

    /// Cancel the active subscription. Returns false if there was none.
    pub fn cancel(&self) -> bool {
        let taken = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(subscription) => {
                self.stop(subscription);
                info!("auth state relay unsubscribed");
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    fn stop(&self, subscription: Subscription) {
        self.listeners.close(&subscription.cancelled);
        subscription.shutdown.notify_one();
        // The task exits on its own; dropping the handle detaches it.
        drop(subscription.task);
    }

    async fn forward_loop(
        mut stream: AuthStateStream,
        listeners: Arc<ListenerRegistry>,
        cancelled: Arc<AtomicBool>,
        shutdown: Arc<Notify>,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.notified() => {
                    debug!("relay received shutdown signal");
                    break;
                }

                item = stream.recv() => {
                    let Some(state) = item else {
                        debug!("auth state stream closed");
                        break;
                    };
                    let vendor_event = state.event;
                    let Some(payload) = envelope(state) else {
                        trace!(?vendor_event, "auth transition not forwarded");
                        continue;
                    };
                    if !listeners.forward(&cancelled, &payload) {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for EventRelay {
    fn drop(&mut self) {
        self.cancel();
    }
}
