// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// authStateChange delivery through the native plugin.

mod support;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use supabridge_bridge::{AUTH_STATE_CHANGE, AuthStateListener, SupabasePlugin};
use supabridge_core::backend::VendorAuthEvent;

use support::{Harness, init_options, next_event, nothing_more, session_for};

/// Initialised harness with one listener that has already seen INITIAL_SESSION.
async fn listening() -> (Harness, AuthStateListener) {
    let h = Harness::new();
    let mut listener = h.plugin.add_listener(AUTH_STATE_CHANGE).unwrap();
    h.plugin.initialize(init_options()).await.unwrap();
    let initial = next_event(&mut listener).await;
    assert_eq!(Value::Object(initial), json!({ "event": "INITIAL_SESSION", "session": null }));
    (h, listener)
}

#[tokio::test]
async fn sign_in_then_sign_out_arrive_in_order() {
    let (h, mut listener) = listening().await;

    h.backend.inject(
        VendorAuthEvent::SignedIn,
        Some(session_for("access-1", "refresh-1", "user-1")),
    );
    h.backend.inject(VendorAuthEvent::SignedOut, None);

    let first = next_event(&mut listener).await;
    assert_eq!(first["event"], "SIGNED_IN");
    assert_eq!(first["session"]["accessToken"], "access-1");
    assert_eq!(first["session"]["user"]["id"], "user-1");

    let second = next_event(&mut listener).await;
    assert_eq!(Value::Object(second), json!({ "event": "SIGNED_OUT", "session": null }));

    assert!(nothing_more(&mut listener).await);
}

#[tokio::test]
async fn bridge_calls_surface_their_transitions() {
    let (h, mut listener) = listening().await;

    h.plugin.sign_in_anonymously().await.unwrap();
    assert_eq!(next_event(&mut listener).await["event"], "SIGNED_IN");

    h.plugin.refresh_session().await.unwrap();
    assert_eq!(next_event(&mut listener).await["event"], "TOKEN_REFRESHED");

    h.plugin.sign_out().await.unwrap();
    assert_eq!(next_event(&mut listener).await["event"], "SIGNED_OUT");
}

#[tokio::test]
async fn unmapped_transitions_are_dropped() {
    let (h, mut listener) = listening().await;

    h.backend.inject(VendorAuthEvent::UserDeleted, None);
    h.backend.inject(VendorAuthEvent::MfaChallengeVerified, None);
    h.backend.inject(VendorAuthEvent::UserUpdated, None);

    assert_eq!(next_event(&mut listener).await["event"], "USER_UPDATED");
    assert!(nothing_more(&mut listener).await);
}

#[tokio::test]
async fn every_listener_gets_every_notification() {
    let (h, mut first) = listening().await;
    let mut second = h.plugin.add_listener(AUTH_STATE_CHANGE).unwrap();

    h.backend.inject(VendorAuthEvent::SignedOut, None);

    assert_eq!(next_event(&mut first).await["event"], "SIGNED_OUT");
    assert_eq!(next_event(&mut second).await["event"], "SIGNED_OUT");
}

#[tokio::test]
async fn nothing_is_delivered_after_teardown() {
    let (h, mut listener) = listening().await;

    h.plugin.teardown();
    assert!(!h.plugin.is_relaying());
    h.backend.inject(VendorAuthEvent::SignedOut, None);

    assert!(nothing_more(&mut listener).await);
}

#[tokio::test]
async fn reinitialize_keeps_a_single_subscription() {
    let (h, mut listener) = listening().await;

    h.plugin.initialize(init_options()).await.unwrap();
    assert_eq!(next_event(&mut listener).await["event"], "INITIAL_SESSION");

    h.backend.inject(VendorAuthEvent::SignedOut, None);
    assert_eq!(next_event(&mut listener).await["event"], "SIGNED_OUT");
    assert!(nothing_more(&mut listener).await);
    assert_eq!(h.backend.live_subscribers(), 1);
}

#[tokio::test]
async fn listeners_survive_teardown_and_resume_on_initialize() {
    let (h, mut listener) = listening().await;

    h.plugin.teardown();
    h.plugin.initialize(init_options()).await.unwrap();

    assert_eq!(next_event(&mut listener).await["event"], "INITIAL_SESSION");
    h.backend.inject(VendorAuthEvent::SignedOut, None);
    assert_eq!(next_event(&mut listener).await["event"], "SIGNED_OUT");
}

#[tokio::test]
async fn removed_listeners_stop_receiving() {
    let (h, mut kept) = listening().await;
    let mut removed = h.plugin.add_listener(AUTH_STATE_CHANGE).unwrap();

    assert!(h.plugin.remove_listener(removed.id()));
    assert!(!h.plugin.remove_listener(removed.id()));
    assert_eq!(removed.recv().await, None);

    h.backend.inject(VendorAuthEvent::SignedOut, None);
    assert_eq!(next_event(&mut kept).await["event"], "SIGNED_OUT");

    h.plugin.remove_all_listeners();
    assert_eq!(kept.recv().await, None);
}

#[tokio::test]
async fn unknown_event_names_are_rejected() {
    let h = Harness::new();
    let err = h.plugin.add_listener("userChanged").unwrap_err();
    assert_eq!(err.message(), "unknown event \"userChanged\"");
}

#[tokio::test]
async fn dropping_the_plugin_closes_the_stream() {
    let (h, _listener) = listening().await;
    let backend = std::sync::Arc::clone(&h.backend);
    assert_eq!(backend.live_subscribers(), 1);

    drop(h);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.live_subscribers(), 0);
}
