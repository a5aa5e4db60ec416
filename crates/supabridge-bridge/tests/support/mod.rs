// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory backend used by the bridge integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use url::Url;

use supabridge_bridge::{AuthStateListener, BridgeObject, ExternalBrowser, NativePlugin};
use supabridge_core::backend::{
    AuthSdk, AuthStateStream, BackendSdk, PostgrestSdk, SdkConnector, VendorAuthEvent,
    VendorAuthState,
};
use supabridge_core::config::{BridgeSettings, ClientConfig};
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::query::{QueryAction, TableQuery};
use supabridge_core::types::{
    AuthResult, JsonObject, OAuthProvider, OtpTarget, OtpType, Session, User,
};

pub const TEST_URL: &str = "https://fake.supabase.test";
pub const TEST_KEY: &str = "anon-key";

pub fn obj(value: Value) -> BridgeObject {
    match value {
        Value::Object(obj) => obj,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn init_options() -> BridgeObject {
    obj(json!({ "supabaseUrl": TEST_URL, "supabaseKey": TEST_KEY }))
}

pub fn session_for(access: &str, refresh: &str, user_id: &str) -> Session {
    Session {
        access_token: access.into(),
        refresh_token: refresh.into(),
        token_type: "bearer".into(),
        expires_in: 3600,
        expires_at: Some(1_900_000_000),
        user: Some(User::new(user_id)),
    }
}

/// Backend double: counts calls, can be switched to fail, and lets tests
/// push auth transitions into every open stream.
#[derive(Default)]
pub struct FakeSdk {
    calls: AtomicUsize,
    queries: AtomicUsize,
    failing: AtomicBool,
    session: Mutex<Option<Session>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<VendorAuthState>>>,
    tables: Mutex<HashMap<String, Vec<JsonObject>>>,
    next_id: AtomicUsize,
    last_query: Mutex<Option<TableQuery>>,
    last_otp: Mutex<Option<(OtpTarget, Option<String>)>>,
}

impl FakeSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total SDK calls, including data queries.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn seed(&self, table: &str, rows: Value) {
        let rows = match rows {
            Value::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(obj) => obj,
                    other => panic!("row must be an object, got {other}"),
                })
                .collect(),
            other => panic!("rows must be an array, got {other}"),
        };
        self.tables.lock().unwrap().insert(table.to_owned(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<JsonObject> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn last_query(&self) -> Option<TableQuery> {
        self.last_query.lock().unwrap().clone()
    }

    /// Target and type name of the last OTP send (`None`) or verify.
    pub fn last_otp(&self) -> Option<(OtpTarget, Option<String>)> {
        self.last_otp.lock().unwrap().clone()
    }

    pub fn stored_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    /// Push one transition into every live stream.
    pub fn inject(&self, event: VendorAuthEvent, session: Option<Session>) {
        let state = VendorAuthState { event, session };
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(state.clone()).is_ok());
    }

    /// Streams whose receiver is still alive (as of the last inject).
    pub fn live_subscribers(&self) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SupabridgeError::Transport("backend unavailable".into()));
        }
        Ok(())
    }

    fn adopt(&self, session: Session, event: VendorAuthEvent) -> AuthResult {
        *self.session.lock().unwrap() = Some(session.clone());
        self.inject(event, Some(session.clone()));
        AuthResult::from_session(session)
    }

    fn matches(row: &JsonObject, query: &TableQuery) -> bool {
        query
            .filters()
            .iter()
            .all(|f| row.get(&f.column) == Some(&f.value.to_json()))
    }
}

#[async_trait]
impl AuthSdk for FakeSdk {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthResult> {
        self.enter()?;
        if password == "wrong" {
            return Err(SupabridgeError::Auth("Invalid login credentials".into()));
        }
        let session = session_for(&format!("access-{email}"), "refresh-1", "user-1");
        Ok(self.adopt(session, VendorAuthEvent::SignedIn))
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: Option<JsonObject>,
    ) -> Result<AuthResult> {
        self.enter()?;
        let mut user = User::new("user-new");
        user.email = Some(email.to_owned());
        user.user_metadata = metadata;
        Ok(AuthResult {
            session: None,
            user: Some(user),
        })
    }

    async fn sign_in_anonymously(&self) -> Result<AuthResult> {
        self.enter()?;
        let session = session_for("access-anon", "refresh-anon", "anon");
        Ok(self.adopt(session, VendorAuthEvent::SignedIn))
    }

    fn oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&Url>,
        scopes: Option<&str>,
    ) -> Result<Url> {
        self.enter()?;
        let mut url = Url::parse(TEST_URL)
            .map_err(|e| SupabridgeError::Auth(e.to_string()))?
            .join("auth/v1/authorize")
            .map_err(|e| SupabridgeError::Auth(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider.as_str());
            if let Some(redirect) = redirect_to {
                query.append_pair("redirect_to", redirect.as_str());
            }
            if let Some(scopes) = scopes {
                query.append_pair("scopes", scopes);
            }
        }
        Ok(url)
    }

    async fn send_otp(&self, target: &OtpTarget) -> Result<()> {
        self.enter()?;
        *self.last_otp.lock().unwrap() = Some((target.clone(), None));
        Ok(())
    }

    async fn verify_otp(&self, target: &OtpTarget, token: &str, kind: OtpType) -> Result<AuthResult> {
        self.enter()?;
        *self.last_otp.lock().unwrap() = Some((target.clone(), Some(kind.as_str().to_owned())));
        if token != "123456" {
            return Err(SupabridgeError::Auth("Token has expired or is invalid".into()));
        }
        let event = if kind.is_recovery() {
            VendorAuthEvent::PasswordRecovery
        } else {
            VendorAuthEvent::SignedIn
        };
        Ok(self.adopt(session_for("access-otp", "refresh-otp", "user-otp"), event))
    }

    async fn sign_out(&self) -> Result<()> {
        self.enter()?;
        *self.session.lock().unwrap() = None;
        self.inject(VendorAuthEvent::SignedOut, None);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        self.enter()?;
        Ok(self.stored_session())
    }

    async fn current_user(&self) -> Result<Option<User>> {
        self.enter()?;
        Ok(self.stored_session().and_then(|s| s.user))
    }

    async fn refresh_session(&self) -> Result<Session> {
        self.enter()?;
        let current = self.stored_session().ok_or(SupabridgeError::NoSession)?;
        let refreshed = Session {
            access_token: format!("{}-refreshed", current.access_token),
            ..current
        };
        self.adopt(refreshed.clone(), VendorAuthEvent::TokenRefreshed);
        Ok(refreshed)
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> Result<Session> {
        self.enter()?;
        if access_token == "bad" {
            return Err(SupabridgeError::Auth("invalid JWT".into()));
        }
        let session = session_for(access_token, refresh_token, "user-imported");
        self.adopt(session.clone(), VendorAuthEvent::SignedIn);
        Ok(session)
    }

    fn auth_state_changes(&self) -> AuthStateStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let initial = VendorAuthState {
            event: VendorAuthEvent::InitialSession,
            session: self.stored_session(),
        };
        if tx.send(initial).is_ok() {
            self.subscribers.lock().unwrap().push(tx);
        }
        rx
    }
}

#[async_trait]
impl PostgrestSdk for FakeSdk {
    async fn execute(&self, query: TableQuery) -> Result<Value> {
        self.enter()?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(query.table().to_owned()).or_default();

        let affected: Vec<JsonObject> = match query.action() {
            QueryAction::Select { .. } => {
                let mut hits: Vec<JsonObject> = rows
                    .iter()
                    .filter(|row| Self::matches(row, &query))
                    .cloned()
                    .collect();
                if let Some(order) = query.ordering() {
                    hits.sort_by(|a, b| {
                        let key = |r: &JsonObject| r.get(&order.column).map(Value::to_string);
                        let ord = key(a).cmp(&key(b));
                        if order.ascending { ord } else { ord.reverse() }
                    });
                }
                if let Some(range) = query.row_range() {
                    hits = hits
                        .into_iter()
                        .skip(range.from as usize)
                        .take(range.row_count() as usize)
                        .collect();
                } else if let Some(limit) = query.row_limit() {
                    hits.truncate(limit as usize);
                }
                hits
            }
            QueryAction::Insert { values } => {
                let mut row = values
                    .as_object()
                    .cloned()
                    .ok_or_else(|| SupabridgeError::Query("insert body must be an object".into()))?;
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                row.entry("id").or_insert_with(|| json!(id));
                rows.push(row.clone());
                vec![row]
            }
            QueryAction::Update { values } => {
                let patch = values.as_object().cloned().unwrap_or_default();
                let mut updated = Vec::new();
                for row in rows.iter_mut().filter(|row| Self::matches(row, &query)) {
                    row.extend(patch.clone());
                    updated.push(row.clone());
                }
                updated
            }
            QueryAction::Delete => {
                let (gone, kept): (Vec<_>, Vec<_>) =
                    rows.drain(..).partition(|row| Self::matches(row, &query));
                *rows = kept;
                gone
            }
        };

        if query.is_single() {
            if affected.len() != 1 {
                return Err(SupabridgeError::Query(
                    "JSON object requested, multiple (or no) rows returned".into(),
                ));
            }
            return Ok(affected.into_iter().next().map(Value::Object).unwrap_or(Value::Null));
        }
        Ok(Value::Array(affected.into_iter().map(Value::Object).collect()))
    }
}

/// Hands out the shared fake and counts connections.
pub struct FakeConnector {
    backend: Arc<FakeSdk>,
    connects: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(backend: Arc<FakeSdk>) -> (Self, Arc<AtomicUsize>) {
        let connects = Arc::new(AtomicUsize::new(0));
        (
            Self {
                backend,
                connects: Arc::clone(&connects),
            },
            connects,
        )
    }
}

impl SdkConnector for FakeConnector {
    fn binding_name(&self) -> &str {
        "fake"
    }

    fn connect(&self, _config: &ClientConfig) -> Result<Arc<dyn BackendSdk>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.backend.clone())
    }
}

/// Records every URL it is asked to open and the thread that asked.
#[derive(Default)]
pub struct RecordingBrowser {
    opened: Mutex<Vec<(Url, ThreadId)>>,
}

impl RecordingBrowser {
    pub fn opened(&self) -> Vec<Url> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn opened_on(&self) -> Vec<ThreadId> {
        self.opened.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

impl ExternalBrowser for RecordingBrowser {
    fn open_url(&self, url: &Url) -> Result<()> {
        self.opened
            .lock()
            .unwrap()
            .push((url.clone(), thread::current().id()));
        Ok(())
    }
}

/// A plugin wired to a fresh fake backend.
pub struct Harness {
    pub plugin: NativePlugin<FakeConnector>,
    pub backend: Arc<FakeSdk>,
    pub browser: Arc<RecordingBrowser>,
    pub connects: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(BridgeSettings::default())
    }

    pub fn with_settings(settings: BridgeSettings) -> Self {
        let backend = FakeSdk::new();
        let browser = Arc::new(RecordingBrowser::default());
        let (connector, connects) = FakeConnector::new(Arc::clone(&backend));
        let plugin = NativePlugin::new(connector, settings, browser.clone());
        Self {
            plugin,
            backend,
            browser,
            connects,
        }
    }
}

/// Next notification, failing the test if none arrives within a second.
pub async fn next_event(listener: &mut AuthStateListener) -> BridgeObject {
    tokio::time::timeout(Duration::from_secs(1), listener.recv())
        .await
        .expect("timed out waiting for authStateChange")
        .expect("listener closed")
}

/// Give the relay task a chance to run, then report whether anything is queued.
pub async fn nothing_more(listener: &mut AuthStateListener) -> bool {
    tokio::time::sleep(Duration::from_millis(50)).await;
    listener.try_recv().is_none()
}
