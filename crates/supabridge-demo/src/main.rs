// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supabridge: terminal host shell.
//
// Reads one JSON call per stdin line, `{"id": 1, "method": "signInWithPassword",
// "options": {...}}`, runs it through the platform plugin and prints one JSON
// line per outcome. Every `authStateChange` notification is printed as it
// arrives. Calls run concurrently, as they would from a real shell.

use std::env;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use supabridge_bridge::{AUTH_STATE_CHANGE, BridgeObject, SupabasePlugin, dispatch};
use supabridge_core::config::BridgeSettings;

/// Defaults overridden by `SUPABRIDGE_*` environment variables.
fn settings_from_env() -> BridgeSettings {
    let mut settings = BridgeSettings::default();
    if let Ok(column) = env::var("SUPABRIDGE_DEFAULT_ORDER_BY") {
        if !column.trim().is_empty() {
            settings.default_order_by = Some(column.trim().to_owned());
        }
    }
    if let Some(size) = numeric_var("SUPABRIDGE_PAGE_SIZE") {
        settings.default_page_size = size.max(1);
    }
    if let Some(secs) = numeric_var("SUPABRIDGE_TIMEOUT_SECS") {
        settings.request_timeout_secs = secs;
    }
    settings
}

fn numeric_var(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "ignoring non-numeric setting");
            None
        }
    }
}

/// A parsed input line.
#[derive(Debug)]
struct Call {
    id: Value,
    method: String,
    options: BridgeObject,
}

fn parse_call(line: &str) -> Result<Call, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("bad JSON: {e}"))?;
    let Value::Object(mut obj) = value else {
        return Err("expected a JSON object".into());
    };
    let method = match obj.remove("method") {
        Some(Value::String(method)) => method,
        _ => return Err("missing method".into()),
    };
    let options = match obj.remove("options") {
        None | Some(Value::Null) => BridgeObject::new(),
        Some(Value::Object(options)) => options,
        Some(_) => return Err("options must be an object".into()),
    };
    Ok(Call {
        id: obj.remove("id").unwrap_or(Value::Null),
        method,
        options,
    })
}

fn emit(line: Value) {
    println!("{line}");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let plugin: Arc<dyn SupabasePlugin> =
        Arc::from(supabridge_bridge::platform_plugin(settings_from_env()));
    tracing::info!(platform = plugin.platform_name(), "Supabridge shell starting");

    let mut listener = plugin
        .add_listener(AUTH_STATE_CHANGE)
        .map_err(|r| std::io::Error::other(r.message().to_owned()))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut calls = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let call = match parse_call(&line) {
                    Ok(call) => call,
                    Err(message) => {
                        emit(json!({ "id": null, "reject": message }));
                        continue;
                    }
                };
                let plugin = Arc::clone(&plugin);
                calls.spawn(async move {
                    let outcome = dispatch(plugin.as_ref(), &call.method, call.options).await;
                    match outcome {
                        Ok(resolved) => emit(json!({ "id": call.id, "resolve": resolved })),
                        Err(rejection) => emit(json!({ "id": call.id, "reject": rejection.message() })),
                    }
                });
            }
            Some(payload) = listener.recv() => {
                emit(json!({ "event": AUTH_STATE_CHANGE, "data": payload }));
            }
            Some(joined) = calls.join_next(), if !calls.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "call task failed");
                }
            }
        }
    }

    while let Some(joined) = calls.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "call task failed");
        }
    }
    while let Some(payload) = listener.try_recv() {
        emit(json!({ "event": AUTH_STATE_CHANGE, "data": payload }));
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
