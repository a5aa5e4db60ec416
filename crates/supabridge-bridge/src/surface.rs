// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method-name dispatch for shells that route calls by string.

use tracing::debug;

use supabridge_core::operation::Operation;

use crate::traits::{BridgeObject, CallResult, Rejection, SupabasePlugin};

/// Route one call by its method name.
///
/// Unknown names reject with `"<name>" is not implemented`. Calls that take
/// no options ignore `options`.
pub async fn dispatch(
    plugin: &dyn SupabasePlugin,
    method: &str,
    options: BridgeObject,
) -> CallResult {
    let op: Operation = method.parse().map_err(|e| Rejection(format!("{e}")))?;
    debug!(method = op.method_name(), platform = plugin.platform_name(), "dispatching call");

    match op {
        Operation::Initialize => plugin.initialize(options).await,
        Operation::SignInWithPassword => plugin.sign_in_with_password(options).await,
        Operation::SignUp => plugin.sign_up(options).await,
        Operation::SignInAnonymously => plugin.sign_in_anonymously().await,
        Operation::SignInWithOAuth => plugin.sign_in_with_oauth(options).await,
        Operation::SignInWithOtp => plugin.sign_in_with_otp(options).await,
        Operation::VerifyOtp => plugin.verify_otp(options).await,
        Operation::SignOut => plugin.sign_out().await,
        Operation::GetSession => plugin.get_session().await,
        Operation::RefreshSession => plugin.refresh_session().await,
        Operation::GetUser => plugin.get_user().await,
        Operation::SetSession => plugin.set_session(options).await,
        Operation::Select => plugin.select(options).await,
        Operation::Insert => plugin.insert(options).await,
        Operation::Update => plugin.update(options).await,
        Operation::Delete => plugin.delete(options).await,
        Operation::GetPluginVersion => plugin.get_plugin_version().await,
    }
}
