// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auth adapter: options in, one SDK call, generic object out.
//
// These functions return the core error unchanged; the plugin applies the
// operation's failure convention on top.

use tracing::{debug, warn};
use url::Url;

use supabridge_core::backend::BackendSdk;
use supabridge_core::error::{Result, SupabridgeError};
use supabridge_core::types::{OAuthProvider, OtpTarget, OtpType};

use crate::marshal::{Args, single_field, to_object};
use crate::traits::{BridgeObject, ExternalBrowser};

pub(crate) async fn sign_in_with_password(sdk: &dyn BackendSdk, args: &Args) -> Result<BridgeObject> {
    let email = args.required_str("email")?;
    let password = args.required_str("password")?;
    to_object(&sdk.sign_in_with_password(email, password).await?)
}

pub(crate) async fn sign_up(sdk: &dyn BackendSdk, args: &Args) -> Result<BridgeObject> {
    let email = args.required_str("email")?;
    let password = args.required_str("password")?;
    let metadata = args.optional_object("data")?.cloned();
    to_object(&sdk.sign_up(email, password, metadata).await?)
}

pub(crate) async fn sign_in_anonymously(sdk: &dyn BackendSdk) -> Result<BridgeObject> {
    to_object(&sdk.sign_in_anonymously().await?)
}

/// Build the provider URL and hand it to the system browser.
///
/// The call resolves once the browser has been asked to open; the session
/// arrives later through the deep-link callback and `authStateChange`.
pub(crate) fn sign_in_with_oauth(
    sdk: &dyn BackendSdk,
    browser: &dyn ExternalBrowser,
    args: &Args,
) -> Result<BridgeObject> {
    let provider: OAuthProvider = args.required_str("provider")?.parse()?;
    let redirect_to = args
        .optional_str("redirectTo")?
        .map(|raw| {
            Url::parse(raw).map_err(|e| SupabridgeError::InvalidUrl {
                url: raw.to_owned(),
                reason: e.to_string(),
            })
        })
        .transpose()?;
    let scopes = args.optional_str("scopes")?;

    let url = sdk.oauth_url(provider, redirect_to.as_ref(), scopes)?;
    debug!(%provider, "opening OAuth URL");
    browser.open_url(&url)?;
    Ok(BridgeObject::new())
}

/// Exactly one of `email` / `phone`.
fn otp_target(args: &Args) -> Result<OtpTarget> {
    match (args.optional_str("email")?, args.optional_str("phone")?) {
        (Some(email), None) => Ok(OtpTarget::Email(email.to_owned())),
        (None, Some(phone)) => Ok(OtpTarget::Phone(phone.to_owned())),
        (None, None) => Err(SupabridgeError::missing("email or phone")),
        (Some(_), Some(_)) => Err(SupabridgeError::invalid(
            "email/phone",
            "provide exactly one of email or phone",
        )),
    }
}

pub(crate) async fn sign_in_with_otp(sdk: &dyn BackendSdk, args: &Args) -> Result<BridgeObject> {
    let target = otp_target(args)?;
    sdk.send_otp(&target).await?;
    Ok(BridgeObject::new())
}

pub(crate) async fn verify_otp(sdk: &dyn BackendSdk, args: &Args) -> Result<BridgeObject> {
    let target = otp_target(args)?;
    let token = args.required_str("token")?;
    let kind = OtpType::for_target(&target, args.optional_str("type")?)?;
    to_object(&sdk.verify_otp(&target, token, kind).await?)
}

pub(crate) async fn sign_out(sdk: &dyn BackendSdk) -> Result<BridgeObject> {
    sdk.sign_out().await?;
    Ok(BridgeObject::new())
}

/// `{session}`; a failure reads as "no session".
pub(crate) async fn get_session(sdk: &dyn BackendSdk) -> BridgeObject {
    let session = match sdk.current_session().await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "getSession failed; resolving null session");
            None
        }
    };
    null_on_error("session", single_field("session", &session))
}

pub(crate) async fn refresh_session(sdk: &dyn BackendSdk) -> Result<BridgeObject> {
    let session = sdk.refresh_session().await?;
    single_field("session", &Some(session))
}

/// `{user}`; a failure reads as "no user".
pub(crate) async fn get_user(sdk: &dyn BackendSdk) -> BridgeObject {
    let user = match sdk.current_user().await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "getUser failed; resolving null user");
            None
        }
    };
    null_on_error("user", single_field("user", &user))
}

pub(crate) async fn set_session(sdk: &dyn BackendSdk, args: &Args) -> Result<BridgeObject> {
    let access_token = args.required_str("accessToken")?;
    let refresh_token = args.required_str("refreshToken")?;
    let session = sdk.set_session(access_token, refresh_token).await?;
    single_field("session", &Some(session))
}

fn null_on_error(key: &str, shaped: Result<BridgeObject>) -> BridgeObject {
    shaped.unwrap_or_else(|e| {
        warn!(error = %e, key, "could not serialise result; resolving null");
        let mut obj = BridgeObject::new();
        obj.insert(key.to_owned(), serde_json::Value::Null);
        obj
    })
}
