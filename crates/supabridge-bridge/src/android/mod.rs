// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android external browser via JNI.
//
// Builds an `ACTION_VIEW` intent for the URL and starts it from the hosting
// Activity, so the user's default browser (or a Custom Tab provider) handles
// the OAuth flow. The redirect comes back through the app's deep-link intent
// filter, which the host wires into `setSession` / `authStateChange`.

#![cfg(target_os = "android")]

use jni::JavaVM;
use jni::objects::{JObject, JString, JValue};
use url::Url;

use supabridge_core::error::{Result, SupabridgeError};

use crate::traits::ExternalBrowser;

/// `Intent.FLAG_ACTIVITY_NEW_TASK`.
const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;

/// The process-wide [`JavaVM`] registered by the NDK glue.
fn java_vm() -> Result<JavaVM> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` set by `ANativeActivity_onCreate`
    // and stays valid for the life of the process.
    unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| SupabridgeError::Browser(format!("failed to obtain JavaVM: {e}")))
}

/// The hosting Activity (or application context).
fn context() -> Result<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(SupabridgeError::Browser("Android context is null".into()));
    }
    // SAFETY: the NDK hands out a global reference to the hosting context.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

fn jni_err(step: &str, e: jni::errors::Error) -> SupabridgeError {
    SupabridgeError::Browser(format!("{step}: {e}"))
}

/// Opens URLs with an `ACTION_VIEW` intent.
#[derive(Debug, Default)]
pub struct AndroidBrowser;

impl AndroidBrowser {
    pub fn new() -> Self {
        Self
    }
}

impl ExternalBrowser for AndroidBrowser {
    fn open_url(&self, url: &Url) -> Result<()> {
        let vm = java_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| jni_err("attach_current_thread", e))?;
        let context = context()?;

        // Uri.parse(url)
        let j_url: JString = env
            .new_string(url.as_str())
            .map_err(|e| jni_err("new_string(url)", e))?;
        let uri: JObject = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&j_url)],
            )
            .map_err(|e| jni_err("Uri.parse", e))?
            .l()
            .map_err(|e| jni_err("Uri.parse->l", e))?;

        // new Intent(ACTION_VIEW, uri)
        let j_action: JString = env
            .new_string("android.intent.action.VIEW")
            .map_err(|e| jni_err("new_string(ACTION_VIEW)", e))?;
        let intent: JObject = env
            .new_object(
                "android/content/Intent",
                "(Ljava/lang/String;Landroid/net/Uri;)V",
                &[JValue::Object(&j_action), JValue::Object(&uri)],
            )
            .map_err(|e| jni_err("new Intent", e))?;

        // Needed when the context is not an Activity.
        env.call_method(
            &intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(FLAG_ACTIVITY_NEW_TASK)],
        )
        .map_err(|e| jni_err("addFlags", e))?;

        env.call_method(
            &context,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[JValue::Object(&intent)],
        )
        .map_err(|e| jni_err("startActivity(view)", e))?;

        tracing::info!(host = url.host_str().unwrap_or_default(), "Android: view intent dispatched");
        Ok(())
    }
}
