// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supabridge: bridge surface and platform plugins.
//
// The shell talks to a `SupabasePlugin`. Native targets get a
// `NativePlugin` driving the HTTP binding, with an external browser for
// OAuth supplied per platform (JNI intent on Android, UIApplication on iOS,
// the system opener on desktop). The wasm32 build gets the `WebPlugin`
// stub.

mod auth;
mod data;
pub mod desktop;
pub mod holder;
pub mod marshal;
pub mod native;
pub mod relay;
pub mod surface;
pub mod traits;
pub mod web;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

use std::sync::Arc;

use supabridge_core::config::BridgeSettings;

pub use native::{HttpPlugin, NativePlugin};
pub use relay::{AuthStateListener, ListenerId};
pub use surface::dispatch;
pub use traits::{
    AUTH_STATE_CHANGE, BridgeObject, CallResult, ExternalBrowser, Rejection, SupabasePlugin,
};
pub use web::WebPlugin;

/// The external browser for the target operating system.
pub fn platform_browser() -> Arc<dyn ExternalBrowser> {
    #[cfg(target_os = "ios")]
    {
        Arc::new(ios::IosBrowser::new())
    }
    #[cfg(target_os = "android")]
    {
        Arc::new(android::AndroidBrowser::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Arc::new(desktop::SystemBrowser)
    }
}

/// The plugin implementation for the target.
pub fn platform_plugin(settings: BridgeSettings) -> Box<dyn SupabasePlugin> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = settings;
        Box::new(WebPlugin::new())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(HttpPlugin::http(settings, platform_browser()))
    }
}
