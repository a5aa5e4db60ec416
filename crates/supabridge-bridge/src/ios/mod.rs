// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS external browser via objc2.
//
// OAuth sign-in leaves the app: the authorize URL is handed to
// `-[UIApplication openURL:options:completionHandler:]`, which opens Safari
// (or the provider's app for universal links). UIKit is main-thread only,
// while bridge calls are polled on whatever thread runs the executor, so an
// off-main call queues the open on the main dispatch queue and returns.

#![cfg(target_os = "ios")]

use dispatch2::DispatchQueue;
use objc2::MainThreadMarker;
use objc2::rc::Retained;
use objc2_foundation::{NSDictionary, NSString, NSURL};
use objc2_ui_kit::UIApplication;
use url::Url;

use supabridge_core::error::{Result, SupabridgeError};

use crate::traits::ExternalBrowser;

/// Opens URLs through `UIApplication`.
#[derive(Debug, Default)]
pub struct IosBrowser;

impl IosBrowser {
    pub fn new() -> Self {
        Self
    }
}

fn ns_url(raw: &str) -> Result<Retained<NSURL>> {
    let ns_string = NSString::from_str(raw);
    NSURL::URLWithString(&ns_string)
        .ok_or_else(|| SupabridgeError::Browser(format!("NSURL rejected {raw}")))
}

fn open_on_main(mtm: MainThreadMarker, url: &NSURL) {
    let app = UIApplication::sharedApplication(mtm);
    let options = NSDictionary::new();
    // SAFETY: `mtm` proves we are on the main thread; the options
    // dictionary is empty and no completion handler is registered.
    unsafe {
        app.openURL_options_completionHandler(url, &options, None);
    }
}

impl ExternalBrowser for IosBrowser {
    fn open_url(&self, url: &Url) -> Result<()> {
        // Validated here so a malformed URL still fails the call.
        let ns = ns_url(url.as_str())?;
        let host = url.host_str().unwrap_or_default().to_owned();

        match MainThreadMarker::new() {
            Some(mtm) => {
                tracing::info!(%host, "iOS: opening external URL");
                open_on_main(mtm, &ns);
            }
            None => {
                // NSURL is not Send; the main queue rebuilds it from the string.
                let raw = url.as_str().to_owned();
                DispatchQueue::main().exec_async(move || {
                    let Some(mtm) = MainThreadMarker::new() else {
                        tracing::error!("iOS: main queue block ran off the main thread");
                        return;
                    };
                    match ns_url(&raw) {
                        Ok(ns) => open_on_main(mtm, &ns),
                        Err(e) => tracing::warn!(error = %e, "iOS: could not open URL"),
                    }
                });
                tracing::info!(%host, "iOS: external URL queued on main thread");
            }
        }
        Ok(())
    }
}
