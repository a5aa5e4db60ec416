// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop/CI external browser: hands the URL to the system opener.

use std::process::{Command, Stdio};

use url::Url;

use supabridge_core::error::{Result, SupabridgeError};

use crate::traits::ExternalBrowser;

/// Opens URLs with `open` (macOS), `cmd /C start` (Windows) or `xdg-open`.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl SystemBrowser {
    fn command(url: &Url) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url.as_str());
            cmd
        }
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            // The empty string is the window title `start` expects first.
            cmd.args(["/C", "start", ""]).arg(url.as_str());
            cmd
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url.as_str());
            cmd
        }
    }
}

impl ExternalBrowser for SystemBrowser {
    fn open_url(&self, url: &Url) -> Result<()> {
        let mut cmd = Self::command(url);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let program = cmd.get_program().to_string_lossy().into_owned();
        cmd.spawn()
            .map_err(|e| SupabridgeError::Browser(format!("{program}: {e}")))?;
        tracing::info!(%program, host = url.host_str().unwrap_or_default(), "opened external URL");
        Ok(())
    }
}
