//! Browser authentication contract
//!
//! The session manager never drives a browser itself. It talks to an
//! [`Authenticator`]: one operation that attempts to produce fresh
//! credentials, optionally invisibly, and reports whether a multi-factor
//! challenge blocked it. The production implementation, [`BrowserLogin`],
//! delegates to an operator-configured external login helper; deterministic
//! doubles substitute for it in tests.

use crate::{Error, Result, config::Settings, session::credentials::CredentialRecord};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Exit code by which the login helper signals a multi-factor challenge
/// blocked a headless attempt
pub const MFA_BLOCKED_EXIT_CODE: i32 = 3;

/// Outcome of one authentication attempt
#[derive(Debug, Clone, Default)]
pub struct LoginOutcome {
    /// Fresh credentials, when the attempt succeeded
    pub record: Option<CredentialRecord>,
    /// True when a headless attempt aborted on a multi-factor challenge
    pub blocked_by_mfa: bool,
}

impl LoginOutcome {
    /// Attempt succeeded with the given record
    pub fn success(record: CredentialRecord) -> Self {
        Self {
            record: Some(record),
            blocked_by_mfa: false,
        }
    }

    /// Attempt aborted because a multi-factor challenge requires a visible
    /// browser
    pub fn blocked() -> Self {
        Self {
            record: None,
            blocked_by_mfa: true,
        }
    }

    /// Attempt produced no credentials
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Browser engine used by the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome (driver auto-managed by the helper)
    #[default]
    Chrome,
    /// Safari (requires remote automation to be enabled)
    Safari,
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserKind::Chrome => write!(f, "chrome"),
            BrowserKind::Safari => write!(f, "safari"),
        }
    }
}

/// A source of fresh session credentials.
///
/// `headless = true` must detect multi-factor challenge pages and abort
/// promptly, reporting [`LoginOutcome::blocked`], rather than hanging until
/// a timeout. `headless = false` opens a visible flow and may block for a
/// human-scale duration while the user completes login and MFA.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Attempt to produce fresh credentials
    async fn authenticate(&self, headless: bool) -> Result<LoginOutcome>;
}

#[async_trait::async_trait]
impl<A: Authenticator + ?Sized> Authenticator for std::sync::Arc<A> {
    async fn authenticate(&self, headless: bool) -> Result<LoginOutcome> {
        (**self).authenticate(headless).await
    }
}

/// Production authenticator: runs the configured external login helper.
///
/// The helper owns the actual browser automation. It is invoked with
/// `--browser <engine> --timeout <secs>` plus `--headless` when requested,
/// and prints a credential JSON object (the cache-file layout) on stdout.
/// Exit code [`MFA_BLOCKED_EXIT_CODE`] reports a blocked headless attempt.
#[derive(Debug, Clone)]
pub struct BrowserLogin {
    /// Helper program and leading arguments; `None` means no helper is
    /// available and every attempt fails with guidance
    command: Option<Vec<String>>,
    /// Browser engine passed through to the helper
    browser: BrowserKind,
    /// Bound on a headless attempt
    headless_timeout: Duration,
    /// Bound on an interactive attempt, sized for manual MFA completion
    interactive_timeout: Duration,
}

impl BrowserLogin {
    /// Create a login adapter from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            command: settings.browser.login_command.clone(),
            browser: settings.browser.kind,
            headless_timeout: Duration::from_secs(settings.browser.headless_timeout_secs),
            interactive_timeout: Duration::from_secs(settings.browser.interactive_timeout_secs),
        }
    }

    /// Create a login adapter with an explicit helper command
    pub fn with_command(
        command: Vec<String>,
        browser: BrowserKind,
        headless_timeout: Duration,
        interactive_timeout: Duration,
    ) -> Self {
        Self {
            command: Some(command),
            browser,
            headless_timeout,
            interactive_timeout,
        }
    }

    async fn run_helper(&self, headless: bool) -> Result<LoginOutcome> {
        let command = self.command.as_ref().ok_or_else(|| {
            Error::browser(
                "no login helper configured; authenticate manually and run \
                 `snow-feedback login --import <file>`",
            )
        })?;
        let (program, leading) = command
            .split_first()
            .ok_or_else(|| Error::browser("login helper command is empty"))?;

        let deadline = if headless {
            self.headless_timeout
        } else {
            self.interactive_timeout
        };

        let mut cmd = Command::new(program);
        cmd.args(leading)
            .arg("--browser")
            .arg(self.browser.to_string())
            .arg("--timeout")
            .arg(deadline.as_secs().to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if headless {
            cmd.arg("--headless");
        }

        debug!(
            "Running login helper {:?} (headless: {}, timeout: {}s)",
            program,
            headless,
            deadline.as_secs()
        );

        let child = cmd
            .spawn()
            .map_err(|e| Error::browser(format!("failed to launch login helper: {}", e)))?;

        let output = tokio::time::timeout(deadline, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::browser(format!(
                    "login helper timed out after {} seconds",
                    deadline.as_secs()
                ))
            })?
            .map_err(|e| Error::browser(format!("login helper failed to run: {}", e)))?;

        if output.status.code() == Some(MFA_BLOCKED_EXIT_CODE) {
            info!("Login helper reports an MFA challenge blocked the headless attempt");
            return Ok(LoginOutcome::blocked());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::browser(format!(
                "login helper exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let record = CredentialRecord::from_json_str(stdout.trim()).map_err(|e| {
            Error::browser(format!("login helper produced unparseable credentials: {}", e))
        })?;

        if !record.is_usable() {
            warn!("Login helper completed but its credentials are not usable");
        }
        Ok(LoginOutcome::success(record))
    }
}

#[async_trait::async_trait]
impl Authenticator for BrowserLogin {
    async fn authenticate(&self, headless: bool) -> Result<LoginOutcome> {
        if !headless {
            info!("Opening browser for authentication; complete login and MFA when prompted");
        }
        self.run_helper(headless).await
    }
}
