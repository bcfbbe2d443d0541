//! Shared helpers for integration tests

#![allow(dead_code)]

use snow_feedback::{
    Error, Result,
    session::{Authenticator, CredentialRecord, CredentialStore, LoginOutcome},
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// What a scripted authentication attempt should produce
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Produce these credentials
    Success(CredentialRecord),
    /// Report a blocked headless attempt
    Blocked,
    /// Fail without producing credentials
    Fail,
}

/// Deterministic [`Authenticator`] double.
///
/// Pops one scripted outcome per attempt, per mode; an exhausted script
/// fails. Counts invocations so tests can assert how often each mode ran.
#[derive(Debug, Default)]
pub struct ScriptedAuthenticator {
    headless: Mutex<VecDeque<Scripted>>,
    interactive: Mutex<VecDeque<Scripted>>,
    pub headless_calls: AtomicUsize,
    pub interactive_calls: AtomicUsize,
}

impl ScriptedAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_headless(self, outcome: Scripted) -> Self {
        self.headless.lock().unwrap().push_back(outcome);
        self
    }

    pub fn script_interactive(self, outcome: Scripted) -> Self {
        self.interactive.lock().unwrap().push_back(outcome);
        self
    }

    fn resolve(&self, queue: &Mutex<VecDeque<Scripted>>) -> Result<LoginOutcome> {
        match queue.lock().unwrap().pop_front() {
            Some(Scripted::Success(record)) => Ok(LoginOutcome::success(record)),
            Some(Scripted::Blocked) => Ok(LoginOutcome::blocked()),
            Some(Scripted::Fail) | None => Err(Error::browser("scripted failure")),
        }
    }
}

#[async_trait::async_trait]
impl Authenticator for ScriptedAuthenticator {
    async fn authenticate(&self, headless: bool) -> Result<LoginOutcome> {
        if headless {
            self.headless_calls.fetch_add(1, Ordering::SeqCst);
            self.resolve(&self.headless)
        } else {
            self.interactive_calls.fetch_add(1, Ordering::SeqCst);
            self.resolve(&self.interactive)
        }
    }
}

/// A usable record with a single session cookie (keeps the Cookie header
/// deterministic for matching)
pub fn record_with(token: &str, session_cookie: &str) -> CredentialRecord {
    let mut cookies = HashMap::new();
    cookies.insert("JSESSIONID".to_string(), session_cookie.to_string());
    CredentialRecord::new(cookies, token)
}

/// A credential store over a fresh file inside `dir`
pub fn store_in(dir: &TempDir) -> CredentialStore {
    CredentialStore::new(dir.path().join("session.json"))
}
