//! Session management with automatic credential refresh
//!
//! [`SessionManagerGeneric`] wraps outbound HTTP calls to the ServiceNow
//! instance, attaching the held session cookies and `X-UserToken` header,
//! and transparently recovers from session expiration:
//!
//! 1. a `401 Unauthorized` response triggers the refresh protocol;
//! 2. refresh asks the [`Authenticator`] for fresh credentials (headless
//!    first when enabled, then one interactive attempt per process);
//! 3. refreshed credentials are persisted and the original call is retried
//!    exactly once.
//!
//! A 401 on the retry is never retried again. Every other status is
//! returned to the caller unmodified; the manager does not interpret
//! business-level errors.
//!
//! `request` can block for a human-scale duration (minutes) when an
//! interactive login with MFA is required. Do not call it on a
//! latency-sensitive path. Refreshes within one manager are serialized by
//! an internal gate; locking the credential cache file across processes is
//! out of scope, so two racing processes can clobber each other's cache
//! write.

use crate::{
    Result,
    config::Settings,
    error::AuthFailure,
    session::browser::{Authenticator, BrowserLogin},
    session::credentials::{CredentialRecord, CredentialStore},
    types::RequestOptions,
};
use reqwest::{
    Client, Method, Response, StatusCode,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Header carrying the session token
pub const USER_TOKEN_HEADER: &str = "X-UserToken";

/// Convenience type alias for SessionManagerGeneric with the production
/// browser login adapter
pub type SessionManager = SessionManagerGeneric<BrowserLogin>;

/// Session manager wrapping authenticated calls to the instance
#[derive(Debug)]
pub struct SessionManagerGeneric<A: Authenticator = BrowserLogin> {
    /// Configuration settings
    settings: Arc<Settings>,
    /// HTTP client for requests
    http: Client,
    /// Store the held record was loaded from and refreshes are persisted to
    store: CredentialStore,
    /// Currently held credential record, owned exclusively by this manager
    credentials: RwLock<CredentialRecord>,
    /// True once an interactive login was attempted in this process.
    /// Transitions false to true exactly once and never resets, so a run
    /// never opens more than one browser.
    mfa_attempted: AtomicBool,
    /// Serializes the refresh protocol
    refresh_gate: Mutex<()>,
    /// Source of fresh credentials
    authenticator: A,
}

impl SessionManagerGeneric<BrowserLogin> {
    /// Create a session manager with the production browser login adapter.
    ///
    /// Loads the initial credential record from `store` (environment
    /// variables win over the cache file).
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use snow_feedback::{config::Settings, session::{CredentialStore, SessionManager}};
    ///
    /// # tokio_test::block_on(async {
    /// let settings = Settings::default();
    /// let store = CredentialStore::at_default_path()?;
    /// let manager = SessionManager::new(settings, store).await;
    /// # Ok::<(), snow_feedback::Error>(())
    /// # });
    /// ```
    pub async fn new(settings: Settings, store: CredentialStore) -> Self {
        let authenticator = BrowserLogin::from_settings(&settings);
        Self::with_authenticator(settings, store, authenticator).await
    }
}

impl<A> SessionManagerGeneric<A>
where
    A: Authenticator + std::fmt::Debug,
{
    /// Create a session manager with a custom authenticator.
    ///
    /// This is the seam for substituting a deterministic double for the
    /// browser flow; the manager never references a concrete browser
    /// implementation beyond this value.
    pub async fn with_authenticator(settings: Settings, store: CredentialStore, authenticator: A) -> Self {
        let http = Client::builder()
            .user_agent(&settings.network.user_agent)
            .connect_timeout(Duration::from_secs(settings.network.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.network.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        let credentials = store.load().await;
        if credentials.is_usable() {
            debug!(
                "Holding credentials captured {} minutes ago",
                credentials.age().num_minutes()
            );
        } else {
            debug!("No usable credentials loaded; first request will authenticate");
        }

        Self {
            settings: Arc::new(settings),
            http,
            store,
            credentials: RwLock::new(credentials),
            mfa_attempted: AtomicBool::new(false),
            refresh_gate: Mutex::new(()),
            authenticator,
        }
    }

    /// Perform an authenticated request, refreshing credentials on 401.
    ///
    /// The sole entry point. May block for minutes when an interactive
    /// login is required.
    ///
    /// # Errors
    ///
    /// - [`AuthFailure::NoCredentials`] when no usable record exists and
    ///   refresh could not produce one (no network call is attempted);
    /// - [`AuthFailure::RefreshFailed`] when a 401 occurred and refresh
    ///   could not obtain new credentials;
    /// - [`AuthFailure::StillUnauthorized`] when the retry after a
    ///   successful refresh was rejected again;
    /// - [`crate::Error::Http`] for transport failures, unchanged.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        if !self.credentials.read().await.is_usable() {
            warn!("No credentials found - triggering authentication");
            if !self.refresh_credentials().await {
                return Err(AuthFailure::NoCredentials.into());
            }
        }

        let response = self.send(method.clone(), url, &options).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("Session expired (401 Unauthorized)");
        if !self.refresh_credentials().await {
            return Err(AuthFailure::RefreshFailed.into());
        }

        info!("Credentials refreshed, retrying original request");
        let retried = self.send(method, url, &options).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("Still 401 after refresh - credentials may be invalid");
            return Err(AuthFailure::StillUnauthorized.into());
        }
        Ok(retried)
    }

    /// Convenience method for GET requests
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, url, options).await
    }

    /// Convenience method for POST requests
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST, url, options).await
    }

    /// Convenience method for PUT requests
    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PUT, url, options).await
    }

    /// Convenience method for DELETE requests
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, url, options).await
    }

    /// Convenience method for PATCH requests
    pub async fn patch(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PATCH, url, options).await
    }

    /// Quick probe to check whether the held credentials are accepted.
    ///
    /// Issues a one-row `sys_user` query with a short timeout and reports
    /// whether it returned 200. Never triggers a refresh.
    pub async fn verify_credentials(&self) -> bool {
        if !self.credentials.read().await.is_usable() {
            return false;
        }

        let url = self.settings.instance.table_api_url("sys_user");
        let options = RequestOptions::new()
            .with_query("sysparm_limit", "1")
            .with_timeout(Duration::from_secs(self.settings.network.probe_timeout_secs));

        match self.send(Method::GET, &url, &options).await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("Credential probe failed: {}", e);
                false
            }
        }
    }

    /// Snapshot of the currently held credential record
    pub async fn credentials(&self) -> CredentialRecord {
        self.credentials.read().await.clone()
    }

    /// Whether an interactive login was already attempted in this process
    pub fn has_interactive_attempt(&self) -> bool {
        self.mfa_attempted.load(Ordering::SeqCst)
    }

    /// The settings this manager was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The credential store backing this manager
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Run the refresh protocol. Returns true when usable credentials were
    /// installed.
    ///
    /// Headless is attempted only when enabled in settings; a blocked or
    /// failed headless attempt falls back to one interactive attempt per
    /// process lifetime. On failure the held credentials are left
    /// untouched.
    async fn refresh_credentials(&self) -> bool {
        let _gate = self.refresh_gate.lock().await;
        info!("Attempting automatic credential refresh");

        if self.settings.browser.headless_refresh {
            match self.authenticator.authenticate(true).await {
                Ok(outcome) => {
                    if let Some(record) = outcome.record {
                        if record.is_usable() {
                            self.install(record).await;
                            return true;
                        }
                        warn!("Headless refresh produced unusable credentials");
                    } else if outcome.blocked_by_mfa {
                        info!("MFA detected - cannot complete authentication in headless mode");
                    }
                }
                Err(e) => warn!("Headless refresh failed: {}", e),
            }
        }

        // Mark before launching, win or lose: one browser per process.
        if self.mfa_attempted.swap(true, Ordering::SeqCst) {
            warn!(
                "Interactive authentication already attempted in this run; \
                 refusing to open another browser"
            );
            return false;
        }

        match self.authenticator.authenticate(false).await {
            Ok(outcome) => match outcome.record {
                Some(record) if record.is_usable() => {
                    self.install(record).await;
                    true
                }
                _ => {
                    warn!("Interactive authentication did not produce usable credentials");
                    false
                }
            },
            Err(e) => {
                warn!("Interactive authentication failed: {}", e);
                false
            }
        }
    }

    /// Replace the held record and persist it. Persist failures are logged
    /// and non-fatal; the manager keeps operating in memory.
    async fn install(&self, record: CredentialRecord) {
        if let Err(e) = self.store.save(&record).await {
            warn!("Failed to save credentials: {}", e);
        }
        *self.credentials.write().await = record;
    }

    /// Build and send one transport call with the held credentials merged
    /// in. Fixed headers and session cookies are defaults; caller-supplied
    /// values win where both are set.
    async fn send(&self, method: Method, url: &str, options: &RequestOptions) -> Result<Response> {
        let credentials = self.credentials.read().await.clone();

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        if let Some(token) = credentials.token.as_deref().filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(token) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static("x-usertoken"), value);
                }
                Err(e) => warn!("Token is not a valid header value, sending without it: {}", e),
            }
        }

        let mut cookie_map = credentials.cookies.clone();
        for (name, value) in &options.cookies {
            cookie_map.insert(name.clone(), value.clone());
        }
        if !cookie_map.is_empty() {
            let line = cookie_map
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            match HeaderValue::from_str(&line) {
                Ok(value) => {
                    headers.insert(header::COOKIE, value);
                }
                Err(e) => warn!("Cookie set is not a valid header value: {}", e),
            }
        }

        for (name, value) in &options.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(parsed_name), Ok(parsed_value)) => {
                    headers.insert(parsed_name, parsed_value);
                }
                _ => warn!("Skipping invalid header '{}'", name),
            }
        }

        let mut request = self.http.request(method, url).headers(headers);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.json {
            request = request.json(body);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        Ok(request.send().await?)
    }
}
