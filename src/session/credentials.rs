//! Credential records and their persistent store
//!
//! Resolves a [`CredentialRecord`] from the environment, else from a JSON
//! cache file at a per-user path, else produces an empty record. The store
//! is an explicit value over an explicit path; nothing here keeps global
//! state.
//!
//! Freshness is never judged here. Whether credentials are still accepted
//! is decided by the remote service (a 401 on the wire), not by a local
//! timestamp threshold; [`CredentialRecord::age`] exists for diagnostics
//! only.

use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Environment variable holding the `X-UserToken` value
pub const ENV_USER_TOKEN: &str = "SNOW_X_USER_TOKEN";
/// Environment variable holding the route cookie value
pub const ENV_ROUTE_COOKIE: &str = "SNOW_COOKIE_GLIDE";
/// Environment variable holding the session cookie value
pub const ENV_SESSION_COOKIE: &str = "SNOW_COOKIE_SESSION";

/// Cookie name carrying the server-side session
pub const SESSION_COOKIE: &str = "JSESSIONID";
/// Cookie name carrying the instance routing affinity
pub const ROUTE_COOKIE: &str = "glide_user_route";

/// File name of the credential cache in the user's home directory
const CACHE_FILE_NAME: &str = ".servicenow_surf_session.json";

/// A captured authentication session: cookie set, user token, capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Cookie name to value mapping sent with every request
    pub cookies: HashMap<String, String>,
    /// Opaque session token carried in the `X-UserToken` header
    pub token: Option<String>,
    /// When these credentials were captured
    pub captured_at: DateTime<Utc>,
}

/// Serializable wire form of a credential record.
///
/// Matches the cache file layout: the route and session cookies are written
/// out as convenience duplicates alongside the full cookie map, and ignored
/// on load (the map is authoritative).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    cookies: HashMap<String, String>,
    #[serde(default)]
    x_user_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    glide_user_route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jsessionid: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl CredentialRecord {
    /// Create a record from a cookie map and token, stamped now
    pub fn new(cookies: HashMap<String, String>, token: impl Into<String>) -> Self {
        Self {
            cookies,
            token: Some(token.into()),
            captured_at: Utc::now(),
        }
    }

    /// Create an empty, unusable record
    pub fn empty() -> Self {
        Self {
            cookies: HashMap::new(),
            token: None,
            captured_at: Utc::now(),
        }
    }

    /// Whether this record can authenticate a request.
    ///
    /// Usable means a non-empty token and a non-empty cookie set. This is
    /// re-evaluated on every request; it is never cached as a flag.
    pub fn is_usable(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty()) && !self.cookies.is_empty()
    }

    /// Whether both cookies the instance expects are present
    pub fn has_expected_cookies(&self) -> bool {
        self.cookies.contains_key(SESSION_COOKIE) && self.cookies.contains_key(ROUTE_COOKIE)
    }

    /// Elapsed time since capture. Diagnostics only; no refresh decision
    /// is ever based on this.
    pub fn age(&self) -> Duration {
        Utc::now() - self.captured_at
    }

    /// Parse a record from its JSON wire form
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CredentialFile = serde_json::from_str(content)?;
        let captured_at = match file.timestamp.as_deref() {
            Some(ts) => match DateTime::parse_from_rfc3339(ts) {
                Ok(parsed) => parsed.with_timezone(&Utc),
                Err(e) => {
                    warn!("Ignoring unparseable credential timestamp '{}': {}", ts, e);
                    Utc::now()
                }
            },
            None => Utc::now(),
        };
        Ok(Self {
            cookies: file.cookies,
            token: file.x_user_token,
            captured_at,
        })
    }

    /// Serialize this record to its JSON wire form
    pub fn to_json_string(&self) -> Result<String> {
        let file = CredentialFile {
            cookies: self.cookies.clone(),
            x_user_token: self.token.clone(),
            glide_user_route: self.cookies.get(ROUTE_COOKIE).cloned(),
            jsessionid: self.cookies.get(SESSION_COOKIE).cloned(),
            timestamp: Some(self.captured_at.to_rfc3339()),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

/// Persistent store for a single credential record.
///
/// The path is fixed at construction; `load` and `save` are the only
/// operations. File problems are never fatal: the manager can always fall
/// back to an in-memory record and a fresh login.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    /// Path of the cache file
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store over an explicit cache file path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a store at the default per-user path
    /// (`~/.servicenow_surf_session.json`)
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(default_credentials_path()?))
    }

    /// The cache file path this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a credential record.
    ///
    /// Priority 1 is the environment: when [`ENV_USER_TOKEN`],
    /// [`ENV_ROUTE_COOKIE`] and [`ENV_SESSION_COOKIE`] are all set, the
    /// record is built from them and the cache file is skipped entirely.
    /// Priority 2 is the cache file; a parse failure is logged and falls
    /// through. With neither source, an empty record is returned.
    pub async fn load(&self) -> CredentialRecord {
        if let Some(record) = record_from_env() {
            debug!("Using credentials from environment variables");
            return record;
        }

        if !self.path.exists() {
            debug!("Credential cache does not exist: {:?}", self.path);
            return CredentialRecord::empty();
        }

        match fs::read_to_string(&self.path).await {
            Ok(content) => match CredentialRecord::from_json_str(&content) {
                Ok(record) => {
                    debug!(
                        "Loaded cached credentials from {:?} (captured {} minutes ago)",
                        self.path,
                        record.age().num_minutes()
                    );
                    record
                }
                Err(e) => {
                    warn!("Failed to parse cached credentials: {}", e);
                    CredentialRecord::empty()
                }
            },
            Err(e) => {
                warn!("Failed to read credential cache {:?}: {}", self.path, e);
                CredentialRecord::empty()
            }
        }
    }

    /// Persist a record to the cache file, overwriting any existing one.
    ///
    /// Errors are returned so callers can decide; the session manager logs
    /// them and keeps operating on its in-memory record.
    pub async fn save(&self, record: &CredentialRecord) -> Result<()> {
        let content = record.to_json_string()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = fs::create_dir_all(parent).await
        {
            return Err(Error::cache(
                "directory_creation",
                &format!("Could not create {:?}: {}", parent, e),
            ));
        }

        fs::write(&self.path, content).await.map_err(|e| {
            Error::cache("file_write", &format!("Write to {:?} failed: {}", self.path, e))
        })?;
        debug!("Credentials saved to {:?}", self.path);
        Ok(())
    }
}

/// Build a record from the three environment variables, if all are present
fn record_from_env() -> Option<CredentialRecord> {
    let token = std::env::var(ENV_USER_TOKEN).ok().filter(|v| !v.is_empty())?;
    let route = std::env::var(ENV_ROUTE_COOKIE).ok().filter(|v| !v.is_empty())?;
    let session = std::env::var(ENV_SESSION_COOKIE)
        .ok()
        .filter(|v| !v.is_empty())?;

    let mut cookies = HashMap::new();
    cookies.insert(ROUTE_COOKIE.to_string(), route);
    cookies.insert(SESSION_COOKIE.to_string(), session);
    Some(CredentialRecord::new(cookies, token))
}

/// Default credential cache path in the user's home directory
pub fn default_credentials_path() -> Result<PathBuf> {
    match dirs::home_dir() {
        Some(home) => Ok(home.join(CACHE_FILE_NAME)),
        None => {
            warn!("Could not determine home directory, using current directory for credentials");
            Ok(std::env::current_dir()?.join(CACHE_FILE_NAME))
        }
    }
}
