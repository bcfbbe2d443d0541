//! Session and credential management
//!
//! This module holds the credential record and its persistent store, the
//! browser authentication contract, and the session manager that wraps
//! authenticated HTTP calls with automatic refresh on expiry.

pub mod browser;
pub mod credentials;
pub mod manager;

pub use browser::{Authenticator, BrowserKind, BrowserLogin, LoginOutcome};
pub use credentials::{CredentialRecord, CredentialStore};
pub use manager::{SessionManager, SessionManagerGeneric, USER_TOKEN_HEADER};
