//! snow-feedback - ServiceNow skill-feedback submitter
//!
//! Submits feedback records to a ServiceNow instance through a session
//! manager that transparently recovers from session expiration.
//!
//! # Architecture
//!
//! - [`session::CredentialStore`] resolves a credential record from
//!   environment variables or a per-user cache file;
//! - [`session::SessionManagerGeneric`] wraps HTTP calls with the session
//!   cookies and `X-UserToken` header, detects expiry from `401` responses,
//!   drives the refresh protocol and retries the original call once;
//! - [`session::Authenticator`] is the contract of the out-of-band browser
//!   login flow (an external collaborator; this crate never drives a
//!   browser itself);
//! - [`feedback`] formats and submits the feedback payload - the one
//!   shipped caller of the session manager.
//!
//! # Usage
//!
//! ```bash
//! snow-feedback --feedback-type bug --message "Dashboard lookup failed" \
//!     --skill-name create-sbo-request
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use snow_feedback::{
//!     config::Settings,
//!     feedback::{self, FeedbackRequest, FeedbackType},
//!     session::{CredentialStore, SessionManager},
//! };
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let store = CredentialStore::at_default_path()?;
//! let manager = SessionManager::new(settings, store).await;
//!
//! let request = FeedbackRequest::new(FeedbackType::Bug, "Dashboard lookup failed")
//!     .with_skill_name("create-sbo-request");
//! let receipt = feedback::submit(&manager, &request).await?;
//! println!("Created {}", receipt.number);
//! # Ok::<(), snow_feedback::Error>(())
//! # });
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod session;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{AuthFailure, Error, Result};
pub use session::{
    Authenticator, CredentialRecord, CredentialStore, SessionManager, SessionManagerGeneric,
};
pub use types::{FeedbackReceipt, RequestOptions};
