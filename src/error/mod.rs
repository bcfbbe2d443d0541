//! Error handling for the feedback submitter
//!
//! This module defines error types and handling patterns used throughout the application.

pub mod types;

pub use types::{AuthFailure, Error, Result};
