//! Type definitions for the feedback submitter
//!
//! This module contains the main data structures used for requests and responses.

pub mod request;
pub mod response;

pub use request::RequestOptions;
pub use response::{FeedbackReceipt, TableInsertResponse, TableRecord};
