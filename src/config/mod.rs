//! Configuration management for the feedback submitter
//!
//! This module handles loading and managing configuration settings for the
//! session manager and the CLI.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::Settings;
