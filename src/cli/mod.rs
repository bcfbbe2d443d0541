//! Command-line interface modules
//!
//! The binary has three modes: the default submit mode and the `login` and
//! `check` subcommands.

pub mod check;
pub mod login;
pub mod submit;

use crate::{Result, config::Settings, session::CredentialStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr, keeping stdout clean for command output
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the credential store named by the settings, else at the default
/// per-user path
pub fn credential_store_from(settings: &Settings) -> Result<CredentialStore> {
    match &settings.cache.credentials_file {
        Some(path) => Ok(CredentialStore::new(path.clone())),
        None => CredentialStore::at_default_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_store_uses_configured_path() {
        let mut settings = Settings::default();
        settings.cache.credentials_file = Some(PathBuf::from("/tmp/custom_session.json"));
        let store = credential_store_from(&settings).unwrap();
        assert_eq!(store.path(), PathBuf::from("/tmp/custom_session.json"));
    }

    #[test]
    fn test_store_falls_back_to_default_path() {
        let store = credential_store_from(&Settings::default()).unwrap();
        assert!(
            store
                .path()
                .to_string_lossy()
                .ends_with(".servicenow_surf_session.json")
        );
    }
}
