//! Login mode CLI logic
//!
//! Obtains session credentials out of band and saves them to the cache
//! file: either by running the configured external login helper, or by
//! importing a credential JSON the helper (or a manual extraction) wrote
//! elsewhere.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{
    cli::{credential_store_from, init_logging},
    config::ConfigLoader,
    session::{
        Authenticator, BrowserKind, BrowserLogin, CredentialRecord, CredentialStore,
        credentials::{ENV_ROUTE_COOKIE, ENV_SESSION_COOKIE, ENV_USER_TOKEN, ROUTE_COOKIE, SESSION_COOKIE},
    },
};

/// Arguments for login mode
#[derive(Debug)]
pub struct LoginArgs {
    pub headless: bool,
    pub browser: Option<BrowserKind>,
    pub import: Option<PathBuf>,
    pub print_env: bool,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Run login mode with the given arguments
pub async fn run_login_mode(args: LoginArgs) -> Result<()> {
    init_logging(args.verbose);

    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .or_else(ConfigLoader::get_config_path);
    let mut settings = ConfigLoader::new().load(config_path.as_deref())?;
    if let Some(browser) = args.browser {
        settings.browser.kind = browser;
    }

    let store = credential_store_from(&settings)?;

    let record = match &args.import {
        Some(path) => import_record(path).await?,
        None => {
            let login = BrowserLogin::from_settings(&settings);
            let outcome = login.authenticate(args.headless).await?;
            if outcome.blocked_by_mfa {
                bail!(
                    "an MFA challenge blocked the headless attempt; \
                     re-run without --headless to complete it in a visible browser"
                );
            }
            outcome
                .record
                .context("login helper did not produce credentials")?
        }
    };

    if !record.is_usable() {
        bail!(
            "credentials are incomplete (token or cookies missing); \
             they would not authenticate API access"
        );
    }
    if !record.has_expected_cookies() {
        warn!(
            "Cookie set lacks {} or {}; the instance may reject it",
            SESSION_COOKIE, ROUTE_COOKIE
        );
    }

    store.save(&record).await?;
    println!("Credentials saved to {}", store.path().display());

    if args.print_env {
        print_env_vars(&record);
    }

    println!();
    println!("Test your credentials with: snow-feedback check");
    Ok(())
}

/// Read a credential JSON from a file, or stdin when the path is `-`
async fn import_record(path: &Path) -> Result<CredentialRecord> {
    let content = if path == Path::new("-") {
        use tokio::io::AsyncReadExt;
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("failed to read credentials from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read credentials from {}", path.display()))?
    };
    CredentialRecord::from_json_str(&content).context("failed to parse credential JSON")
}

/// Print shell export lines for the environment-variable credential source
fn print_env_vars(record: &CredentialRecord) {
    let empty = String::new();
    let token = record.token.as_ref().unwrap_or(&empty);
    let route = record.cookies.get(ROUTE_COOKIE).unwrap_or(&empty);
    let session = record.cookies.get(SESSION_COOKIE).unwrap_or(&empty);

    println!();
    println!("To use the environment instead of the cache file, export:");
    println!();
    println!("export {}=\"{}\"", ENV_USER_TOKEN, token);
    println!("export {}=\"{}\"", ENV_ROUTE_COOKIE, route);
    println!("export {}=\"{}\"", ENV_SESSION_COOKIE, session);
}

/// Save a credential record without running a helper. Used by tests and by
/// callers embedding the login flow.
pub async fn save_imported(store: &CredentialStore, record: &CredentialRecord) -> Result<()> {
    store.save(record).await?;
    Ok(())
}
