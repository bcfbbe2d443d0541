//! Check mode CLI logic
//!
//! Reports whether credentials are present and still accepted by the
//! instance, without triggering any refresh.

use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::{
    cli::{credential_store_from, init_logging},
    config::ConfigLoader,
    session::SessionManager,
};

/// Arguments for check mode
#[derive(Debug)]
pub struct CheckArgs {
    pub config: Option<String>,
    pub verbose: bool,
}

/// Run check mode with the given arguments
pub async fn run_check_mode(args: CheckArgs) -> Result<()> {
    init_logging(args.verbose);

    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .or_else(ConfigLoader::get_config_path);
    let settings = ConfigLoader::new().load(config_path.as_deref())?;

    let store = credential_store_from(&settings)?;
    let manager = SessionManager::new(settings, store).await;

    let record = manager.credentials().await;
    println!("Current credentials:");
    println!(
        "  X-UserToken: {}",
        if record.token.as_deref().is_some_and(|t| !t.is_empty()) {
            "found"
        } else {
            "not found"
        }
    );
    println!("  Cookies: {} found", record.cookies.len());

    if !record.is_usable() {
        bail!("no usable credentials; run `snow-feedback login` first");
    }

    println!();
    println!("Testing credentials against the instance...");
    if manager.verify_credentials().await {
        println!("Credentials are valid");
        Ok(())
    } else {
        bail!("credentials are invalid or expired; run `snow-feedback login`");
    }
}
