//! Submit mode CLI logic
//!
//! Default mode of the binary: formats a feedback record and submits it
//! through the session manager, printing the created record number and a
//! deep link.

use anyhow::{Result, bail};
use std::path::PathBuf;
use tracing::debug;

use crate::{
    cli::{credential_store_from, init_logging},
    config::ConfigLoader,
    feedback::{self, FeedbackRequest, FeedbackType},
    session::SessionManager,
};

/// Arguments for submit mode
#[derive(Debug)]
pub struct SubmitArgs {
    pub feedback_type: Option<FeedbackType>,
    pub message: Option<String>,
    pub skill_name: Option<String>,
    pub conversation_context: Option<String>,
    pub config: Option<String>,
    pub json: bool,
    pub verbose: bool,
}

/// Run submit mode with the given arguments
pub async fn run_submit_mode(args: SubmitArgs) -> Result<()> {
    init_logging(args.verbose);

    let (Some(feedback_type), Some(message)) = (args.feedback_type, args.message.clone()) else {
        bail!("--feedback-type and --message are required (see --help)");
    };

    let config_path = args
        .config
        .as_ref()
        .map(PathBuf::from)
        .or_else(ConfigLoader::get_config_path);
    let settings = ConfigLoader::new().load(config_path.as_deref())?;

    let store = credential_store_from(&settings)?;
    debug!("Using credential cache at {:?}", store.path());
    let manager = SessionManager::new(settings, store).await;

    let mut request = FeedbackRequest::new(feedback_type, message);
    if let Some(skill_name) = args.skill_name {
        request = request.with_skill_name(skill_name);
    }
    if let Some(context) = args.conversation_context {
        request = request.with_conversation_context(context);
    }

    match feedback::submit(&manager, &request).await {
        Ok(receipt) => {
            if args.json {
                println!("{}", serde_json::to_string(&receipt)?);
            } else {
                println!("Feedback submitted successfully: {}", receipt.number);
                println!();
                println!("Link: {}", receipt.link);
            }
            Ok(())
        }
        Err(e) if e.is_authentication() => {
            eprintln!();
            eprintln!("Authentication error: {}", e);
            eprintln!();
            eprintln!("Manual authentication required:");
            eprintln!("  1. Run: snow-feedback login");
            eprintln!("  2. Complete the login and MFA prompts");
            eprintln!("  3. Re-run your original command");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
