//! Unified CLI for the ServiceNow skill-feedback submitter
//!
//! The default mode submits a feedback record; subcommands manage the
//! session credentials it needs.
//!
//! # Usage
//!
//! ## Submit Mode
//! ```bash
//! snow-feedback --feedback-type bug --message "Dashboard lookup failed" \
//!     --skill-name create-sbo-request
//! ```
//!
//! ## Credential Management
//! ```bash
//! snow-feedback login
//! snow-feedback login --import ~/.servicenow_surf_session.json
//! snow-feedback check
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use snow_feedback::cli::{
    check::{CheckArgs, run_check_mode},
    login::{LoginArgs, run_login_mode},
    submit::{SubmitArgs, run_submit_mode},
};
use snow_feedback::feedback::FeedbackType;
use snow_feedback::session::BrowserKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "snow-feedback")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // Submit mode options (when no subcommand is provided)
    /// Type of feedback
    #[arg(short = 't', long, value_enum, value_name = "TYPE")]
    feedback_type: Option<FeedbackType>,

    /// Feedback message
    #[arg(short, long, value_name = "MESSAGE")]
    message: Option<String>,

    /// Name of the skill being reported
    #[arg(short, long, value_name = "SKILL_NAME")]
    skill_name: Option<String>,

    /// Relevant conversation excerpt showing the issue
    #[arg(long, value_name = "CONTEXT")]
    conversation_context: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "CONFIG")]
    config: Option<String>,

    /// Print the submission receipt as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain and save session credentials
    Login {
        /// Attempt the login invisibly (aborts if MFA is required)
        #[arg(long)]
        headless: bool,

        /// Browser to use
        #[arg(short, long, value_enum)]
        browser: Option<BrowserKind>,

        /// Import a credential JSON from a file instead of running the
        /// login helper ("-" reads stdin)
        #[arg(long, value_name = "FILE")]
        import: Option<PathBuf>,

        /// Print export lines for the credential environment variables
        #[arg(long)]
        print_env: bool,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(long)]
        verbose: bool,
    },

    /// Check whether saved credentials are still accepted
    Check {
        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Login {
            headless,
            browser,
            import,
            print_env,
            config,
            verbose,
        }) => {
            let args = LoginArgs {
                headless,
                browser,
                import,
                print_env,
                config,
                verbose,
            };
            run_login_mode(args).await
        }
        Some(Commands::Check { config, verbose }) => {
            let args = CheckArgs { config, verbose };
            run_check_mode(args).await
        }
        None => {
            // Submit mode (default when no subcommand)
            let args = SubmitArgs {
                feedback_type: cli.feedback_type,
                message: cli.message,
                skill_name: cli.skill_name,
                conversation_context: cli.conversation_context,
                config: cli.config,
                json: cli.json,
                verbose: cli.verbose,
            };
            run_submit_mode(args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_submit_mode_parsing() {
        let cli = Cli::parse_from([
            "snow-feedback",
            "--feedback-type",
            "bug",
            "--message",
            "Dashboard lookup failed",
            "--skill-name",
            "create-sbo-request",
        ]);

        assert!(cli.command.is_none());
        assert_eq!(cli.feedback_type, Some(FeedbackType::Bug));
        assert_eq!(cli.message, Some("Dashboard lookup failed".to_string()));
        assert_eq!(cli.skill_name, Some("create-sbo-request".to_string()));
        assert!(!cli.json);
    }

    #[test]
    fn test_feedback_type_values() {
        for (value, expected) in [
            ("bug", FeedbackType::Bug),
            ("enhancement", FeedbackType::Enhancement),
            ("new-skill", FeedbackType::NewSkill),
        ] {
            let cli = Cli::parse_from(["snow-feedback", "-t", value, "-m", "msg"]);
            assert_eq!(cli.feedback_type, Some(expected));
        }
    }

    #[test]
    fn test_login_subcommand() {
        let cli = Cli::parse_from(["snow-feedback", "login", "--headless", "--browser", "safari"]);

        match cli.command {
            Some(Commands::Login {
                headless, browser, import, ..
            }) => {
                assert!(headless);
                assert_eq!(browser, Some(BrowserKind::Safari));
                assert_eq!(import, None);
            }
            _ => panic!("Expected login subcommand"),
        }
    }

    #[test]
    fn test_login_import_stdin() {
        let cli = Cli::parse_from(["snow-feedback", "login", "--import", "-"]);

        match cli.command {
            Some(Commands::Login { import, .. }) => {
                assert_eq!(import, Some(PathBuf::from("-")));
            }
            _ => panic!("Expected login subcommand"),
        }
    }

    #[test]
    fn test_check_subcommand_defaults() {
        let cli = Cli::parse_from(["snow-feedback", "check"]);

        match cli.command {
            Some(Commands::Check { config, verbose }) => {
                assert_eq!(config, None);
                assert!(!verbose);
            }
            _ => panic!("Expected check subcommand"),
        }
    }

    #[test]
    fn test_subcommand_rejects_submit_arguments() {
        // clap structure prevents submit flags under the check subcommand
        let result = Cli::try_parse_from(["snow-feedback", "check", "--message", "nope"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_default_values() {
        let cli = Cli::parse_from(["snow-feedback"]);

        assert!(cli.command.is_none());
        assert!(cli.feedback_type.is_none());
        assert!(cli.message.is_none());
        assert!(!cli.verbose);
    }
}
