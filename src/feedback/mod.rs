//! Feedback record construction and submission
//!
//! Formats a feedback payload for the skill-feedback table and submits it
//! through the session manager. Everything here is plain templating; all
//! authentication and retry behavior lives in
//! [`crate::session::SessionManagerGeneric`].

use crate::{
    Error, Result,
    session::{Authenticator, SessionManagerGeneric},
    types::{FeedbackReceipt, RequestOptions, TableInsertResponse},
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::info;

/// Default assignee for new feedback records (skill maintainer)
const DEFAULT_ASSIGNEE: &str = "David Rider";

/// Signature line appended to every description
const SIGNATURE: &str = "*Submitted via snow-feedback*";

/// Category of a feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedbackType {
    /// Something is broken
    Bug,
    /// An existing skill could do more
    Enhancement,
    /// A new skill is wanted
    NewSkill,
}

impl FeedbackType {
    /// Emoji prefix used in titles and descriptions
    pub fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Bug => "\u{1F41B}",        // bug
            FeedbackType::Enhancement => "\u{2728}", // sparkles
            FeedbackType::NewSkill => "\u{1F4A1}",   // light bulb
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackType::Bug => "Bug",
            FeedbackType::Enhancement => "Enhancement",
            FeedbackType::NewSkill => "New Skill",
        }
    }
}

/// One piece of feedback to submit
#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    /// Category of the feedback
    pub feedback_type: FeedbackType,
    /// The user's message
    pub message: String,
    /// Skill being reported on, when known
    pub skill_name: Option<String>,
    /// Relevant conversation excerpt showing the issue
    pub conversation_context: Option<String>,
}

impl FeedbackRequest {
    /// Create a feedback request
    pub fn new(feedback_type: FeedbackType, message: impl Into<String>) -> Self {
        Self {
            feedback_type,
            message: message.into(),
            skill_name: None,
            conversation_context: None,
        }
    }

    /// Set the affected skill name
    pub fn with_skill_name(mut self, skill_name: impl Into<String>) -> Self {
        self.skill_name = Some(skill_name.into());
        self
    }

    /// Set the conversation context excerpt
    pub fn with_conversation_context(mut self, context: impl Into<String>) -> Self {
        self.conversation_context = Some(context.into());
        self
    }

    /// Record title: `{emoji} {label}: {skill}` (new-skill requests get a
    /// fixed title)
    pub fn title(&self) -> String {
        let emoji = self.feedback_type.emoji();
        match self.feedback_type {
            FeedbackType::NewSkill => format!("{} New Skill Request", emoji),
            _ => {
                let skill = self.skill_name.as_deref().unwrap_or("MCP Skill");
                format!("{} {}: {}", emoji, self.feedback_type.label(), skill)
            }
        }
    }

    /// Markdown description body with message, skill, context and signature
    pub fn description(&self) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "**{} {}**\n",
            self.feedback_type.emoji(),
            self.feedback_type.label()
        ));
        parts.push(format!("**User Message:**\n{}\n", self.message));

        if let Some(skill) = &self.skill_name {
            parts.push(format!("\n**Affected Skill:** {}", skill));
        }

        if let Some(context) = &self.conversation_context {
            parts.push("\n**Conversation Context:**".to_string());
            parts.push(context.clone());
        }

        parts.push("\n---".to_string());
        parts.push(SIGNATURE.to_string());

        parts.join("\n")
    }

    /// Table API payload for this request
    pub fn payload(&self) -> Value {
        json!({
            "short_description": self.title(),
            "description": self.description(),
            "data_science_request": "NOW Platform App Development",
            "work_activity": "Platform Dev - Security BOS App",
            "work_required_hrs": "4",
            "state": "opened",
            "assigned_to": DEFAULT_ASSIGNEE,
        })
    }
}

/// Deep link to a record in the classic UI with the datascience view
pub fn record_link(instance_url: &str, table: &str, sys_id: &str) -> String {
    format!(
        "{instance}/now/nav/ui/classic/params/target/{table}.do%3Fsys_id%3D{sys_id}\
         %26sysparm_view%3Ddatascience%26sysparm_record_target%3D{table}\
         %26sysparm_record_row%3D1%26sysparm_record_rows%3D1881\
         %26sysparm_record_list%3Drequest_type%253DSecurity%2BData%2BAnalytics\
         %255EORDERBYDESCnumber%26sysparm_view%3Ddatascience",
        instance = instance_url.trim_end_matches('/'),
        table = table,
        sys_id = sys_id,
    )
}

/// Submit a feedback record through the session manager.
///
/// Expects a `201 Created` from the table API; any other status is
/// surfaced as [`Error::UnexpectedStatus`] for the caller to report.
/// Authentication and transport errors propagate from the manager.
pub async fn submit<A>(
    manager: &SessionManagerGeneric<A>,
    request: &FeedbackRequest,
) -> Result<FeedbackReceipt>
where
    A: Authenticator + std::fmt::Debug,
{
    let instance = manager.settings().instance.clone();
    let url = instance.feedback_api_url();

    info!("Submitting feedback: {}", request.title());

    let response = manager
        .post(&url, RequestOptions::new().with_json(request.payload()))
        .await?;

    let status = response.status();
    if status != StatusCode::CREATED {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::unexpected_status(status.as_u16(), body));
    }

    let parsed: TableInsertResponse = response.json().await?;
    let link = record_link(&instance.url, &instance.feedback_table, &parsed.result.sys_id);

    info!("Feedback submitted successfully: {}", parsed.result.number);

    Ok(FeedbackReceipt {
        number: parsed.result.number,
        sys_id: parsed.result.sys_id,
        link,
    })
}
