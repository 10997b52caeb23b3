//! CLI subcommand handlers and the comment input options they share.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::internal::{CommandParseError, config::Config, event::EventDetails};

pub mod check;
pub mod extract;
pub mod render;

/// Exit code for a comment that looked like a command but did not parse.
pub const EXIT_MALFORMED: u8 = 2;
/// Exit code for a command the author is not allowed to run.
pub const EXIT_NOT_ALLOWED: u8 = 3;

/// Where the comment text comes from. Exactly one source is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct CommentInput {
    /// Comment body text
    #[arg(long)]
    pub comment: Option<String>,
    /// File containing the comment body
    #[arg(long)]
    pub comment_file: Option<PathBuf>,
    /// GitHub issue_comment event payload (JSON)
    #[arg(long)]
    pub event: Option<PathBuf>,
}

impl CommentInput {
    /// The comment body, plus the event details when read from an event payload.
    pub fn resolve(&self) -> Result<(String, Option<EventDetails>)> {
        if let Some(path) = &self.event {
            let details = EventDetails::load(path)?;
            tracing::debug!(
                repo = %details.repo,
                issue = details.pr,
                author = %details.author,
                "loaded issue_comment event"
            );
            return Ok((details.comment_body.clone(), Some(details)));
        }
        if let Some(path) = &self.comment_file {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read comment file {}", path.display()))?;
            return Ok((body, None));
        }
        Ok((self.comment.clone().unwrap_or_default(), None))
    }
}

pub(crate) fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).context("configuration is incorrect")
}

/// Text to post back for a malformed command. An empty comment means the
/// error is only logged.
pub(crate) fn malformed_reply(err: &CommandParseError) -> Option<&str> {
    Some(err.to_comment()).filter(|c| !c.is_empty())
}
