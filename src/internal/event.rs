//! GitHub `issue_comment` event details and comment author verification.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Author associations allowed to trigger commands on prefixes with
/// `verify_user` set.
pub const ALLOWED_ASSOCIATIONS: [&str; 3] = ["COLLABORATOR", "MEMBER", "OWNER"];

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to read event file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GH event payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Only newly created comments carry commands; edits and deletions don't.
    #[error("issue_comment action must be 'created', got '{0}'")]
    UnsupportedAction(String),
}

#[derive(Debug, Deserialize)]
struct IssueCommentEvent {
    action: String,
    comment: EventComment,
    issue: EventIssue,
    sender: EventUser,
    repository: EventRepository,
}

#[derive(Debug, Deserialize)]
struct EventComment {
    #[serde(default)]
    body: String,
    #[serde(default)]
    author_association: String,
}

#[derive(Debug, Deserialize)]
struct EventIssue {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct EventUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct EventRepository {
    name: String,
    owner: EventUser,
}

/// The parts of an `issue_comment` event the command flow needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub owner: String,
    pub repo: String,
    /// Issue or pull request number.
    pub pr: u64,
    pub author: String,
    pub author_association: String,
    pub comment_body: String,
}

impl EventDetails {
    pub fn load(path: &Path) -> Result<Self, EventError> {
        let content = std::fs::read_to_string(path).map_err(|source| EventError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_issue_comment_json(&content)
    }

    pub fn from_issue_comment_json(payload: &str) -> Result<Self, EventError> {
        let event: IssueCommentEvent = serde_json::from_str(payload)?;
        if event.action != "created" {
            return Err(EventError::UnsupportedAction(event.action));
        }
        Ok(Self {
            owner: event.repository.owner.login,
            repo: event.repository.name,
            pr: event.issue.number,
            author: event.sender.login,
            author_association: event.comment.author_association,
            comment_body: event.comment.body,
        })
    }

    /// Values merged into command args before dispatch and templating.
    pub fn ambient_args(&self) -> HashMap<String, String> {
        HashMap::from([("PR_NUMBER".to_string(), self.pr.to_string())])
    }

    pub fn is_author_allowed(&self) -> bool {
        is_author_allowed(&self.author_association)
    }
}

pub fn is_author_allowed(association: &str) -> bool {
    ALLOWED_ASSOCIATIONS.contains(&association)
}

/// Reply posted when an unauthorized author triggers a verified command.
pub fn denied_comment(author: &str) -> String {
    format!("@{author} is not a org member nor a collaborator and cannot execute benchmarks.")
}
