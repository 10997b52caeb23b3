//! Error types for configuration loading and command parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that make a command configuration unusable.
///
/// Every variant is fatal to the reload that produced it: a config that fails
/// validation is never partially applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config source is not valid YAML for the expected schema.
    #[error("cannot unmarshal data: {0}")]
    Unmarshal(#[from] serde_yaml::Error),

    /// No prefixes were declared.
    #[error("empty configuration; no prefix")]
    NoPrefixes,

    /// A prefix token is empty.
    #[error("bad config; prefix #{index} has an empty prefix token")]
    EmptyPrefix { index: usize },

    /// A prefix declares no commands.
    #[error("empty configuration; no command for {prefix}")]
    NoCommands { prefix: String },

    /// A command uses the reserved `help` name.
    #[error("{prefix} bad config; 'help' command name is reserved")]
    ReservedName { prefix: String },

    /// A default command would match any trailing text.
    #[error(
        "{prefix} bad config; default commands cannot have empty args_regex (no required arguments)"
    )]
    DefaultWithoutArgs { prefix: String },

    /// More than one nameless command under the same prefix.
    #[error("{prefix} bad config; only one default (nameless) command is allowed")]
    DuplicateDefault { prefix: String },

    /// The argument regex starts with an anchor.
    #[error(
        "{prefix} bad config; command {command} args_regex {regex} cannot start with '^', it is matched after the command name"
    )]
    AnchoredRegex {
        prefix: String,
        command: String,
        regex: String,
    },

    /// The argument regex does not compile.
    #[error("{prefix} bad config; command {command} args_regex {regex} doesn't compile: {source}")]
    InvalidRegex {
        prefix: String,
        command: String,
        regex: String,
        #[source]
        source: regex::Error,
    },

    /// The argument regex has a capturing group without a name.
    #[error(
        "{prefix} bad config; command {command} args_regex {regex} has an unnamed capture group, all groups must be named"
    )]
    UnnamedGroup {
        prefix: String,
        command: String,
        regex: String,
    },

    /// The argument regex captures nothing.
    #[error(
        "{prefix} bad config; command {command} args_regex {regex} must declare at least one named capture group"
    )]
    NoNamedGroup {
        prefix: String,
        command: String,
        regex: String,
    },
}

/// A comment that looked like a command but could not be parsed.
///
/// `Display` carries the detailed message for logs, while [`to_comment`]
/// returns the text meant to be posted back to the author.
///
/// [`to_comment`]: CommandParseError::to_comment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandParseError {
    message: String,
    comment: String,
}

impl CommandParseError {
    pub fn new(message: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            comment: comment.into(),
        }
    }

    /// Feedback for the comment author. Empty means log only, do not reply.
    pub fn to_comment(&self) -> &str {
        &self.comment
    }
}
