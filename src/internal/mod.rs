//! Internal layer: command config, comment matcher, templating and event details.

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod template;

pub use command::{Command, ParseOutcome, parse_command};
pub use config::{
    CommandConfig, Config, PrefixConfig, RawCommandConfig, RawConfig, RawPrefixConfig,
};
pub use error::{CommandParseError, ConfigError};
