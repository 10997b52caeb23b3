//! comment-monitor: extracts benchmark commands from issue and pull request comments.
//!
//! The core is [`internal::command::parse_command`], a pure matcher over a
//! validated [`internal::config::Config`]. The [`cli`] and [`command`] modules
//! wrap it in the `comment-monitor` binary.

pub mod cli;
pub mod command;
pub mod internal;
pub mod utils;
