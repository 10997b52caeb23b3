//! Extract command: parses a comment and reports the command it carries.
//!
//! Mirrors the webhook flow without the network side effects: the matched
//! event type and arguments are printed (and optionally written to files, one
//! per argument) instead of being dispatched.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use super::{CommentInput, EXIT_MALFORMED, EXIT_NOT_ALLOWED};
use crate::internal::{
    command::{Command, ParseOutcome, parse_command},
    event::{denied_comment, is_author_allowed},
};

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Path to the config file
    #[arg(long, short, default_value = "./config.yml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub input: CommentInput,

    /// Write each argument to `<dir>/<NAME>`
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Print the command as JSON
    #[arg(long)]
    pub json: bool,

    /// Comment author, used in the denial reply
    #[arg(long)]
    pub author: Option<String>,

    /// Comment author association (e.g. MEMBER), overrides the event's
    #[arg(long)]
    pub author_association: Option<String>,
}

pub fn execute(args: ExtractArgs) -> Result<ExitCode> {
    let cfg = super::load_config(&args.config)?;
    let (body, event) = args.input.resolve()?;

    let cmd = match parse_command(&cfg, &body) {
        ParseOutcome::NotFound => {
            tracing::debug!("comment does not contain any command");
            return Ok(ExitCode::SUCCESS);
        }
        ParseOutcome::Malformed(err) => {
            tracing::warn!(error = %err, "parsing command from comment failed");
            if let Some(reply) = super::malformed_reply(&err) {
                println!("{reply}");
            }
            return Ok(ExitCode::from(EXIT_MALFORMED));
        }
        ParseOutcome::Matched(cmd) => cmd,
    };

    if cmd.help {
        println!("{}", cmd.success_comment_template);
        return Ok(ExitCode::SUCCESS);
    }

    let association = args
        .author_association
        .clone()
        .or_else(|| event.as_ref().map(|e| e.author_association.clone()));
    if cmd.should_verify_user
        && let Some(association) = association
        && !is_author_allowed(&association)
    {
        let author = args
            .author
            .clone()
            .or_else(|| event.as_ref().map(|e| e.author.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::warn!(%author, %association, "user not allowed to run command");
        println!("{}", denied_comment(&author));
        return Ok(ExitCode::from(EXIT_NOT_ALLOWED));
    }

    let ambient = event.map(|e| e.ambient_args()).unwrap_or_default();
    let all_args = cmd.merged_args(&ambient);
    tracing::info!(event_type = %cmd.event_type, cmd_line = %cmd.debug_cmd_line, "extracted command");

    if let Some(dir) = &args.output_dir {
        write_args(dir, &all_args)?;
    }
    print!("{}", format_command(&cmd, &all_args, args.json)?);
    Ok(ExitCode::SUCCESS)
}

/// Human-readable (`event_type: ...` then sorted `KEY=VALUE` lines) or JSON.
pub fn format_command(
    cmd: &Command,
    all_args: &HashMap<String, String>,
    json: bool,
) -> Result<String> {
    let sorted: BTreeMap<&str, &str> = all_args
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    if json {
        let value = serde_json::json!({
            "prefix": cmd.prefix,
            "event_type": cmd.event_type,
            "args": sorted,
            "verify_user": cmd.should_verify_user,
            "label": cmd.success_label
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&value)?));
    }

    let mut out = format!("event_type: {}\n", cmd.event_type);
    for (k, v) in sorted {
        out.push_str(&format!("{k}={v}\n"));
    }
    Ok(out)
}

/// One file per argument, named after the argument, holding its value.
pub fn write_args(dir: &Path, args: &HashMap<String, String>) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create output directory {}", dir.display()))?;
    for (name, value) in args {
        let path = dir.join(name);
        std::fs::write(&path, value)
            .with_context(|| format!("could not write arg to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "file added");
    }
    Ok(())
}
