//! Render command: previews the success comment a command would post.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use super::{CommentInput, EXIT_MALFORMED};
use crate::internal::command::{ParseOutcome, parse_command};

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to the config file
    #[arg(long, short, default_value = "./config.yml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub input: CommentInput,

    /// Extra template value as KEY=VALUE, e.g. LAST_COMMIT_SHA=a854b28 (repeatable)
    #[arg(long = "arg", value_parser = parse_key_val)]
    pub args: Vec<(String, String)>,
}

pub fn execute(args: RenderArgs) -> Result<ExitCode> {
    let cfg = super::load_config(&args.config)?;
    let (body, event) = args.input.resolve()?;

    let cmd = match parse_command(&cfg, &body) {
        ParseOutcome::NotFound => {
            tracing::info!("not a command");
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

    let mut ambient: HashMap<String, String> =
        event.map(|e| e.ambient_args()).unwrap_or_default();
    ambient.extend(args.args);

    let comment = cmd
        .generate_success_comment(&ambient)
        .context("failed to execute template")?;
    print!("{comment}");
    if let Some(label) = &cmd.success_label {
        tracing::info!(%label, "command would also set a label");
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
