//! Check command: validates a config file and prints what it accepts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::internal::config::Config;

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the config file
    #[arg(long, short, default_value = "./config.yml")]
    pub config: PathBuf,
}

pub fn execute(args: CheckArgs) -> Result<ExitCode> {
    let cfg = super::load_config(&args.config)?;
    tracing::info!(path = %args.config.display(), "config is valid");
    print!("{}", summarize(&cfg));
    Ok(ExitCode::SUCCESS)
}

/// One block per prefix, one line per command, in matching order.
pub fn summarize(cfg: &Config) -> String {
    let mut out = String::new();
    for prefix in cfg.prefixes() {
        out.push_str(&format!(
            "{} (verify_user: {})\n",
            prefix.prefix(),
            prefix.verify_user()
        ));
        for c in prefix.commands() {
            let mut line = format!("  {} -> {}", c.display_name(), c.event_type());
            if let Some(re) = c.args_regex() {
                let names: Vec<&str> = re.capture_names().flatten().collect();
                line.push_str(&format!(" [args: {}]", names.join(", ")));
            }
            if let Some(label) = c.label() {
                line.push_str(&format!(" [label: {label}]"));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("  help (built-in)\n");
    }
    out
}
