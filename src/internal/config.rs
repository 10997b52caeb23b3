//! Command configuration: the YAML schema and its validated, regex-compiled form.
//!
//! A config declares one or more prefixes (e.g. `/bench`), each exposing named
//! sub-commands and at most one default command:
//!
//! ```yaml
//! prefixes:
//!   - prefix: /bench
//!     help: "Use `/bench <version>` to start."
//!     verify_user: true
//!     commands:
//!       - name: ""
//!         event_type: start
//!         comment_template: "Starting {{ index . \"RELEASE\" }}."
//!         args_regex: (?P<RELEASE>master|main|v[0-9]+\.[0-9]+\.[0-9]+\S*)$
//!       - name: cancel
//!         event_type: stop
//! ```
//!
//! [`Config`] is only obtainable through [`Config::validate`], so every value
//! of it has passed validation and carries compiled regexes. It is never
//! mutated afterwards; reloading means building a new one.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use super::error::ConfigError;

/// Config file contents as written by the user, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub prefixes: Vec<RawPrefixConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPrefixConfig {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub verify_user: bool,
    #[serde(default)]
    pub commands: Vec<RawCommandConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCommandConfig {
    /// Empty for the default command.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub comment_template: String,
    #[serde(default)]
    pub args_regex: String,
    #[serde(default)]
    pub label: String,
}

/// Validated command configuration. Prefix order is matching priority.
#[derive(Debug, Clone)]
pub struct Config {
    prefixes: Vec<PrefixConfig>,
}

/// A validated prefix with at least one command.
#[derive(Debug, Clone)]
pub struct PrefixConfig {
    prefix: String,
    help: String,
    verify_user: bool,
    commands: Vec<CommandConfig>,
}

/// A validated command with its argument regex compiled.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    name: String,
    event_type: String,
    comment_template: String,
    label: Option<String>,
    args_regex: Option<Regex>,
}

impl Config {
    /// Read and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), prefixes = config.prefixes.len(), "loaded command config");
        Ok(config)
    }

    /// Strictly deserialize YAML (unknown keys are rejected) and validate it.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(content)?;
        Self::validate(raw)
    }

    /// Validate a raw config and compile every argument regex.
    pub fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.prefixes.is_empty() {
            return Err(ConfigError::NoPrefixes);
        }

        let prefixes = raw
            .prefixes
            .into_iter()
            .enumerate()
            .map(|(index, p)| PrefixConfig::validate(index, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { prefixes })
    }

    pub fn prefixes(&self) -> &[PrefixConfig] {
        &self.prefixes
    }
}

impl PrefixConfig {
    fn validate(index: usize, raw: RawPrefixConfig) -> Result<Self, ConfigError> {
        if raw.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix { index });
        }
        let prefix = raw.prefix;
        if raw.commands.is_empty() {
            return Err(ConfigError::NoCommands { prefix });
        }

        let mut commands = Vec::with_capacity(raw.commands.len());
        let mut has_default = false;
        for c in raw.commands {
            let cmd = CommandConfig::validate(&prefix, c)?;
            if cmd.is_default() {
                if has_default {
                    return Err(ConfigError::DuplicateDefault { prefix });
                }
                has_default = true;
            }
            commands.push(cmd);
        }

        Ok(Self {
            prefix,
            help: raw.help,
            verify_user: raw.verify_user,
            commands,
        })
    }

    /// The literal token, e.g. `/bench`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Whether dispatch requires the caller to authorize the comment author.
    pub fn verify_user(&self) -> bool {
        self.verify_user
    }

    pub fn commands(&self) -> &[CommandConfig] {
        &self.commands
    }
}

impl CommandConfig {
    fn validate(prefix: &str, raw: RawCommandConfig) -> Result<Self, ConfigError> {
        if raw.name.eq_ignore_ascii_case("help") {
            return Err(ConfigError::ReservedName {
                prefix: prefix.to_string(),
            });
        }
        if raw.name.is_empty() && raw.args_regex.is_empty() {
            return Err(ConfigError::DefaultWithoutArgs {
                prefix: prefix.to_string(),
            });
        }

        let args_regex = if raw.args_regex.is_empty() {
            None
        } else {
            Some(compile_args_regex(prefix, &raw.name, &raw.args_regex)?)
        };

        Ok(Self {
            name: raw.name,
            event_type: raw.event_type,
            comment_template: raw.comment_template,
            label: Some(raw.label).filter(|l| !l.is_empty()),
            args_regex,
        })
    }

    /// Command name; empty for the default command.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn comment_template(&self) -> &str {
        &self.comment_template
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Compiled argument regex, `None` when the command takes no arguments.
    pub fn args_regex(&self) -> Option<&Regex> {
        self.args_regex.as_ref()
    }

    /// Name as shown in messages: `<default>` for the nameless command.
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "<default>" } else { name }
}

fn compile_args_regex(prefix: &str, name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    let command = display_name(name).to_string();
    if pattern.starts_with('^') {
        return Err(ConfigError::AnchoredRegex {
            prefix: prefix.to_string(),
            command,
            regex: pattern.to_string(),
        });
    }

    let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
        prefix: prefix.to_string(),
        command: command.clone(),
        regex: pattern.to_string(),
        source,
    })?;

    // Group 0 is the whole match and never has a name.
    let mut names = re.capture_names().skip(1).peekable();
    if names.peek().is_none() {
        return Err(ConfigError::NoNamedGroup {
            prefix: prefix.to_string(),
            command,
            regex: pattern.to_string(),
        });
    }
    if names.any(|n| n.is_none()) {
        return Err(ConfigError::UnnamedGroup {
            prefix: prefix.to_string(),
            command,
            regex: pattern.to_string(),
        });
    }
    Ok(re)
}
