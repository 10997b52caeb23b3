//! Comment command matcher: extracts a [`Command`] from free-text comments.
//!
//! A comment carries a command when its first line reads
//! `<prefix> [<name>] [<args>]`, e.g. `/bench restart v3.0.0`. Anything after
//! the first line is free text and ignored. Matching is purely declarative:
//! prefixes and commands are tried in config order and the first match wins.

use std::collections::HashMap;

use super::config::{CommandConfig, Config, PrefixConfig};
use super::error::CommandParseError;
use super::template::{TemplateError, render_comment_template};

const HELP_TOKEN: &str = " help";

/// A recognized command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub prefix: String,
    /// Event forwarded to the dispatch collaborator; empty for help.
    pub event_type: String,
    /// Named capture group → captured value.
    pub args: HashMap<String, String>,

    pub should_verify_user: bool,
    pub success_comment_template: String,
    pub success_label: Option<String>,

    /// True for the built-in `help` command, which is never dispatched.
    pub help: bool,
    /// The raw command line the command was parsed from.
    pub debug_cmd_line: String,
}

/// Outcome of parsing a single comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Unrelated prose; nothing to do.
    NotFound,
    /// A command attempt that did not parse; the author may be told why.
    Malformed(CommandParseError),
    /// A fully populated command.
    Matched(Command),
}

impl ParseOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ParseOutcome::Matched(_))
    }

    pub fn command(&self) -> Option<&Command> {
        match self {
            ParseOutcome::Matched(cmd) => Some(cmd),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CommandParseError> {
        match self {
            ParseOutcome::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl Command {
    /// `args` merged with caller-supplied values such as `PR_NUMBER`.
    /// Ambient values win on key collisions.
    pub fn merged_args(&self, ambient: &HashMap<String, String>) -> HashMap<String, String> {
        let mut all = self.args.clone();
        all.extend(ambient.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    /// Render the success comment against the merged argument map.
    pub fn generate_success_comment(
        &self,
        ambient: &HashMap<String, String>,
    ) -> Result<String, TemplateError> {
        render_comment_template(&self.success_comment_template, &self.merged_args(ambient))
    }
}

/// `s` is exactly `token`, or `token` followed by a space or a newline.
fn has_exact_prefix(s: &str, token: &str) -> bool {
    s.strip_prefix(token)
        .is_some_and(|r| r.is_empty() || r.starts_with(' ') || r.starts_with('\n'))
}

/// Parse the command to dispatch from an issue comment.
pub fn parse_command(cfg: &Config, comment: &str) -> ParseOutcome {
    let comment = comment.trim();

    let Some(prefix) = cfg
        .prefixes()
        .iter()
        .find(|p| has_exact_prefix(comment, p.prefix()))
    else {
        return ParseOutcome::NotFound;
    };

    // The command line runs from the prefix up to the first new line.
    let cmd_line = comment.split('\n').next().unwrap_or(comment).trim_end();
    let rest = cmd_line.strip_prefix(prefix.prefix()).unwrap_or_default();

    if has_exact_prefix(rest, HELP_TOKEN) {
        tracing::debug!(prefix = prefix.prefix(), "help requested");
        return ParseOutcome::Matched(Command {
            prefix: prefix.prefix().to_string(),
            event_type: String::new(),
            args: HashMap::new(),
            should_verify_user: false,
            success_comment_template: prefix.help().to_string(),
            success_label: None,
            help: true,
            debug_cmd_line: cmd_line.to_string(),
        });
    }

    let Some(cmd_config) = select_command(prefix, rest) else {
        tracing::debug!(cmd_line, "no matching command found");
        return ParseOutcome::Malformed(CommandParseError::new(
            format!("no matching command found for comment line: {cmd_line}"),
            format!(
                "Incorrect `{}` syntax; no matching command found.\n\n{}",
                prefix.prefix(),
                prefix.help()
            ),
        ));
    };

    let mut cmd = Command {
        prefix: prefix.prefix().to_string(),
        event_type: cmd_config.event_type().to_string(),
        args: HashMap::new(),
        should_verify_user: prefix.verify_user(),
        success_comment_template: cmd_config.comment_template().to_string(),
        success_label: cmd_config.label().map(str::to_string),
        help: false,
        debug_cmd_line: cmd_line.to_string(),
    };

    let rest = if cmd_config.is_default() {
        rest
    } else {
        rest.strip_prefix(' ')
            .and_then(|r| r.strip_prefix(cmd_config.name()))
            .unwrap_or(rest)
    };

    match extract_args(prefix, cmd_config, cmd_line, rest) {
        Ok(args) => {
            cmd.args = args;
            tracing::debug!(event_type = %cmd.event_type, cmd_line, "matched command");
            ParseOutcome::Matched(cmd)
        }
        Err(err) => {
            tracing::debug!(error = %err, "malformed command");
            ParseOutcome::Malformed(err)
        }
    }
}

/// First named command whose token follows the prefix, else the default
/// command when at least one argument token is present.
fn select_command<'a>(prefix: &'a PrefixConfig, rest: &str) -> Option<&'a CommandConfig> {
    let mut default = None;
    for c in prefix.commands() {
        if c.is_default() {
            default = Some(c);
            continue;
        }
        if has_exact_prefix(rest, &format!(" {}", c.name())) {
            return Some(c);
        }
    }
    default.filter(|_| rest.starts_with(' '))
}

fn extract_args(
    prefix: &PrefixConfig,
    cmd_config: &CommandConfig,
    cmd_line: &str,
    rest: &str,
) -> Result<HashMap<String, String>, CommandParseError> {
    let subject = if cmd_config.is_default() {
        "command".to_string()
    } else {
        format!("{} command", cmd_config.name())
    };

    let Some(re) = cmd_config.args_regex() else {
        if !rest.is_empty() {
            return Err(CommandParseError::new(
                format!(
                    "command expects no arguments, but got some '{}' for cmdLine: '{cmd_line}'",
                    rest.trim()
                ),
                format!(
                    "Incorrect `{}` syntax; {subject} expects no arguments, but got some.\n\n{}",
                    prefix.prefix(),
                    prefix.help()
                ),
            ));
        }
        return Ok(HashMap::new());
    };

    // Unanchored: the first match anywhere in the remainder counts.
    let Some(caps) = re.captures(rest) else {
        return Err(CommandParseError::new(
            format!(
                "command requires at least one argument matching '{}' regex; got cmdLine '{cmd_line}'",
                re.as_str()
            ),
            format!(
                "Incorrect `{}` syntax; {subject} requires at least one argument that matches `{}` regex.\n\n{}",
                prefix.prefix(),
                re.as_str(),
                prefix.help()
            ),
        ));
    };

    Ok(re
        .capture_names()
        .flatten()
        .map(|name| {
            let value = caps.name(name).map_or("", |m| m.as_str());
            (name.to_string(), value.to_string())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::{bench_config, multi_prefix_config};

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn expect_matched(cfg: &Config, comment: &str) -> Command {
        match parse_command(cfg, comment) {
            ParseOutcome::Matched(cmd) => cmd,
            other => panic!("expected a command for {comment:?}, got {other:?}"),
        }
    }

    fn expect_malformed(cfg: &Config, comment: &str) -> CommandParseError {
        match parse_command(cfg, comment) {
            ParseOutcome::Malformed(err) => err,
            other => panic!("expected a parse error for {comment:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_default_command_with_release() {
        let cmd = expect_matched(&bench_config(), "/bench v3.0.0");
        assert_eq!(cmd.prefix, "/bench");
        assert_eq!(cmd.event_type, "start");
        assert_eq!(cmd.args, args(&[("RELEASE", "v3.0.0")]));
        assert!(cmd.should_verify_user);
        assert!(!cmd.help);
        assert_eq!(cmd.success_label.as_deref(), Some("bench"));
        assert_eq!(cmd.debug_cmd_line, "/bench v3.0.0");
    }

    #[test]
    fn test_default_command_branch_names() {
        let cfg = bench_config();
        for release in ["main", "master", "v2.55.0-rc.1"] {
            let cmd = expect_matched(&cfg, &format!("/bench {release}"));
            assert_eq!(cmd.args, args(&[("RELEASE", release)]));
        }
    }

    #[test]
    fn test_named_command_with_args() {
        let cmd = expect_matched(&bench_config(), "/bench restart v3.0.0");
        assert_eq!(cmd.event_type, "restart");
        assert_eq!(cmd.args, args(&[("RELEASE", "v3.0.0")]));
        assert_eq!(cmd.success_label, None);
    }

    #[test]
    fn test_named_command_without_args() {
        let cmd = expect_matched(&bench_config(), "/bench cancel");
        assert_eq!(cmd.event_type, "stop");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_help_command() {
        let cfg = bench_config();
        let cmd = expect_matched(&cfg, "/bench help");
        assert!(cmd.help);
        assert!(cmd.event_type.is_empty());
        assert!(cmd.args.is_empty());
        assert!(!cmd.should_verify_user);
        assert_eq!(cmd.success_comment_template, cfg.prefixes()[0].help());

        assert!(expect_matched(&cfg, "/bench help me please").help);
    }

    #[test]
    fn test_trailing_text_is_ignored() {
        let cfg = bench_config();
        for comment in [
            "/bench v3.0.0\n",
            "/bench v3.0.0\n\nYolo",
            "/bench v3.0.0\r\nSome text after",
            "  /bench v3.0.0  \nSome text after",
        ] {
            let cmd = expect_matched(&cfg, comment);
            assert_eq!(cmd.args, args(&[("RELEASE", "v3.0.0")]), "{comment:?}");
            assert_eq!(cmd.debug_cmd_line, "/bench v3.0.0");
        }
        assert_eq!(
            expect_matched(&cfg, "/bench cancel\nthanks!").event_type,
            "stop"
        );
    }

    #[test]
    fn test_bare_prefix_is_malformed() {
        let cfg = bench_config();
        for comment in ["/bench", "/bench\n", "/bench\nplease run"] {
            let err = expect_malformed(&cfg, comment);
            assert!(
                err.to_comment()
                    .starts_with("Incorrect `/bench` syntax; no matching command found."),
                "{}",
                err.to_comment()
            );
            assert!(err.to_comment().ends_with(cfg.prefixes()[0].help()));
            assert!(err.to_string().starts_with("no matching command found"));
        }
    }

    #[test]
    fn test_malformed_arguments() {
        let cfg = bench_config();
        let cases = [
            (
                "/bench cancel garbage",
                "Incorrect `/bench` syntax; cancel command expects no arguments, but got some.",
            ),
            (
                "/bench not-a-version",
                "Incorrect `/bench` syntax; command requires at least one argument that matches `(?P<RELEASE>master|main|v[0-9]+\\.[0-9]+\\.[0-9]+\\S*)$` regex.",
            ),
            (
                "/bench v3.0.0 garbage",
                "Incorrect `/bench` syntax; command requires at least one argument",
            ),
            (
                "/bench restart v3.0.0 garbage",
                "Incorrect `/bench` syntax; restart command requires at least one argument",
            ),
            (
                "/bench restart",
                "Incorrect `/bench` syntax; restart command requires at least one argument",
            ),
            (
                "/bench restartv3.0.0 garbage",
                "Incorrect `/bench` syntax; command requires at least one argument",
            ),
            (
                "/bench helpme",
                "Incorrect `/bench` syntax; command requires at least one argument",
            ),
        ];
        for (comment, expected) in cases {
            let err = expect_malformed(&cfg, comment);
            assert!(
                err.to_comment().starts_with(expected),
                "{comment:?}: {}",
                err.to_comment()
            );
        }
    }

    #[test]
    fn test_not_matching_comments() {
        let cfg = bench_config();
        for comment in [
            "",
            "   \n ",
            "How to run this?",
            "How to start bench?\nyolo\nthanks",
            "/benchv3.0.0",
            "/benchv3.0.0 v3.0.0",
            "/benchcancel",
            "/bench\tv3.0.0",
            "How to start bench? I think it was something like /bench main",
            "How to start bench? I think it was something like:\n\n /bench main\n\nYolo",
            "/other v3.0.0",
        ] {
            assert_eq!(
                parse_command(&cfg, comment),
                ParseOutcome::NotFound,
                "{comment:?}"
            );
        }
    }

    #[test]
    fn test_argument_search_is_unanchored() {
        // The regex may match past the start of the remainder.
        let cmd = expect_matched(&bench_config(), "/bench please-use-main");
        assert_eq!(cmd.args, args(&[("RELEASE", "main")]));
    }

    #[test]
    fn test_multiple_named_groups() {
        let cfg = multi_prefix_config();
        let cmd = expect_matched(&cfg, "/funcbench feature-x BenchmarkQuery.*");
        assert_eq!(cmd.event_type, "funcbench_start");
        assert_eq!(
            cmd.args,
            args(&[("BRANCH", "feature-x"), ("BENCH_FUNC_REGEX", "BenchmarkQuery.*")])
        );
        assert!(!cmd.should_verify_user);
    }

    #[test]
    fn test_optional_group_yields_empty_value() {
        let yaml = r#"prefixes:
  - prefix: /bench
    commands:
      - name: ""
        event_type: start
        args_regex: '(?P<RELEASE>v[0-9.]+)(?:\s+--dir=(?P<DIR>\S+))?$'
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        let cmd = expect_matched(&cfg, "/bench v3.0");
        assert_eq!(cmd.args, args(&[("RELEASE", "v3.0"), ("DIR", "")]));

        let cmd = expect_matched(&cfg, "/bench v3.0 --dir=manifests/bench");
        assert_eq!(
            cmd.args,
            args(&[("RELEASE", "v3.0"), ("DIR", "manifests/bench")])
        );
    }

    #[test]
    fn test_prefix_order_and_second_prefix() {
        let cfg = multi_prefix_config();
        assert_eq!(expect_matched(&cfg, "/bench cancel").event_type, "stop");

        // No default command under /bench: arguments alone are not enough.
        let err = expect_malformed(&cfg, "/bench v3.0.0");
        assert!(
            err.to_comment()
                .starts_with("Incorrect `/bench` syntax; no matching command found.")
        );
    }

    #[test]
    fn test_first_prefix_wins() {
        let yaml = r#"prefixes:
  - prefix: /bench
    commands:
      - name: cancel
        event_type: first
  - prefix: /bench
    commands:
      - name: cancel
        event_type: second
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(expect_matched(&cfg, "/bench cancel").event_type, "first");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let cfg = bench_config();
        for comment in ["/bench v3.0.0", "/bench", "hello", "/bench help"] {
            assert_eq!(parse_command(&cfg, comment), parse_command(&cfg, comment));
        }
    }

    #[test]
    fn test_generate_success_comment() {
        let cmd = expect_matched(&bench_config(), "/bench v3.0.0");
        let ambient = args(&[("PR_NUMBER", "15487")]);
        let comment = cmd.generate_success_comment(&ambient).unwrap();
        assert_eq!(
            comment,
            "Benchmark tests are being started for PR #15487 against v3.0.0.\n"
        );

        let err = cmd.generate_success_comment(&HashMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingKey(key) if key == "PR_NUMBER"));
    }

    #[test]
    fn test_merged_args_prefers_ambient() {
        let cmd = expect_matched(&bench_config(), "/bench restart v3.0.0");
        let merged = cmd.merged_args(&args(&[("RELEASE", "override"), ("PR_NUMBER", "1")]));
        assert_eq!(merged, args(&[("RELEASE", "override"), ("PR_NUMBER", "1")]));
    }

    #[test]
    fn test_outcome_accessors() {
        let cfg = bench_config();
        let found = parse_command(&cfg, "/bench cancel");
        assert!(found.is_found());
        assert!(found.command().is_some());
        assert!(found.error().is_none());

        let malformed = parse_command(&cfg, "/bench");
        assert!(!malformed.is_found());
        assert!(malformed.error().is_some());

        let none = parse_command(&cfg, "hi");
        assert!(!none.is_found());
        assert!(none.command().is_none() && none.error().is_none());
    }
}
