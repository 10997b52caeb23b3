//! Success comment templating.
//!
//! Comment templates use the action syntax of the deployed bot configs:
//! `{{ index . "KEY" }}` and `{{ .KEY }}` substitute a value from the argument
//! map. `{{-` and `-}}` trim the whitespace before and after the action.
//! Nothing else (conditionals, pipelines) is supported.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref INDEX_ACTION: Regex =
        Regex::new(r#"^index\s+\.\s+"([^"]*)"$"#).expect("Invalid Regex");
    static ref FIELD_ACTION: Regex =
        Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").expect("Invalid Regex");
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// An action is unterminated or uses an unsupported expression.
    #[error("template syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: String },

    /// An action references a key missing from the argument map.
    #[error("template references unknown key '{0}'")]
    MissingKey(String),
}

/// Render `template`, substituting every action from `args`.
pub fn render_comment_template(
    template: &str,
    args: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let offset = template.len() - rest.len() + start;
        out.push_str(&rest[..start]);

        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            return Err(TemplateError::Syntax {
                offset,
                reason: "unclosed action".to_string(),
            });
        };

        let mut action = &after_open[..end];
        if let Some(a) = action.strip_prefix('-') {
            action = a;
            out.truncate(out.trim_end().len());
        }
        let trim_after = match action.strip_suffix('-') {
            Some(a) => {
                action = a;
                true
            }
            None => false,
        };

        let key = action_key(action.trim()).ok_or_else(|| TemplateError::Syntax {
            offset,
            reason: format!("unsupported action '{}'", action.trim()),
        })?;
        let value = args
            .get(key)
            .ok_or_else(|| TemplateError::MissingKey(key.to_string()))?;
        out.push_str(value);

        rest = &after_open[end + 2..];
        if trim_after {
            rest = rest.trim_start();
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn action_key(action: &str) -> Option<&str> {
    INDEX_ACTION
        .captures(action)
        .or_else(|| FIELD_ACTION.captures(action))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
