//! Command template expansion
//!
//! Templates are argument lists with `{name}` placeholders. Scalar
//! placeholders are substituted inside any argument; list placeholders
//! standing alone as an argument expand into zero or more arguments.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::ConfigError;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"))
}

/// Values available to a template
#[derive(Debug, Default, Clone)]
pub struct TemplateVars {
    scalars: BTreeMap<&'static str, String>,
    lists: BTreeMap<&'static str, Vec<String>>,
}

impl TemplateVars {
    /// Create an empty variable set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar placeholder
    #[must_use]
    pub fn scalar(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.scalars.insert(name, value.into());
        self
    }

    /// Add a path placeholder
    #[must_use]
    pub fn path(self, name: &'static str, value: &Path) -> Self {
        self.scalar(name, value.display().to_string())
    }

    /// Add a list placeholder
    #[must_use]
    pub fn list(mut self, name: &'static str, values: Vec<String>) -> Self {
        self.lists.insert(name, values);
        self
    }
}

/// A named command template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    kind: &'static str,
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Create a template; `kind` names it in error messages
    pub fn new(kind: &'static str, tokens: Vec<String>) -> Self {
        Self { kind, tokens }
    }

    /// Raw template tokens
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Fail unless every placeholder in `required` appears in the template
    pub fn require(&self, required: &[&'static str]) -> Result<(), ConfigError> {
        for &placeholder in required {
            let needle = format!("{{{placeholder}}}");
            if !self.tokens.iter().any(|t| t.contains(&needle)) {
                return Err(ConfigError::MissingPlaceholder {
                    template: self.kind,
                    placeholder,
                });
            }
        }
        Ok(())
    }

    /// Expand the template into an argument vector
    pub fn expand(&self, vars: &TemplateVars) -> Result<Vec<String>, ConfigError> {
        let re = placeholder_regex();
        let mut args = Vec::with_capacity(self.tokens.len());

        for token in &self.tokens {
            if let Some(name) = token
                .strip_prefix('{')
                .and_then(|t| t.strip_suffix('}'))
            {
                if let Some(values) = vars.lists.get(name) {
                    args.extend(values.iter().cloned());
                    continue;
                }
            }

            let mut out = String::with_capacity(token.len());
            let mut last_end = 0;
            for cap in re.captures_iter(token) {
                let Some(whole) = cap.get(0) else {
                    continue;
                };
                let name = &cap[1];
                out.push_str(&token[last_end..whole.start()]);
                if let Some(value) = vars.scalars.get(name) {
                    out.push_str(value);
                } else if let Some(values) = vars.lists.get(name) {
                    out.push_str(&values.join(" "));
                } else {
                    return Err(ConfigError::UnknownPlaceholder {
                        template: self.kind,
                        placeholder: name.to_string(),
                    });
                }
                last_end = whole.end();
            }
            out.push_str(&token[last_end..]);
            if !out.is_empty() {
                args.push(out);
            }
        }

        Ok(args)
    }
}

/// Render an argument vector as a single shell-style command line
///
/// Arguments containing whitespace or shell metacharacters are single-quoted.
pub fn render_command(args: &[String]) -> String {
    args.iter()
        .map(|arg| quote_arg(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg.chars().any(|c| {
            c.is_whitespace() || matches!(c, '\'' | '"' | '\\' | '$' | '`' | '*' | '?' | '&' | '|' | ';' | '<' | '>' | '(' | ')')
        });
    if needs_quotes {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}
