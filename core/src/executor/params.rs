use std::collections::BTreeMap;

use crate::error::{ActionError, ExecutorError};

use super::types::Task;

/// Declaration of a named task parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    /// Long flag alias, e.g. `branch` for `--branch`.
    pub long: String,
    /// Short flag alias, e.g. `b` for `-b`.
    pub short: Option<char>,
    pub default: String,
    /// Accepted values. `None` accepts anything.
    pub choices: Option<Vec<String>>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            long: name.clone(),
            name,
            short: None,
            default: default.into(),
            choices: None,
        }
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }
}

/// Values supplied on the command line for a run.
///
/// Named options are keyed by the flag alias they were given under (long
/// name or single-character short name); positional arguments keep their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    options: BTreeMap<String, String>,
    positional: Vec<String>,
}

impl CliArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_option(key, value);
        self
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn with_positional<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positional.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Parse a `KEY=VALUE` pair as given to `--param`.
    pub fn parse_pair(raw: &str) -> Option<(String, String)> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim().trim_start_matches('-');
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }
}

/// Parameter values bound for one task invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParams {
    values: BTreeMap<String, String>,
    positional: Vec<String>,
}

impl BoundParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Look up a parameter that actions depend on.
    pub fn require(&self, name: &str) -> Result<&str, ActionError> {
        self.get(name).ok_or_else(|| ActionError::MissingArgument {
            name: name.to_string(),
        })
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// The first positional argument, e.g. the artifact path.
    pub fn first_positional(&self) -> Result<&str, ActionError> {
        self.positional
            .first()
            .map(String::as_str)
            .ok_or_else(|| ActionError::MissingArgument {
                name: "positional argument".to_string(),
            })
    }

    /// Substitute `{name}` placeholders with bound values in a single pass.
    /// Inserted values are never scanned again.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let value = after
                .find('}')
                .and_then(|close| self.values.get(&after[..close]).map(|v| (close, v)));
            match value {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Bind every declared parameter of `task` from `cli`, falling back to defaults.
pub fn resolve(task: &Task, cli: &CliArgs) -> Result<BoundParams, ExecutorError> {
    let mut values = BTreeMap::new();

    for spec in &task.params {
        let supplied = cli
            .option(&spec.long)
            .or_else(|| spec.short.and_then(|short| cli.option(&short.to_string())));

        let value = match supplied {
            Some(v) => v.to_string(),
            None => spec.default.clone(),
        };

        if let Some(choices) = &spec.choices {
            if !choices.iter().any(|c| c == &value) {
                return Err(ExecutorError::InvalidArgument {
                    task: task.name.clone(),
                    name: spec.name.clone(),
                    value,
                    choices: choices.clone(),
                });
            }
        }

        values.insert(spec.name.clone(), value);
    }

    let positional = match &task.positional {
        Some(name) => {
            if cli.positional().is_empty() {
                return Err(ExecutorError::MissingArgument {
                    task: task.name.clone(),
                    name: name.clone(),
                });
            }
            cli.positional().to_vec()
        }
        None => Vec::new(),
    };

    Ok(BoundParams { values, positional })
}
