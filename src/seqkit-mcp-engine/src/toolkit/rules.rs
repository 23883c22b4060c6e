//! Declarative parameter→flag mapping.
//!
//! Each tool declares its flag mapping as a constant table; turning
//! validated arguments into an argument vector is a single pass over that
//! table. Adding a parameter to a tool means adding a row, not a branch.

use serde_json::{Map, Value};

use crate::error::{EngineError, Result};

/// One row of a tool's flag table.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ArgRule {
    /// Boolean parameter: when true, emit the listed flags.
    Switch {
        param: &'static str,
        flags: &'static [&'static str],
    },
    /// Valued parameter: emit the flag followed by the value as text.
    Value {
        param: &'static str,
        flag: &'static str,
    },
    /// String-enum parameter: emit the flags the chosen value maps to.
    Choice {
        param: &'static str,
        choices: &'static [(&'static str, &'static [&'static str])],
    },
}

/// Apply a flag table to already-validated arguments.
///
/// Absent and `null` parameters are skipped; `false` switches emit nothing.
pub(crate) fn apply(
    rules: &[ArgRule],
    args: &Map<String, Value>,
    argv: &mut Vec<String>,
) -> Result<()> {
    for rule in rules {
        match rule {
            ArgRule::Switch { param, flags } => match args.get(*param) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => {}
                Some(Value::Bool(true)) => {
                    argv.extend(flags.iter().map(|f| f.to_string()));
                }
                Some(other) => {
                    return Err(EngineError::Validation(format!(
                        "'{param}' must be a boolean, got {other}"
                    )));
                }
            },
            ArgRule::Value { param, flag } => match args.get(*param) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => {
                    argv.push(flag.to_string());
                    argv.push(s.clone());
                }
                Some(Value::Number(n)) => {
                    argv.push(flag.to_string());
                    argv.push(n.to_string());
                }
                Some(other) => {
                    return Err(EngineError::Validation(format!(
                        "'{param}' must be a string or number, got {other}"
                    )));
                }
            },
            ArgRule::Choice { param, choices } => match args.get(*param) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => {
                    let Some((_, flags)) = choices.iter().find(|(name, _)| *name == s.as_str())
                    else {
                        let allowed: Vec<&str> = choices.iter().map(|(name, _)| *name).collect();
                        return Err(EngineError::Validation(format!(
                            "'{param}' must be one of {allowed:?}, got {s:?}"
                        )));
                    };
                    argv.extend(flags.iter().map(|f| f.to_string()));
                }
                Some(other) => {
                    return Err(EngineError::Validation(format!(
                        "'{param}' must be a string, got {other}"
                    )));
                }
            },
        }
    }
    Ok(())
}
