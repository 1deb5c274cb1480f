//! Built-in stages the host can assemble into a chain by name.

use crate::stage::{StageFault, TransformChain, TransformStage};
use crate::EngineError;

pub const RON_TO_JSON: &str = "ron-to-json";
pub const JSON_PRETTY: &str = "json-pretty";
pub const JSON_COMPACT: &str = "json-compact";
pub const TRIM_TRAILING_WHITESPACE: &str = "trim-trailing-whitespace";

/// Names accepted by [`chain_from_names`].
pub const BUILTIN_STAGES: &[&str] = &[
    RON_TO_JSON,
    JSON_PRETTY,
    JSON_COMPACT,
    TRIM_TRAILING_WHITESPACE,
];

/// The compile-then-format chain used when nothing else is configured.
pub fn default_stage_names() -> Vec<String> {
    vec![RON_TO_JSON.to_string(), JSON_PRETTY.to_string()]
}

/// Compiles RON into compact JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct RonToJson;

impl TransformStage for RonToJson {
    fn name(&self) -> &str {
        RON_TO_JSON
    }

    fn apply(&self, input: &str) -> Result<String, StageFault> {
        let value: ron::Value =
            ron::from_str(input).map_err(|err| StageFault::new(err.to_string()))?;
        serde_json::to_string(&value).map_err(|err| StageFault::new(err.to_string()))
    }
}

/// Re-serializes JSON with indentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPretty;

impl TransformStage for JsonPretty {
    fn name(&self) -> &str {
        JSON_PRETTY
    }

    fn apply(&self, input: &str) -> Result<String, StageFault> {
        let value = parse_json(input)?;
        serde_json::to_string_pretty(&value).map_err(|err| StageFault::new(err.to_string()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCompact;

impl TransformStage for JsonCompact {
    fn name(&self) -> &str {
        JSON_COMPACT
    }

    fn apply(&self, input: &str) -> Result<String, StageFault> {
        let value = parse_json(input)?;
        serde_json::to_string(&value).map_err(|err| StageFault::new(err.to_string()))
    }
}

/// Strips trailing whitespace from every line. Never faults.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrimTrailingWhitespace;

impl TransformStage for TrimTrailingWhitespace {
    fn name(&self) -> &str {
        TRIM_TRAILING_WHITESPACE
    }

    fn apply(&self, input: &str) -> Result<String, StageFault> {
        let mut out = input
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
        if input.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

fn parse_json(input: &str) -> Result<serde_json::Value, StageFault> {
    serde_json::from_str(input).map_err(|err| StageFault::new(err.to_string()))
}

/// Builds a chain from built-in stage names, in the given order.
pub fn chain_from_names<S: AsRef<str>>(names: &[S]) -> Result<TransformChain, EngineError> {
    let mut chain = TransformChain::new();
    for name in names {
        match name.as_ref() {
            RON_TO_JSON => chain.push(RonToJson),
            JSON_PRETTY => chain.push(JsonPretty),
            JSON_COMPACT => chain.push(JsonCompact),
            TRIM_TRAILING_WHITESPACE => chain.push(TrimTrailingWhitespace),
            other => return Err(EngineError::UnknownStage(other.to_string())),
        }
    }
    Ok(chain)
}
