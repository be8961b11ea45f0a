//! Reading a decision out of LLM reply text.
//!
//! Models are asked for three labelled lines (`ACTION:`, `TARGET:`,
//! `REASONING:`) but do not always comply. Recovery strategies, in order:
//!
//! 1. Labelled lines anywhere in the text, tolerating markdown emphasis
//!    and list bullets
//! 2. A JSON object `{"action", "target", "reasoning"}`, plain or fenced,
//!    with trailing commas stripped if needed
//!
//! Nothing here validates the decision. A reply that yields nothing comes
//! back with an empty action, which the normalizer turns into a stand-down.

use standoff_core::normalize::find_target;
use standoff_types::{GameState, RawDecision};
use tracing::warn;

use crate::error::RunnerError;

/// Fields pulled out of a reply before target resolution.
#[derive(Debug, Default, PartialEq, Eq, serde::Deserialize)]
struct Reply {
    action: String,
    #[serde(default, alias = "target_id")]
    target: Option<String>,
    #[serde(default)]
    reasoning: String,
}

/// Parse reply text into a [`RawDecision`].
///
/// Target names are resolved to agent ids, ignoring case. A target that
/// matches nobody is passed through as written.
pub fn parse_reply(text: &str, state: &GameState) -> RawDecision {
    match try_parse(text) {
        Ok(reply) => into_raw(reply, state),
        Err(e) => {
            warn!(
                error = %e,
                raw_response = text,
                "failed to parse LLM reply, leaving action empty"
            );
            RawDecision::default()
        }
    }
}

fn try_parse(text: &str) -> Result<Reply, RunnerError> {
    if let Some(reply) = parse_labelled_lines(text) {
        return Ok(reply);
    }
    parse_json(text)
}

fn into_raw(reply: Reply, state: &GameState) -> RawDecision {
    let target_id = reply.target.map(|reference| {
        find_target(state, &reference).map_or(reference, |agent| agent.id.as_str().to_owned())
    });
    RawDecision {
        action: reply.action,
        target_id,
        reasoning: reply.reasoning,
    }
}

// ---------------------------------------------------------------------------
// Labelled lines
// ---------------------------------------------------------------------------

fn parse_labelled_lines(text: &str) -> Option<Reply> {
    let mut reply = Reply::default();
    let mut found_action = false;
    let mut lines = text.lines().map(strip_bullet);

    while let Some(line) = lines.next() {
        if let Some(value) = labelled(line, "ACTION") {
            if !found_action {
                reply.action = action_word(value);
                found_action = true;
            }
        } else if let Some(value) = labelled(line, "TARGET") {
            let name = trim_decoration(value);
            if reply.target.is_none() && !name.is_empty() {
                reply.target = Some(name.to_owned());
            }
        } else if let Some(value) = labelled(line, "REASONING") {
            if reply.reasoning.is_empty() {
                let first = if value.is_empty() {
                    lines.by_ref().find(|l| !l.is_empty()).unwrap_or_default()
                } else {
                    value
                };
                reply.reasoning = first.to_owned();
            }
        }
    }

    found_action.then_some(reply)
}

/// Drop list bullets, quote markers, and heading hashes from a line.
fn strip_bullet(line: &str) -> &str {
    line.trim().trim_start_matches(['-', '>', '#', ' ']).trim()
}

/// The value after `label:` if `line` starts with that label.
///
/// Accepts `**ACTION:** x` and `**ACTION**: x` as well as the bare form.
fn labelled<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let line = line.trim_start_matches('*');
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = line.get(label.len()..)?.trim_start_matches('*');
    let value = rest.strip_prefix(':')?;
    Some(value.trim().trim_start_matches('*').trim())
}

/// Trim quotes, brackets, emphasis, and trailing punctuation.
fn trim_decoration(value: &str) -> &str {
    value.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
}

/// The action keyword from an `ACTION:` value.
///
/// Keeps the whole value when it is a single phrase like `stand down`,
/// otherwise only the first word, so `strike IRON` still reads as a strike.
fn action_word(value: &str) -> String {
    let whole = trim_decoration(value);
    if whole.parse::<standoff_types::Action>().is_ok() {
        return whole.to_lowercase();
    }
    whole
        .split_whitespace()
        .next()
        .map(trim_decoration)
        .unwrap_or_default()
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// JSON fallback
// ---------------------------------------------------------------------------

fn parse_json(text: &str) -> Result<Reply, RunnerError> {
    let trimmed = text.trim();

    // Strategy 1: direct parse
    if let Ok(reply) = serde_json::from_str::<Reply>(trimmed) {
        return Ok(reply);
    }

    // Strategy 2: fenced code block
    let fenced = extract_json_from_codeblock(trimmed);
    if let Some(reply) = fenced.and_then(|block| serde_json::from_str::<Reply>(block).ok()) {
        return Ok(reply);
    }

    // Strategy 3: trailing commas, fenced or not
    let source = fenced.unwrap_or(trimmed);
    serde_json::from_str::<Reply>(&strip_trailing_commas(source))
        .map_err(|e| RunnerError::Parse(format!("no ACTION line and no decision object: {e}")))
}

/// Extract the body of the first markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    // Skip an info string such as `json` up to the end of the line.
    let body_start = after_fence.find('\n').map_or(0, |nl| nl.saturating_add(1));
    let body = after_fence.get(body_start..)?;
    let close = body.find("```")?;
    body.get(..close).map(str::trim)
}

/// Strip commas directly before a closing brace or bracket.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == ',' {
            let rest: String = chars.clone().skip_while(|n| n.is_whitespace()).take(1).collect();
            if rest == "}" || rest == "]" {
                continue;
            }
        }
        result.push(c);
    }

    result
}
