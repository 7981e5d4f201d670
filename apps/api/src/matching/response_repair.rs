//! Response repair: turns untrusted LLM output into a JSON object.
//!
//! Stages, first success wins:
//! 1. the whole body parses as an object
//! 2. a fenced code block parses, directly or after closing unbalanced delimiters
//! 3. with no fence, the first brace-delimited span parses, directly or after
//!    closing unbalanced delimiters
//! 4. `"key": value` pairs are scraped with a regex into a partial object
//!
//! When every stage fails the caller substitutes its neutral default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([A-Za-z_][A-Za-z0-9_]*)"\s*:\s*("(?:[^"\\]|\\.)*"|\[[^\]]*\]|-?\d+(?:\.\d+)?)"#)
        .expect("key-value regex is valid")
});

static QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("quoted-string regex is valid"));

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("response is empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON value is not an object")]
    NotAnObject,

    #[error("no brace-delimited object in response")]
    NoObject,

    #[error("no key-value pairs in response")]
    NoPairs,
}

/// Which stage produced the object. Logged by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStage {
    Direct,
    FencedBlock,
    FencedBlockBalanced,
    BraceSpan,
    BraceSpanBalanced,
    KeyValue,
}

#[derive(Debug, Clone)]
pub struct Repaired {
    pub object: Map<String, Value>,
    pub stage: RepairStage,
}

/// Runs the full repair chain over `text`.
pub fn repair_response(text: &str) -> Result<Repaired, RepairError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RepairError::Empty);
    }

    if let Ok(object) = parse_object(text) {
        return Ok(Repaired {
            object,
            stage: RepairStage::Direct,
        });
    }

    let structural = match fenced_block(text) {
        Some(inner) => parse_with_balancing(
            inner,
            RepairStage::FencedBlock,
            RepairStage::FencedBlockBalanced,
        ),
        None => brace_span(text).ok_or(RepairError::NoObject).and_then(|span| {
            parse_with_balancing(span, RepairStage::BraceSpan, RepairStage::BraceSpanBalanced)
        }),
    };

    structural.or_else(|_| {
        extract_key_values(text).map(|object| Repaired {
            object,
            stage: RepairStage::KeyValue,
        })
    })
}

/// Parses `text` and requires a JSON object at the top level.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, RepairError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(object) => Ok(object),
        _ => Err(RepairError::NotAnObject),
    }
}

fn parse_with_balancing(
    text: &str,
    direct: RepairStage,
    balanced: RepairStage,
) -> Result<Repaired, RepairError> {
    if let Ok(object) = parse_object(text) {
        return Ok(Repaired {
            object,
            stage: direct,
        });
    }
    parse_object(&balance_delimiters(text)).map(|object| Repaired {
        object,
        stage: balanced,
    })
}

/// Contents of the first ``` fence, language tag stripped. An unterminated
/// fence runs to the end of the text.
pub fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = text[start..].trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let end = rest.find("```").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// First `{ ... }` span, matched by depth outside string literals. If the
/// object never closes the span runs to the end of the text.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    Some(&text[start..])
}

/// Closes an unterminated string, drops a dangling comma, then appends the
/// missing `]`/`}` in nesting order.
pub fn balance_delimiters(text: &str) -> String {
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.last() == Some(&c) {
                    closers.pop();
                }
            }
            _ => {}
        }
    }

    let mut repaired = text.trim_end().to_string();
    if in_string {
        repaired.push('"');
    }
    if repaired.ends_with(',') {
        repaired.pop();
    }
    repaired.extend(closers.iter().rev());
    repaired
}

/// Scrapes `"key": "string" | [array] | number` pairs. The first occurrence
/// of a key wins.
pub fn extract_key_values(text: &str) -> Result<Map<String, Value>, RepairError> {
    let mut object = Map::new();

    for caps in KEY_VALUE_RE.captures_iter(text) {
        let key = caps[1].to_string();
        let raw = &caps[2];
        let value = match raw.chars().next() {
            Some('"') => serde_json::from_str::<String>(raw)
                .map(Value::String)
                .unwrap_or_else(|_| Value::String(raw.trim_matches('"').to_string())),
            Some('[') => serde_json::from_str::<Value>(raw).unwrap_or_else(|_| quoted_strings(raw)),
            _ => match serde_json::from_str::<Value>(raw) {
                Ok(number) => number,
                Err(_) => continue,
            },
        };
        object.entry(key).or_insert(value);
    }

    if object.is_empty() {
        Err(RepairError::NoPairs)
    } else {
        Ok(object)
    }
}

fn quoted_strings(raw: &str) -> Value {
    Value::Array(
        QUOTED_RE
            .captures_iter(raw)
            .map(|c| Value::String(c[1].to_string()))
            .collect(),
    )
}
