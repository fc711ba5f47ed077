//! Strict parsing of model output into a list of query strings.
//!
//! Accepts a JSON array of strings, optionally fenced or wrapped in prose,
//! or a block of line-delimited queries. Anything else is an error; partial
//! results never leave this module.

use once_cell::sync::Lazy;
use prospector_core::Error;
use regex::Regex;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*\n?(.*?)```").unwrap());
// "1. ", "2) ", "- ", "* " list markers
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+").unwrap());

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty output")]
    Empty,

    #[error("array element {0} is not a string")]
    NonStringElement(usize),

    #[error("invalid JSON array: {0}")]
    InvalidJson(String),

    #[error("no query list found")]
    NoQueries,
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::MalformedOutput(e.to_string())
    }
}

/// Parse raw model text into an ordered list of non-empty queries.
pub fn parse_query_list(raw: &str) -> Result<Vec<String>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let body = FENCE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str())
        .trim();

    if body.contains('[') {
        return first_array(body);
    }

    parse_lines(body)
}

/// The first well-formed array of strings, trying each `[` in turn.
///
/// Text after the array is ignored, so bracketed prose around the payload
/// does not spoil it. When nothing qualifies, the first error is returned.
fn first_array(body: &str) -> Result<Vec<String>, ParseError> {
    let mut first_error = None;
    for (start, _) in body.match_indices('[') {
        let parsed = serde_json::Deserializer::from_str(&body[start..])
            .into_iter::<Vec<serde_json::Value>>()
            .next();
        let result = match parsed {
            Some(Ok(values)) => strings_from(values),
            Some(Err(e)) => Err(ParseError::InvalidJson(e.to_string())),
            None => Err(ParseError::InvalidJson("unterminated array".into())),
        };
        match result {
            Ok(queries) => return Ok(queries),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| ParseError::InvalidJson("unterminated array".into())))
}

fn strings_from(values: Vec<serde_json::Value>) -> Result<Vec<String>, ParseError> {
    let mut queries = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match value {
            serde_json::Value::String(s) => {
                let s = s.trim();
                if !s.is_empty() {
                    queries.push(s.to_string());
                }
            }
            _ => return Err(ParseError::NonStringElement(i)),
        }
    }

    if queries.is_empty() {
        return Err(ParseError::NoQueries);
    }
    Ok(queries)
}

/// First contiguous block of lines that look like queries.
fn parse_lines(body: &str) -> Result<Vec<String>, ParseError> {
    let mut queries: Vec<String> = Vec::new();
    for line in body.lines() {
        let candidate = clean_line(line);
        let looks_like_query = candidate.contains('"') || candidate.contains('@');
        if looks_like_query {
            queries.push(candidate);
        } else if !queries.is_empty() {
            break;
        }
    }

    if queries.is_empty() {
        return Err(ParseError::NoQueries);
    }
    Ok(queries)
}

fn clean_line(line: &str) -> String {
    let line = LIST_MARKER_RE.replace(line.trim(), "");
    let line = line.trim().trim_end_matches(',').trim();

    // A line wrapped in single quotes, or in double quotes with no inner quotes
    let unwrapped = line
        .strip_prefix('\'')
        .and_then(|l| l.strip_suffix('\''))
        .or_else(|| {
            line.strip_prefix('"')
                .and_then(|l| l.strip_suffix('"'))
                .filter(|inner| !inner.contains('"'))
        })
        .unwrap_or(line);
    unwrapped.trim().to_string()
}
