//! Garbage filtering for tokens pulled out of search results.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens shorter than this are dropped.
pub const MIN_TOKEN_LEN: usize = 4;

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
// snake_case identifiers such as `company_page`
static METADATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)+$").unwrap());
static EMAIL_DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.+-]*@[\w-]+(?:\.[\w-]+)+$").unwrap());
static ACRONYM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,}$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:https?://|www\.)").unwrap());

/// Whether a token looks like scraping noise rather than a usable term.
pub fn is_garbage(token: &str) -> bool {
    let token = token.trim();
    token.chars().count() < MIN_TOKEN_LEN
        || DIGITS_RE.is_match(token)
        || METADATA_RE.is_match(token)
        || EMAIL_DOMAIN_RE.is_match(token)
        || ACRONYM_RE.is_match(token)
        || URL_RE.is_match(token)
}

/// Drop garbage, de-duplicate case-insensitively and keep at most `limit`.
pub fn clean_tokens<I, S>(tokens: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cleaned: Vec<String> = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        if is_garbage(token) {
            continue;
        }
        if cleaned.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            continue;
        }
        cleaned.push(token.to_string());
        if cleaned.len() == limit {
            break;
        }
    }
    cleaned
}
