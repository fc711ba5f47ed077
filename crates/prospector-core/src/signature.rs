//! Structural fingerprints for near-duplicate query detection.
//!
//! A signature keeps only the operator keywords a query uses and the class of
//! mailbox it targets. Literal terms, locations and the concrete provider are
//! discarded, so `"bakery" "@gmail.com"` and `"florist" "@yahoo.com"` collide.

use serde::Serialize;

use crate::config::EMAIL_PROVIDERS;

/// Operator keywords that define a query's structure.
pub const SEARCH_OPERATORS: &[&str] = &["site:", "intitle:", "inurl:", "filetype:", "intext:"];

const PROVIDER_PLACEHOLDER: &str = "{provider}";

/// Which kind of mailbox a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderClass {
    /// One of the known personal providers.
    Known,
    /// Some other `@domain`.
    Custom,
    None,
}

impl ProviderClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Known => "email",
            Self::Custom => "domain",
            Self::None => "none",
        }
    }
}

/// Normalized structural fingerprint of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PatternSignature(String);

impl PatternSignature {
    /// Compute the signature of a query.
    ///
    /// Negated operators (`-site:`) are ignored so that appending exclusion
    /// clauses never changes a query's signature.
    pub fn of(query: &str) -> Self {
        let mut normalized = query.to_lowercase();
        for provider in EMAIL_PROVIDERS {
            normalized = normalized.replace(provider, PROVIDER_PLACEHOLDER);
        }
        normalized.retain(|c| c != '"' && c != '\'');

        let mut operators: Vec<&str> = Vec::new();
        let mut class = ProviderClass::None;
        for token in normalized.split_whitespace() {
            if token.starts_with('-') {
                continue;
            }
            if let Some(op) = SEARCH_OPERATORS.iter().find(|op| token.starts_with(**op)) {
                if !operators.contains(op) {
                    operators.push(op);
                }
            }
            if token.contains(PROVIDER_PLACEHOLDER) {
                class = ProviderClass::Known;
            } else if class == ProviderClass::None && is_domain_mention(token) {
                class = ProviderClass::Custom;
            }
        }

        Self(format!("{}|{}", operators.join(" "), class.as_str()))
    }

    /// Operator keywords in first-occurrence order.
    pub fn operators(&self) -> impl Iterator<Item = &str> {
        self.structure().split_whitespace()
    }

    /// Whether the query uses no operator at all.
    pub fn is_plain(&self) -> bool {
        self.structure().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn structure(&self) -> &str {
        self.0.split('|').next().unwrap_or("")
    }
}

impl std::fmt::Display for PatternSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_domain_mention(token: &str) -> bool {
    token
        .split_once('@')
        .map(|(_, domain)| domain.contains('.') && domain.len() > 2)
        .unwrap_or(false)
}
