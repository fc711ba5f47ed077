//! Signal extraction from a search result set.

use prospector_core::MarketContext;
use regex::Regex;

use crate::filters::clean_tokens;
use crate::provider::{LocalResult, OrganicResult, SearchResultSet};

pub const MAX_BUSINESS_TYPES: usize = 5;
pub const MAX_VARIATIONS: usize = 5;
pub const MAX_LOCATION_AREAS: usize = 8;
pub const MAX_SEARCH_PATTERNS: usize = 3;

/// Only the first few results are inspected for B2B terms and link shapes.
const HEAD_RESULTS: usize = 5;

/// Organizational nouns that mark a business type.
pub const BUSINESS_NOUNS: &[&str] = &[
    "agency",
    "firm",
    "company",
    "contractor",
    "studio",
    "consultancy",
    "partners",
    "group",
    "services",
    "solutions",
    "center",
    "clinic",
    "shop",
    "store",
    "restaurant",
    "cafe",
];

pub const B2B_INDICATORS: &[&str] = &[
    "wholesale",
    "supplier",
    "manufacturer",
    "distributor",
    "b2b",
    "enterprise",
    "solutions",
    "consulting",
];

/// Link fragment → search-pattern label, first match wins.
const LINK_PATTERNS: &[(&[&str], &str)] = &[
    (&["directory", "yellowpages"], "directory_listing"),
    (&["linkedin"], "professional_profile"),
    (&[".org"], "organization"),
    (&["about", "contact"], "company_page"),
];

const GENERIC_BUSINESS_TYPES: &[&str] = &["company", "firm", "services", "agency"];
const DEFAULT_SEARCH_PATTERN: &str = "company_page";
const FALLBACK_SEARCH_PATTERNS: &[&str] = &["company_page", "directory_listing"];

const PERSONAL_DOMAINS: &[&str] = &[
    "@gmail.com",
    "@yahoo.com",
    "@outlook.com",
    "@hotmail.com",
    "@aol.com",
];
const BUSINESS_LEANING_DOMAINS: &[&str] =
    &["@gmail.com", "@outlook.com", "@company.com", "@yahoo.com"];
const FALLBACK_DOMAINS: &[&str] = &["@gmail.com", "@yahoo.com", "@outlook.com", "@hotmail.com"];
const BUSINESS_KEYWORDS: &[&str] = &["consulting", "enterprise", "wholesale"];

/// Business-type nouns co-occurring with `keyword` in titles and snippets.
pub fn business_types(organic: &[OrganicResult], keyword: &str) -> Vec<String> {
    let keyword = keyword.trim().to_lowercase();
    let mut found: Vec<&str> = Vec::new();

    for result in organic {
        let text = format!("{} {}", result.title, result.snippet).to_lowercase();
        if keyword.is_empty() || !text.contains(&keyword) {
            continue;
        }
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if let Some(noun) = BUSINESS_NOUNS.iter().find(|n| **n == token) {
                if !found.contains(noun) {
                    found.push(noun);
                }
            }
        }
    }

    clean_tokens(found, MAX_BUSINESS_TYPES)
}

/// Sub-areas parsed from local-result addresses.
///
/// An address such as `12 Main St, East Austin, Austin` yields `East Austin`:
/// the second-to-last comma segment, unless it names the region itself.
pub fn location_areas(local: &[LocalResult], region: &str) -> Vec<String> {
    let region = region.trim();
    let areas = local.iter().filter_map(|result| {
        let parts: Vec<&str> = result
            .address
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 2 {
            return None;
        }
        let area = parts[parts.len() - 2];
        (!area.eq_ignore_ascii_case(region)).then_some(area)
    });

    clean_tokens(areas, MAX_LOCATION_AREAS)
}

/// The keyword followed by related searches with the keyword stripped out.
pub fn keyword_variations(related: &[String], keyword: &str) -> Vec<String> {
    let keyword = keyword.trim();
    let mut variations = vec![keyword.to_string()];
    if keyword.is_empty() {
        return variations;
    }

    let pattern = match Regex::new(&format!("(?i){}", regex::escape(keyword))) {
        Ok(re) => re,
        Err(_) => return variations,
    };

    let stripped = related
        .iter()
        .filter(|phrase| pattern.is_match(phrase))
        .map(|phrase| {
            pattern
                .replace_all(phrase, " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|phrase| phrase.chars().count() > 2);

    for variation in clean_tokens(stripped, MAX_VARIATIONS) {
        if variations.len() == MAX_VARIATIONS {
            break;
        }
        if !variations.iter().any(|v| v.eq_ignore_ascii_case(&variation)) {
            variations.push(variation);
        }
    }
    variations
}

/// Whether the leading snippets read like a business-to-business market.
pub fn is_b2b(organic: &[OrganicResult]) -> bool {
    organic.iter().take(HEAD_RESULTS).any(|result| {
        let snippet = result.snippet.to_lowercase();
        B2B_INDICATORS.iter().any(|term| snippet.contains(term))
    })
}

/// Pattern labels inferred from the leading result links.
pub fn search_patterns(organic: &[OrganicResult]) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();
    for result in organic.iter().take(HEAD_RESULTS) {
        let link = result.link.to_lowercase();
        let label = LINK_PATTERNS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| link.contains(n)))
            .map(|(_, label)| *label);
        if let Some(label) = label {
            if !patterns.iter().any(|p| p == label) {
                patterns.push(label.to_string());
            }
        }
        if patterns.len() == MAX_SEARCH_PATTERNS {
            break;
        }
    }

    if patterns.is_empty() {
        patterns.push(DEFAULT_SEARCH_PATTERN.to_string());
    }
    patterns
}

/// Mailbox domains worth targeting for an industry.
pub fn suggested_email_domains(keyword: &str) -> Vec<String> {
    let keyword = keyword.to_lowercase();
    let domains = if BUSINESS_KEYWORDS.iter().any(|k| keyword.contains(k)) {
        BUSINESS_LEANING_DOMAINS
    } else {
        PERSONAL_DOMAINS
    };
    to_owned(domains)
}

/// Build a context from provider results, substituting defaults for any
/// field that came back empty.
pub fn context_from_results(
    results: &SearchResultSet,
    keyword: &str,
    location: &str,
) -> MarketContext {
    let mut primary_business_types = business_types(&results.organic, keyword);
    if primary_business_types.is_empty() {
        primary_business_types = to_owned(GENERIC_BUSINESS_TYPES);
    }

    let mut location_areas = location_areas(&results.local, location);
    if location_areas.is_empty() {
        location_areas = generic_areas(location);
    }

    MarketContext {
        primary_business_types,
        keyword_variations: keyword_variations(&results.related, keyword),
        location_areas,
        search_patterns: search_patterns(&results.organic),
        is_b2b: is_b2b(&results.organic),
        suggested_email_domains: suggested_email_domains(keyword),
    }
}

/// Content-free context used whenever the provider cannot be relied on.
pub fn fallback_context(keyword: &str, location: &str) -> MarketContext {
    MarketContext {
        primary_business_types: to_owned(GENERIC_BUSINESS_TYPES),
        keyword_variations: vec![keyword.trim().to_string()],
        location_areas: generic_areas(location),
        search_patterns: to_owned(FALLBACK_SEARCH_PATTERNS),
        is_b2b: false,
        suggested_email_domains: to_owned(FALLBACK_DOMAINS),
    }
}

fn generic_areas(location: &str) -> Vec<String> {
    let location = location.trim();
    vec![
        location.to_string(),
        format!("Greater {}", location),
        format!("{} Area", location),
    ]
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
