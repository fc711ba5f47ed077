//! Resource lists the prompt and the fallback rotation draw from.

use prospector_core::{LocalityRecord, MarketContext, EMAIL_PROVIDERS};

pub const MAX_LOCATIONS: usize = 15;

/// Keyword variations, then "{industry} {type}" for every business type.
pub fn business_terms(industry: &str, context: &MarketContext) -> Vec<String> {
    let industry = industry.trim();
    let combined = context
        .primary_business_types
        .iter()
        .map(|t| format!("{} {}", industry, t.trim()));

    let mut terms = distinct(
        context
            .keyword_variations
            .iter()
            .map(|v| v.trim().to_string())
            .chain(combined),
        usize::MAX,
    );
    if terms.is_empty() {
        terms.push(industry.to_string());
    }
    terms
}

/// City, neighborhoods, metro areas, then context areas.
pub fn locations(locality: &LocalityRecord, context: &MarketContext) -> Vec<String> {
    let names = locality
        .area_names()
        .chain(context.location_areas.iter().map(String::as_str))
        .map(|n| n.trim().to_string());
    distinct(names, MAX_LOCATIONS)
}

/// Provider domains without the leading `@`.
pub fn providers(context: &MarketContext) -> Vec<String> {
    let providers = distinct(
        context
            .suggested_email_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('@').to_string()),
        usize::MAX,
    );
    if providers.is_empty() {
        return EMAIL_PROVIDERS.iter().map(|p| p.to_string()).collect();
    }
    providers
}

pub fn tlds(locality: &LocalityRecord) -> Vec<String> {
    let tlds = distinct(locality.business_tlds.iter().cloned(), usize::MAX);
    if tlds.is_empty() {
        return vec![".com".to_string()];
    }
    tlds
}

/// Non-empty items, de-duplicated case-insensitively, first occurrence kept.
fn distinct(items: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if out.len() == limit {
            break;
        }
        if item.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(&item)) {
            continue;
        }
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MarketContext {
        MarketContext {
            primary_business_types: vec!["company".into(), "shop".into()],
            keyword_variations: vec!["bakery".into(), "Bakery Company".into()],
            location_areas: vec!["Austin".into(), "Hyde Park".into()],
            search_patterns: vec![],
            is_b2b: false,
            suggested_email_domains: vec!["@gmail.com".into(), "yahoo.com".into()],
        }
    }

    fn locality() -> LocalityRecord {
        LocalityRecord {
            primary_city: "Austin".into(),
            neighborhoods: vec![],
            metro_areas: vec!["Austin".into(), "Greater Austin".into()],
            local_names: vec![],
            country_code: "US".into(),
            languages: vec![],
            business_tlds: vec![],
        }
    }

    #[test]
    fn test_business_terms_order_and_dedup() {
        assert_eq!(
            business_terms("bakery", &context()),
            vec!["bakery", "Bakery Company", "bakery shop"]
        );
    }

    #[test]
    fn test_locations_dedup() {
        assert_eq!(
            locations(&locality(), &context()),
            vec!["Austin", "Greater Austin", "Hyde Park"]
        );
    }

    #[test]
    fn test_locations_capped() {
        let mut ctx = context();
        ctx.location_areas = (0..30).map(|i| format!("Area {}", i)).collect();
        assert_eq!(locations(&locality(), &ctx).len(), MAX_LOCATIONS);
    }

    #[test]
    fn test_providers_strip_at() {
        assert_eq!(providers(&context()), vec!["gmail.com", "yahoo.com"]);

        let mut ctx = context();
        ctx.suggested_email_domains.clear();
        assert_eq!(providers(&ctx).len(), EMAIL_PROVIDERS.len());
    }

    #[test]
    fn test_empty_tlds_default_to_com() {
        assert_eq!(tlds(&locality()), vec![".com"]);
    }
}
