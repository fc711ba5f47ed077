//! Prompt template for the text-generation path.
//!
//! Templates are plain text with `{placeholder}` slots. Unknown placeholders
//! are left as-is so a custom template can contain literal braces.

use std::path::Path;

use once_cell::sync::Lazy;
use prospector_core::{LocalityRecord, MarketContext, QueryRequest, Result};
use regex::{Captures, Regex};

use crate::resources;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Built-in prompt wording.
pub const DEFAULT_TEMPLATE: &str = r#"You are a search optimization expert. Generate the MOST EFFECTIVE web search queries for finding email contacts of {industry} businesses in {region}.

Available elements:
Business types: {business_types}
Keyword variations: {keyword_variations}
Locations: {locations}
Email providers: {email_providers}
TLD options: {tlds}
Market: {market}

{provider_guidance}
{filters}
Draft {candidate_count} candidate queries, then keep the BEST {top_k} by:
1. Business term specificity (specific > generic)
2. Location coverage (major city and neighborhoods)
3. Email provider diversity
4. Query uniqueness (avoid repeating the same operator pattern)

Patterns to use:
- site:{tld} "business_type" "location" "@email_provider"
- "business_type" "neighborhood" "@email_provider"
- intitle:"business_type" "location" "@email_provider"
- filetype:pdf "business_type" "location" "@email_provider"

Return ONLY a JSON array of {top_k} strings: ["query1", "query2", ...]"#;

/// A prompt template with named placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Load a template from a text file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path)?;
        Ok(Self::new(template))
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fill the template for one request.
    pub fn render(
        &self,
        request: &QueryRequest,
        context: &MarketContext,
        locality: &LocalityRecord,
    ) -> String {
        let locations = resources::locations(locality, context);
        let providers = resources::providers(context);

        let provider_guidance = if request.personal_only {
            "Only target personal mailbox providers from the list above; never company domains."
        } else {
            "Spread queries evenly across the email providers."
        };

        let candidate_count = (request.top_k * 3).to_string();
        let top_k = request.top_k.to_string();
        let business_types = join_list(&context.primary_business_types);
        let keyword_variations = join_list(&context.keyword_variations);
        let locations = join_list(&locations);
        let email_providers = join_list(&providers);
        let tlds = join_list(&locality.business_tlds);
        let filters = filter_lines(request);
        let market = if context.is_b2b {
            "business-to-business"
        } else {
            "consumer-facing"
        };

        let slots: [(&str, &str); 13] = [
            ("industry", request.industry.trim()),
            ("region", request.region.trim()),
            ("top_k", top_k.as_str()),
            ("candidate_count", candidate_count.as_str()),
            ("business_types", business_types.as_str()),
            ("keyword_variations", keyword_variations.as_str()),
            ("locations", locations.as_str()),
            ("email_providers", email_providers.as_str()),
            ("tlds", tlds.as_str()),
            ("tld", locality.business_tlds.first().map_or(".com", String::as_str)),
            ("market", market),
            ("provider_guidance", provider_guidance),
            ("filters", filters.as_str()),
        ];

        // Single pass, so substituted text is never expanded again
        PLACEHOLDER_RE
            .replace_all(&self.template, |caps: &Captures| {
                slots
                    .iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
            })
            .into_owned()
    }
}

fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ")
}

fn filter_lines(request: &QueryRequest) -> String {
    let mut lines = String::new();
    let includes: Vec<&str> = request.include_terms().collect();
    if !includes.is_empty() {
        lines.push_str(&format!(
            "Every query must contain at least one of: {}\n",
            includes.join(", ")
        ));
    }
    let excludes: Vec<&str> = request.exclude_terms().collect();
    if !excludes.is_empty() {
        lines.push_str(&format!(
            "Do not target these sites: {}\n",
            excludes.join(", ")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MarketContext {
        MarketContext {
            primary_business_types: vec!["shop".into(), "cafe".into()],
            keyword_variations: vec!["bakery".into(), "gluten free".into()],
            location_areas: vec!["East Austin".into()],
            search_patterns: vec!["company_page".into()],
            is_b2b: false,
            suggested_email_domains: vec!["@gmail.com".into(), "@yahoo.com".into()],
        }
    }

    fn locality() -> LocalityRecord {
        LocalityRecord {
            primary_city: "Austin".into(),
            neighborhoods: vec![],
            metro_areas: vec!["Austin".into(), "Greater Austin".into()],
            local_names: vec!["Austin".into()],
            country_code: "US".into(),
            languages: vec!["en".into()],
            business_tlds: vec![".com".into(), ".org".into()],
        }
    }

    #[test]
    fn test_default_template_fills_every_slot() {
        let request = QueryRequest::new("bakery", "Austin", 5);
        let prompt = PromptTemplate::default().render(&request, &context(), &locality());

        assert!(prompt.contains("bakery businesses in Austin"));
        assert!(prompt.contains("Business types: shop, cafe"));
        assert!(prompt.contains("Email providers: gmail.com, yahoo.com"));
        assert!(prompt.contains("Draft 15 candidate queries"));
        assert!(prompt.contains("site:.com"));
        assert!(prompt.contains("Locations: Austin, Greater Austin, East Austin"));
        assert!(!prompt.contains("{top_k}"));
        assert!(!prompt.contains("{filters}"));
    }

    #[test]
    fn test_filters_and_personal_only() {
        let mut request = QueryRequest::new("bakery", "Austin", 5)
            .with_includes(&["organic"])
            .with_excludes(&["yelp.com"]);
        request.personal_only = true;
        let prompt = PromptTemplate::default().render(&request, &context(), &locality());

        assert!(prompt.contains("at least one of: organic"));
        assert!(prompt.contains("Do not target these sites: yelp.com"));
        assert!(prompt.contains("Only target personal mailbox providers"));
    }

    #[test]
    fn test_custom_template_keeps_unknown_placeholders() {
        let template = PromptTemplate::new("{industry} in {region}: {unknown} x{top_k}");
        let request = QueryRequest::new("florist", "Berlin", 3);
        assert_eq!(
            template.render(&request, &context(), &locality()),
            "florist in Berlin: {unknown} x3"
        );
    }

    #[test]
    fn test_substituted_text_is_not_expanded_again() {
        let template = PromptTemplate::new("{industry} / {region}\n{filters}");
        let request = QueryRequest::new("{filters}", "{top_k}", 3).with_includes(&["organic"]);
        assert_eq!(
            template.render(&request, &context(), &locality()),
            "{filters} / {top_k}\nEvery query must contain at least one of: organic\n"
        );
    }

    #[test]
    fn test_from_missing_file_is_io_error() {
        let err = PromptTemplate::from_file(Path::new("/nonexistent/prompt.txt")).unwrap_err();
        assert!(matches!(err, prospector_core::Error::Io(_)));
    }
}
