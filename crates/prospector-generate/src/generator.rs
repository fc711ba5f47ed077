//! Query generation: one model call, deterministic fallback on any failure.

use std::sync::Arc;
use std::time::Duration;

use prospector_core::{Error, GeneratedQuery, LocalityRecord, MarketContext, QueryRequest, Result};
use prospector_llm::{GenerationParams, TextGenerator};
use tracing::{debug, info, warn};

use crate::parse::parse_query_list;
use crate::prompt::PromptTemplate;
use crate::resources;
use crate::rotation::{FallbackResources, FallbackSequence};

/// Padding gives up after this many candidates per missing query.
const PAD_ATTEMPTS_PER_SLOT: usize = 8;

/// Where a batch of queries came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    Model { model: String },
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub queries: Vec<GeneratedQuery>,
    pub source: GenerationSource,
    /// First fallback slot not yet used, for padding.
    pub next_slot: usize,
}

impl Generation {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, GenerationSource::Fallback { .. })
    }

    pub fn model(&self) -> Option<&str> {
        match &self.source {
            GenerationSource::Model { model } => Some(model),
            GenerationSource::Fallback { .. } => None,
        }
    }
}

/// Prompt-driven generator with a template-rotation fallback.
pub struct QueryGenerator {
    model: Option<Arc<dyn TextGenerator>>,
    template: PromptTemplate,
    params: GenerationParams,
    timeout: Duration,
}

impl QueryGenerator {
    pub fn new(model: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self {
            model,
            template: PromptTemplate::default(),
            params: GenerationParams::default(),
            timeout,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Configured model name, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model())
    }

    /// Fewest model queries worth keeping: half of `top_k`, rounded up.
    pub fn min_viable(top_k: usize) -> usize {
        top_k.div_ceil(2).max(1)
    }

    /// Generate queries for a request. Never fails.
    pub async fn generate(
        &self,
        request: &QueryRequest,
        context: &MarketContext,
        locality: &LocalityRecord,
    ) -> Generation {
        match self.generate_with_model(request, context, locality).await {
            Ok((queries, model)) => {
                info!("Model {} generated {} queries", model, queries.len());
                Generation {
                    queries: queries.into_iter().map(GeneratedQuery::new).collect(),
                    source: GenerationSource::Model { model },
                    next_slot: 0,
                }
            }
            Err(e) => {
                warn!("Query generation falling back to templates: {}", e);
                Generation {
                    queries: Self::fallback(request, context, locality),
                    source: GenerationSource::Fallback {
                        reason: e.to_string(),
                    },
                    next_slot: request.top_k,
                }
            }
        }
    }

    async fn generate_with_model(
        &self,
        request: &QueryRequest,
        context: &MarketContext,
        locality: &LocalityRecord,
    ) -> Result<(Vec<String>, String)> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::ProviderUnavailable("no text generator configured".into()))?;

        let prompt = self.template.render(request, context, locality);
        debug!("Prompt is {} characters", prompt.len());

        let completion = tokio::time::timeout(self.timeout, model.complete(&prompt, &self.params))
            .await
            .map_err(|_| {
                Error::ProviderUnavailable(format!(
                    "text generation timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let queries = parse_query_list(&completion.text)?;
        let needed = Self::min_viable(request.top_k);
        if queries.len() < needed {
            return Err(Error::InsufficientOutput {
                got: queries.len(),
                needed,
            });
        }
        Ok((queries, completion.model))
    }

    /// Deterministic template rotation, exactly `top_k` queries.
    pub fn fallback(
        request: &QueryRequest,
        context: &MarketContext,
        locality: &LocalityRecord,
    ) -> Vec<GeneratedQuery> {
        let resources = fallback_resources(request, context, locality);
        resources
            .sequence()
            .take(request.top_k)
            .map(|slot| GeneratedQuery::new(slot.render()))
            .collect()
    }

    /// Continue the fallback sequence from `start` to produce up to `needed`
    /// new queries.
    ///
    /// Candidates already present in `existing` (also with clauses appended,
    /// such as `-site:` exclusions) or that miss the request's include terms
    /// are skipped. Once the sequence runs out of new texts, slots repeat.
    pub fn pad(
        request: &QueryRequest,
        context: &MarketContext,
        locality: &LocalityRecord,
        existing: &[GeneratedQuery],
        needed: usize,
        start: usize,
    ) -> Vec<GeneratedQuery> {
        if needed == 0 {
            return Vec::new();
        }

        let resources = fallback_resources(request, context, locality);
        let mut seen: Vec<String> = existing.iter().map(|q| q.text.trim().to_string()).collect();
        let mut padded = Vec::with_capacity(needed);
        let attempts = needed * PAD_ATTEMPTS_PER_SLOT;

        let candidates = FallbackSequence::starting_at(&resources, start)
            .take(attempts)
            .map(|slot| slot.render());
        for text in candidates {
            if is_present(&seen, &text) || !request.matches_includes(&text) {
                continue;
            }
            seen.push(text.clone());
            padded.push(GeneratedQuery::new(text));
            if padded.len() == needed {
                return padded;
            }
        }

        let repeats = FallbackSequence::starting_at(&resources, start)
            .take(attempts)
            .map(|slot| slot.render())
            .filter(|text| request.matches_includes(text))
            .take(needed - padded.len())
            .collect::<Vec<_>>();
        if !repeats.is_empty() {
            debug!("Padding repeats {} fallback slots", repeats.len());
        }
        padded.extend(repeats.into_iter().map(GeneratedQuery::new));

        if padded.len() < needed {
            warn!(
                "Padding produced {} of {} queries",
                padded.len(),
                needed
            );
        }
        padded
    }
}

/// Whether `text` is in `seen`, either verbatim or followed by extra clauses.
fn is_present(seen: &[String], text: &str) -> bool {
    seen.iter().any(|s| {
        s == text
            || s.strip_prefix(text)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

fn fallback_resources(
    request: &QueryRequest,
    context: &MarketContext,
    locality: &LocalityRecord,
) -> FallbackResources {
    FallbackResources {
        terms: resources::business_terms(&request.industry, context),
        locations: resources::locations(locality, context),
        providers: resources::providers(context),
        tlds: resources::tlds(locality),
    }
}
