use tracing::{debug, info, warn};

use super::cache::{normalize_name, ResolutionCache};
use crate::config::TuneGraphConfig;
use crate::errors::Result;
use crate::knowledge::{ExactLabelQuery, KnowledgeService, LabelCorpusQuery};
use crate::types::*;

/// Matching parameters for an [`ArtistResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    pub direct_kinds: Vec<String>,
    pub fuzzy_kind: String,
    pub language: String,
    pub direct_limit: u32,
    pub corpus_limit: u32,
    pub fuzzy_threshold: u8,
    pub fallback_policy: FallbackPolicy,
    pub use_cache: bool,
}

impl ResolverSettings {
    pub fn from_config(config: &TuneGraphConfig) -> Self {
        Self {
            direct_kinds: config.direct_kinds.clone(),
            fuzzy_kind: config.fuzzy_kind.clone(),
            language: config.language.clone(),
            direct_limit: config.direct_limit,
            corpus_limit: config.corpus_limit,
            fuzzy_threshold: config.fuzzy_threshold,
            fallback_policy: config.fallback_policy,
            use_cache: config.enable_cache,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from_config(&TuneGraphConfig::default())
    }
}

/// Similarity of two strings on a 0-100 scale, ignoring case.
///
/// Indel-normalized: `(1 - indel_distance / (len_a + len_b)) * 100`, rounded.
/// Insertions cost one edit each, so a name missing a leading article still
/// scores high ("Rolling Stones" vs "The Rolling Stones" is 88).
pub fn similarity_ratio(a: &str, b: &str) -> u8 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let ratio = rapidfuzz::fuzz::ratio(a.chars(), b.chars());
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Resolves artist names to canonical knowledge-base identifiers.
///
/// Strategies are tried in order, and the first that produces an answer wins:
/// 1. **Cache** -- a previous outcome for the same whitespace-normalized name.
/// 2. **Direct phase** -- exact-label lookup among the accepted entity kinds.
///    A candidate whose label equals the name case-insensitively is an
///    `Exact` match. Otherwise the [`FallbackPolicy`] decides whether the first
///    candidate is returned as `DirectFallback`.
/// 3. **Fuzzy phase** -- only when the direct phase produced nothing usable.
///    The best-scoring corpus label wins if it reaches the threshold.
///
/// Query failures never reach the caller: they are logged and treated as an
/// empty answer. Outcomes produced while a query was failing are not cached.
pub struct ArtistResolver<S> {
    service: S,
    settings: ResolverSettings,
    cache: ResolutionCache,
}

impl<S: KnowledgeService> ArtistResolver<S> {
    pub fn new(service: S, settings: ResolverSettings) -> Self {
        Self::with_cache(service, settings, ResolutionCache::new())
    }

    pub fn with_cache(service: S, settings: ResolverSettings, cache: ResolutionCache) -> Self {
        Self {
            service,
            settings,
            cache,
        }
    }

    /// Returns the canonical identifier for `name`, or `None` if not found.
    pub fn resolve(&mut self, name: &str) -> Option<String> {
        self.resolve_detailed(name).canonical_id
    }

    /// Resolves `name` and reports which strategy produced the answer.
    pub fn resolve_detailed(&mut self, name: &str) -> ResolutionResult {
        if name.trim().is_empty() {
            return ResolutionResult::unresolved(name);
        }

        if self.settings.use_cache {
            if let Some(cached) = self.cache.get(name) {
                debug!(artist = %name, tier = cached.confidence_tier.as_str(), "cache hit");
                return cached;
            }
        }

        let mut degraded = false;
        let result = self.run_phases(name, &mut degraded);

        match &result.canonical_id {
            Some(id) => info!(
                artist = %name,
                id = %id,
                tier = result.confidence_tier.as_str(),
                "resolved artist"
            ),
            None => info!(artist = %name, degraded, "artist not found"),
        }

        if self.settings.use_cache && !degraded {
            self.cache.insert(&result);
        }
        result
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Consumes the resolver, returning its cache for persistence.
    pub fn into_cache(self) -> ResolutionCache {
        self.cache
    }

    // ------------------------------------------------------------------
    // Private helpers
    // ------------------------------------------------------------------

    fn run_phases(&self, name: &str, degraded: &mut bool) -> ResolutionResult {
        let settings = &self.settings;
        let label = normalize_name(name);

        let direct = ExactLabelQuery {
            label: &label,
            kinds: &settings.direct_kinds,
            language: &settings.language,
            limit: settings.direct_limit,
        };
        let candidates = self.run_query(name, "direct", degraded, |service| {
            service.exact_label(&direct)
        });

        if let Some(hit) = candidates.iter().find(|c| label_matches(c, &label)) {
            return found(name, &hit.id, ConfidenceTier::Exact);
        }

        if let Some(first) = candidates.first() {
            match settings.fallback_policy {
                FallbackPolicy::FirstCandidate => {
                    return found(name, &first.id, ConfidenceTier::DirectFallback);
                }
                FallbackPolicy::Reject => debug!(
                    artist = %name,
                    candidates = candidates.len(),
                    "no direct candidate matched the label; continuing with fuzzy phase"
                ),
            }
        }

        let corpus_query = LabelCorpusQuery {
            kind: &settings.fuzzy_kind,
            language: &settings.language,
            limit: settings.corpus_limit,
        };
        let corpus = self.run_query(name, "fuzzy", degraded, |service| {
            service.label_corpus(&corpus_query)
        });

        match best_fuzzy_match(&label, &corpus) {
            Some((candidate, score)) if score >= settings.fuzzy_threshold => {
                debug!(artist = %name, score, label = ?candidate.label, "fuzzy match accepted");
                found(name, &candidate.id, ConfidenceTier::Fuzzy)
            }
            Some((candidate, score)) => {
                debug!(artist = %name, score, label = ?candidate.label, "best fuzzy match below threshold");
                ResolutionResult::unresolved(name)
            }
            None => ResolutionResult::unresolved(name),
        }
    }

    /// Runs one knowledge-service call, turning a failure into an empty answer.
    fn run_query<F>(&self, name: &str, phase: &str, degraded: &mut bool, call: F) -> Vec<Candidate>
    where
        F: FnOnce(&S) -> Result<Vec<Candidate>>,
    {
        match call(&self.service) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(artist = %name, phase, error = %e, "knowledge query failed; treating as no candidates");
                *degraded = true;
                Vec::new()
            }
        }
    }
}

fn found(name: &str, id: &str, tier: ConfidenceTier) -> ResolutionResult {
    ResolutionResult {
        artist_name: name.to_string(),
        canonical_id: Some(id.to_string()),
        confidence_tier: tier,
    }
}

fn label_matches(candidate: &Candidate, name: &str) -> bool {
    candidate
        .label
        .as_deref()
        .is_some_and(|label| label.to_lowercase() == name.to_lowercase())
}

/// Returns the first highest-scoring labelled candidate.
fn best_fuzzy_match<'c>(name: &str, corpus: &'c [Candidate]) -> Option<(&'c Candidate, u8)> {
    let mut best: Option<(&Candidate, u8)> = None;
    for candidate in corpus {
        let Some(label) = candidate.label.as_deref() else {
            continue;
        };
        let score = similarity_ratio(name, label);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    best
}
