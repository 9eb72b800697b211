use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::service::{ExactLabelQuery, KnowledgeService, LabelCorpusQuery};
use crate::config::TuneGraphConfig;
use crate::errors::{Result, TuneGraphError};
use crate::types::Candidate;

const ENTITY_VAR: &str = "artist";
const LABEL_VAR: &str = "artistLabel";

const PREFIXES: &str = "PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
";

/// Blocking SPARQL client for a Wikidata-compatible endpoint.
///
/// Every request carries a global timeout, so a hung endpoint surfaces as a
/// query error instead of blocking the pipeline.
pub struct SparqlClient {
    agent: ureq::Agent,
    endpoint: String,
    user_agent: String,
}

impl SparqlClient {
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn from_config(config: &TuneGraphConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.user_agent,
            config.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a SELECT query and maps its bindings to candidates.
    fn select(&self, sparql: &str) -> Result<Vec<Candidate>> {
        debug!(endpoint = %self.endpoint, "running SPARQL query");
        let mut response = self
            .agent
            .get(self.endpoint.as_str())
            .query("query", sparql)
            .query("format", "json")
            .header("Accept", "application/sparql-results+json")
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| self.query_error(format!("request failed: {e}")))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.query_error(format!("failed to read response: {e}")))?;

        parse_bindings(&body).map_err(|e| self.query_error(format!("malformed response: {e}")))
    }

    fn query_error(&self, message: String) -> TuneGraphError {
        TuneGraphError::Query {
            message,
            endpoint: self.endpoint.clone(),
        }
    }
}

impl KnowledgeService for SparqlClient {
    fn exact_label(&self, query: &ExactLabelQuery<'_>) -> Result<Vec<Candidate>> {
        self.select(&direct_query(query))
    }

    fn label_corpus(&self, query: &LabelCorpusQuery<'_>) -> Result<Vec<Candidate>> {
        self.select(&fuzzy_query(query))
    }
}

/// Builds the direct-phase query: entities labelled exactly `query.label`
/// that are instances of one of `query.kinds`.
pub fn direct_query(query: &ExactLabelQuery<'_>) -> String {
    let kinds = query
        .kinds
        .iter()
        .map(|kind| format!("  {{ ?{ENTITY_VAR} wdt:P31 wd:{kind} . }}"))
        .collect::<Vec<_>>()
        .join("\n  UNION\n");

    format!(
        "{PREFIXES}
SELECT DISTINCT ?{ENTITY_VAR} ?{LABEL_VAR} WHERE {{
  ?{ENTITY_VAR} rdfs:label \"{label}\"@{lang} .
{kinds}
  ?{ENTITY_VAR} rdfs:label ?{LABEL_VAR} .
  FILTER(LANG(?{LABEL_VAR}) = \"{lang}\")
}}
LIMIT {limit}
",
        label = escape_literal(query.label),
        lang = query.language,
        limit = query.limit,
    )
}

/// Builds the fuzzy-phase corpus query: labels of one entity kind in one language.
pub fn fuzzy_query(query: &LabelCorpusQuery<'_>) -> String {
    format!(
        "{PREFIXES}
SELECT DISTINCT ?{ENTITY_VAR} ?{LABEL_VAR} WHERE {{
  ?{ENTITY_VAR} rdfs:label ?{LABEL_VAR} .
  ?{ENTITY_VAR} wdt:P31 wd:{kind} .
  FILTER(LANG(?{LABEL_VAR}) = \"{lang}\")
}}
LIMIT {limit}
",
        kind = query.kind,
        lang = query.language,
        limit = query.limit,
    )
}

/// Escapes a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Deserialize)]
struct SparqlValue {
    value: String,
}

/// Parses a SPARQL JSON results document into candidates.
///
/// Rows without an entity binding are dropped; the label is optional.
pub fn parse_bindings(body: &str) -> std::result::Result<Vec<Candidate>, serde_json::Error> {
    let response: SparqlResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .bindings
        .into_iter()
        .filter_map(|mut row| {
            let id = row.remove(ENTITY_VAR)?.value;
            let label = row.remove(LABEL_VAR).map(|v| v.value);
            Some(Candidate { id, label })
        })
        .collect())
}
