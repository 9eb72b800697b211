/// Knowledge-service access.
///
/// The resolver talks to the remote knowledge base only through the
/// [`KnowledgeService`] trait; [`SparqlClient`] is the Wikidata implementation.
mod service;
mod sparql;

pub use service::{ExactLabelQuery, KnowledgeService, LabelCorpusQuery};
pub use sparql::{direct_query, escape_literal, fuzzy_query, parse_bindings, SparqlClient};
