use crate::errors::Result;
use crate::types::Candidate;

/// Exact-label lookup scoped to a fixed set of entity kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactLabelQuery<'a> {
    pub label: &'a str,
    pub kinds: &'a [String],
    pub language: &'a str,
    pub limit: u32,
}

/// Bulk label fetch for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCorpusQuery<'a> {
    pub kind: &'a str,
    pub language: &'a str,
    pub limit: u32,
}

/// Read-only, stateless access to a remote knowledge graph.
///
/// Implementations return `Ok(vec![])` for an empty answer and an error for
/// anything that prevented an answer; the resolver decides how to recover.
pub trait KnowledgeService {
    /// Returns entities whose label equals `query.label` exactly.
    fn exact_label(&self, query: &ExactLabelQuery<'_>) -> Result<Vec<Candidate>>;

    /// Returns a bounded corpus of labelled entities of one kind.
    fn label_corpus(&self, query: &LabelCorpusQuery<'_>) -> Result<Vec<Candidate>>;
}

impl<T: KnowledgeService + ?Sized> KnowledgeService for &T {
    fn exact_label(&self, query: &ExactLabelQuery<'_>) -> Result<Vec<Candidate>> {
        (**self).exact_label(query)
    }

    fn label_corpus(&self, query: &LabelCorpusQuery<'_>) -> Result<Vec<Candidate>> {
        (**self).label_corpus(query)
    }
}
