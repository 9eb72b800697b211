use std::collections::{BTreeMap, BTreeSet};

use super::builder::{KnowledgeGraph, IMKB_PREFIX};
use crate::types::*;

/// Facts collected about a single subject.
#[derive(Default)]
struct SubjectFacts<'g> {
    classes: Vec<&'g str>,
    names: Vec<&'g str>,
    titles: Vec<&'g str>,
    artists: Vec<&'g str>,
    contains: Vec<&'g str>,
    links: Vec<&'g str>,
}

/// Read-only reports over a built graph.
///
/// Every report returns distinct rows in sorted order, regardless of how
/// often the same statement was emitted.
pub struct GraphQueries<'g> {
    subjects: BTreeMap<&'g str, SubjectFacts<'g>>,
}

impl<'g> GraphQueries<'g> {
    /// Indexes the graph's triples by subject.
    pub fn new(graph: &'g KnowledgeGraph) -> Self {
        let mut subjects: BTreeMap<&'g str, SubjectFacts<'g>> = BTreeMap::new();

        for triple in graph.triples() {
            let facts = subjects.entry(triple.subject.as_str()).or_default();
            let value = match &triple.object {
                Term::Named(v) | Term::Iri(v) | Term::Literal(v) => v.as_str(),
            };
            match triple.predicate {
                Predicate::Type => facts.classes.push(value),
                Predicate::HasName => facts.names.push(value),
                Predicate::HasTitle => facts.titles.push(value),
                Predicate::HasArtist => facts.artists.push(value),
                Predicate::Contains => facts.contains.push(value),
                Predicate::LinkedTo => facts.links.push(value),
            }
        }

        Self { subjects }
    }

    /// `(playlist name, song title)` for every song a playlist contains.
    pub fn playlist_songs(&self) -> Vec<(String, String)> {
        let mut rows = BTreeSet::new();
        for facts in self.of_class(EntityKind::Playlist) {
            for song in &facts.contains {
                let Some(song_facts) = self.subjects.get(song) else {
                    continue;
                };
                for name in &facts.names {
                    for title in &song_facts.titles {
                        rows.insert((name.to_string(), title.to_string()));
                    }
                }
            }
        }
        rows.into_iter().collect()
    }

    /// `(artist name, external IRI)` for every linked artist.
    pub fn linked_artists(&self) -> Vec<(String, String)> {
        let mut rows = BTreeSet::new();
        for facts in self.of_class(EntityKind::Artist) {
            for name in &facts.names {
                for link in &facts.links {
                    rows.insert((name.to_string(), link.to_string()));
                }
            }
        }
        rows.into_iter().collect()
    }

    /// `(song title, artist name)` for songs whose artist has no external link.
    pub fn unlinked_songs(&self) -> Vec<(String, String)> {
        let mut rows = BTreeSet::new();
        for facts in self.of_class(EntityKind::Song) {
            for artist in &facts.artists {
                let Some(artist_facts) = self.subjects.get(artist) else {
                    continue;
                };
                if !artist_facts.links.is_empty() {
                    continue;
                }
                for title in &facts.titles {
                    for name in &artist_facts.names {
                        rows.insert((title.to_string(), name.to_string()));
                    }
                }
            }
        }
        rows.into_iter().collect()
    }

    /// Runs all three reports.
    pub fn report(&self) -> GraphReport {
        GraphReport {
            playlist_songs: self.playlist_songs(),
            linked_artists: self.linked_artists(),
            unlinked_songs: self.unlinked_songs(),
        }
    }

    fn of_class(&self, kind: EntityKind) -> impl Iterator<Item = &SubjectFacts<'g>> + '_ {
        let class = format!("{IMKB_PREFIX}:{}", kind.as_str());
        self.subjects
            .values()
            .filter(move |facts| facts.classes.iter().any(|c| *c == class))
    }
}
