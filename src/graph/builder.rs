use std::path::Path;

use tracing::{debug, warn};

use crate::atomic::write_atomic;
use crate::errors::{Result, TuneGraphError};
use crate::result_line::parse_line;
use crate::types::*;

/// Prefix bound to the graph's own namespace.
pub const IMKB_PREFIX: &str = "imkb";

/// Namespace declarations that follow `imkb:` in every document header.
const FIXED_PREFIXES: [(&str, &str); 4] = [
    ("wd", "http://www.wikidata.org/entity/"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// Normalizes text into a URI-safe slug.
///
/// Lowercases and trims the text, drops every character that is not a word
/// character, whitespace or `-`, and collapses runs of whitespace and `-` into
/// a single `_`. Applying it twice yields the same slug.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_separator = false;
    for c in kept.trim().chars() {
        if c == '-' || c.is_whitespace() {
            if !in_separator {
                slug.push('_');
                in_separator = true;
            }
        } else {
            slug.push(c);
            in_separator = false;
        }
    }
    slug
}

/// Returns the prefixed name of an entity, e.g. `imkb:Artist_daft_punk`.
pub fn uri(kind: EntityKind, name: &str) -> String {
    format!("{IMKB_PREFIX}:{}_{}", kind.as_str(), slugify(name))
}

/// Returns the prefixed name of an `imkb:` class.
fn class(kind: EntityKind) -> Term {
    Term::Named(format!("{IMKB_PREFIX}:{}", kind.as_str()))
}

/// Accumulates triples from resolved records in input order.
pub struct GraphBuilder {
    namespace: String,
    triples: Vec<Triple>,
    records: usize,
    skipped: usize,
}

impl GraphBuilder {
    /// Creates a builder whose `imkb:` prefix is bound to `namespace`.
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            triples: Vec::new(),
            records: 0,
            skipped: 0,
        }
    }

    /// Builds a graph from the full text of a result store.
    pub fn build(namespace: &str, text: &str) -> KnowledgeGraph {
        let mut builder = Self::new(namespace);
        builder.add_lines(text);
        builder.finish()
    }

    /// Adds every line of `text`. Blank lines are ignored; malformed lines are
    /// logged and counted.
    pub fn add_lines(&mut self, text: &str) {
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(record) => self.add_record(&record),
                None => {
                    warn!(line = idx + 1, content = %line.trim(), "skipping malformed result line");
                    self.skipped += 1;
                }
            }
        }
    }

    /// Emits the fixed triple set for one record.
    ///
    /// Order: playlist declaration and name; song declaration, title and
    /// artist; artist declaration, name and (if resolved) external link;
    /// playlist-contains-song.
    pub fn add_record(&mut self, record: &ResolvedRecord) {
        let playlist_uri = uri(EntityKind::Playlist, &record.playlist);
        let artist_uri = uri(EntityKind::Artist, &record.artist);
        let song_uri = uri(
            EntityKind::Song,
            &format!("{}_{}", record.artist, record.track),
        );

        let t = &mut self.triples;

        t.push(Triple::new(&playlist_uri, Predicate::Type, class(EntityKind::Playlist)));
        t.push(Triple::new(
            &playlist_uri,
            Predicate::HasName,
            Term::Literal(record.playlist.clone()),
        ));

        t.push(Triple::new(&song_uri, Predicate::Type, class(EntityKind::Song)));
        t.push(Triple::new(
            &song_uri,
            Predicate::HasTitle,
            Term::Literal(record.track.clone()),
        ));
        t.push(Triple::new(
            &song_uri,
            Predicate::HasArtist,
            Term::Named(artist_uri.clone()),
        ));

        t.push(Triple::new(&artist_uri, Predicate::Type, class(EntityKind::Artist)));
        t.push(Triple::new(
            &artist_uri,
            Predicate::HasName,
            Term::Literal(record.artist.clone()),
        ));
        if let Some(id) = &record.canonical_id {
            t.push(Triple::new(&artist_uri, Predicate::LinkedTo, Term::Iri(id.clone())));
        }

        t.push(Triple::new(&playlist_uri, Predicate::Contains, Term::Named(song_uri)));

        self.records += 1;
    }

    pub fn finish(self) -> KnowledgeGraph {
        debug!(
            records = self.records,
            skipped = self.skipped,
            triples = self.triples.len(),
            "graph built"
        );
        KnowledgeGraph {
            namespace: self.namespace,
            triples: self.triples,
            records: self.records,
            skipped: self.skipped,
        }
    }
}

/// The ordered triple sequence of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeGraph {
    namespace: String,
    triples: Vec<Triple>,
    records: usize,
    skipped: usize,
}

impl KnowledgeGraph {
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of input records that produced triples.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of malformed input lines that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Serializes the graph as a Turtle document.
    ///
    /// The header declares the five namespaces, followed by a blank line and
    /// one statement per line; consecutive triples about the same subject are
    /// joined with `;`.
    pub fn to_turtle(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "@prefix {IMKB_PREFIX}: <{}> .\n",
            escape_iri(&self.namespace)
        ));
        for (prefix, iri) in FIXED_PREFIXES {
            out.push_str(&format!("@prefix {prefix}: <{iri}> .\n"));
        }
        out.push('\n');

        for (i, triple) in self.triples.iter().enumerate() {
            let continues_subject = i > 0 && self.triples[i - 1].subject == triple.subject;
            if continues_subject {
                out.push_str("    ");
            } else {
                out.push_str(&triple.subject);
                out.push(' ');
            }
            out.push_str(triple.predicate.as_str());
            out.push(' ');
            out.push_str(&format_term(&triple.object));

            let next_same_subject = self
                .triples
                .get(i + 1)
                .is_some_and(|next| next.subject == triple.subject);
            out.push_str(if next_same_subject { " ;\n" } else { " .\n" });
        }
        out
    }

    /// Writes the Turtle document to `path`, replacing any previous document.
    ///
    /// The document is written to a temporary sibling first and renamed into
    /// place, so readers never observe a partial graph.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_turtle().as_bytes()).map_err(|e| TuneGraphError::Storage {
            message: format!("failed to write graph document: {e}"),
            path: path.display().to_string(),
        })
    }
}

fn format_term(term: &Term) -> String {
    match term {
        Term::Named(name) => name.clone(),
        Term::Iri(iri) => format!("<{}>", escape_iri(iri)),
        Term::Literal(value) => format!("\"{}\"", escape_literal(value)),
    }
}

/// Escapes a string for a double-quoted Turtle literal.
fn escape_literal(value: &str) -> String {
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

/// Percent-encodes the characters Turtle forbids inside `<...>`.
fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.chars() {
        if c.is_control()
            || c == ' '
            || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(c);
        }
    }
    out
}
