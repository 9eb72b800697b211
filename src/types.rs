use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Marker written in place of an identifier when an artist could not be resolved.
pub const NOT_FOUND_SENTINEL: &str = "NOT FOUND";

/// Every marker read back as "unresolved", including the one written by the
/// earlier Italian-language tooling.
pub const UNRESOLVED_SENTINELS: &[&str] = &[NOT_FOUND_SENTINEL, "NON TROVATO"];

/// Track title used when an extracted line carries no `Track:` part.
pub const UNKNOWN_TRACK: &str = "Unknown Title";

/// One playlist entry produced by extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub playlist: String,
    pub artist: String,
    pub track: String,
}

impl Record {
    pub fn new(
        playlist: impl Into<String>,
        artist: impl Into<String>,
        track: impl Into<String>,
    ) -> Self {
        Self {
            playlist: playlist.into(),
            artist: artist.into(),
            track: track.into(),
        }
    }

    /// Returns the idempotency key identifying this record in the result store.
    pub fn key(&self) -> String {
        record_key(&self.playlist, &self.artist, &self.track)
    }
}

/// Generates a deterministic idempotency key from a record's three fields.
///
/// The key is the first 32 hex characters of the SHA-256 hash of the fields
/// joined with NUL bytes, so `("a b", "c")` and `("a", "b c")` never collide.
pub fn record_key(playlist: &str, artist: &str, track: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(playlist.as_bytes());
    hasher.update([0u8]);
    hasher.update(artist.as_bytes());
    hasher.update([0u8]);
    hasher.update(track.as_bytes());
    let hex_str = hex::encode(hasher.finalize());
    hex_str[..32].to_string()
}

/// How confidently an artist name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// A direct-phase candidate whose label matched case-insensitively.
    Exact,
    /// The first direct-phase candidate, taken without a label match.
    DirectFallback,
    /// The best fuzzy-phase candidate at or above the threshold.
    Fuzzy,
    Unresolved,
}

#[allow(clippy::should_implement_trait)]
impl ConfidenceTier {
    /// Returns the string representation of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Exact => "exact",
            ConfidenceTier::DirectFallback => "direct_fallback",
            ConfidenceTier::Fuzzy => "fuzzy",
            ConfidenceTier::Unresolved => "unresolved",
        }
    }

    /// Parses a string into a `ConfidenceTier`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<ConfidenceTier> {
        match s {
            "exact" => Some(ConfidenceTier::Exact),
            "direct_fallback" => Some(ConfidenceTier::DirectFallback),
            "fuzzy" => Some(ConfidenceTier::Fuzzy),
            "unresolved" => Some(ConfidenceTier::Unresolved),
            _ => None,
        }
    }
}

/// Outcome of resolving one artist name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub artist_name: String,
    pub canonical_id: Option<String>,
    pub confidence_tier: ConfidenceTier,
}

impl ResolutionResult {
    pub fn unresolved(artist_name: impl Into<String>) -> Self {
        Self {
            artist_name: artist_name.into(),
            canonical_id: None,
            confidence_tier: ConfidenceTier::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }
}

/// What the resolver does when the direct phase returns candidates but none
/// of their labels match the name case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Trust the service ranking and return the first candidate.
    #[default]
    FirstCandidate,
    /// Discard the unmatched candidates and continue with the fuzzy phase.
    Reject,
}

/// Encoding of lines in the result store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    /// One versioned JSON object per line.
    #[default]
    Jsonl,
    /// `Playlist: <playlist> -- <artist> -- <track> --> <identifier>`
    Arrow,
}

/// A candidate entity returned by the knowledge service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub label: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            id: id.into(),
            label: label.map(str::to_string),
        }
    }
}

/// One durable line of the result store: a record together with its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub key: String,
    pub playlist: String,
    pub artist: String,
    pub track: String,
    pub canonical_id: Option<String>,
    /// `None` when the line was read from the legacy arrow format.
    pub tier: Option<ConfidenceTier>,
}

impl ResolvedRecord {
    pub fn new(record: &Record, resolution: &ResolutionResult) -> Self {
        Self {
            key: record.key(),
            playlist: record.playlist.clone(),
            artist: record.artist.clone(),
            track: record.track.clone(),
            canonical_id: resolution.canonical_id.clone(),
            tier: Some(resolution.confidence_tier),
        }
    }

    /// Returns the identifier, or the sentinel when the artist is unresolved.
    pub fn identifier(&self) -> &str {
        self.canonical_id.as_deref().unwrap_or(NOT_FOUND_SENTINEL)
    }
}

/// Counters reported by a batch processing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Records received from the input.
    pub records_read: usize,
    /// Records skipped because their key was already written.
    pub skipped_existing: usize,
    /// Result lines appended to the store.
    pub records_written: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub batches_flushed: usize,
    /// Records written by each flushed batch, in flush order.
    pub batch_sizes: Vec<usize>,
    pub delays: usize,
}

/// Entity types that appear as `imkb:` classes in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Playlist,
    Song,
    Artist,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Playlist => "Playlist",
            EntityKind::Song => "Song",
            EntityKind::Artist => "Artist",
        }
    }
}

/// Predicates used by the graph schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Type,
    HasName,
    HasTitle,
    HasArtist,
    LinkedTo,
    Contains,
}

impl Predicate {
    /// Returns the Turtle form of this predicate.
    pub fn as_str(&self) -> &'static str {
        match self {
            Predicate::Type => "a",
            Predicate::HasName => "imkb:hasName",
            Predicate::HasTitle => "imkb:hasTitle",
            Predicate::HasArtist => "imkb:hasArtist",
            Predicate::LinkedTo => "imkb:linkedTo",
            Predicate::Contains => "imkb:contains",
        }
    }
}

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A prefixed name such as `imkb:Artist_daft_punk`.
    Named(String),
    /// An absolute IRI, serialized in angle brackets.
    Iri(String),
    /// A plain string literal.
    Literal(String),
}

/// A subject-predicate-object edge. Subjects are always prefixed names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: Predicate,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: Predicate, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object,
        }
    }
}

/// Rows produced by the read-only graph reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphReport {
    /// `(playlist name, song title)`
    pub playlist_songs: Vec<(String, String)>,
    /// `(artist name, external IRI)`
    pub linked_artists: Vec<(String, String)>,
    /// `(song title, artist name)` for artists without an external link.
    pub unlinked_songs: Vec<(String, String)>,
}
