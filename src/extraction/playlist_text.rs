use tracing::warn;

use crate::types::{Record, UNKNOWN_TRACK};

const PLAYLIST_PREFIX: &str = "Playlist:";
const ARTIST_PREFIX: &str = "- Artist:";
const TRACK_SEPARATOR: &str = ", Track:";

/// Records parsed from extracted playlist text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylists {
    pub records: Vec<Record>,
    /// Non-blank lines that were not understood.
    pub skipped: usize,
}

/// Parses the extracted-record line protocol.
///
/// A `Playlist: <name>` line opens a playlist; each following
/// `- Artist: <artist>, Track: <track>` line (leading indentation ignored)
/// becomes one record. An artist line without a `Track:` part gets the
/// placeholder title. Artist lines before the first playlist header and any
/// other non-blank line are skipped and logged.
pub fn parse_playlist_text(text: &str) -> ParsedPlaylists {
    let mut parsed = ParsedPlaylists::default();
    let mut current_playlist: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix(PLAYLIST_PREFIX) {
            current_playlist = Some(name.trim().to_string());
            continue;
        }

        let Some(entry) = line.strip_prefix(ARTIST_PREFIX) else {
            warn!(line = idx + 1, content = %line, "unrecognized line in playlist text");
            parsed.skipped += 1;
            continue;
        };

        let Some(playlist) = current_playlist.as_deref() else {
            warn!(line = idx + 1, content = %line, "track line before any playlist header");
            parsed.skipped += 1;
            continue;
        };

        let (artist, track) = match entry.split_once(TRACK_SEPARATOR) {
            Some((artist, track)) => (artist.trim(), track.trim()),
            None => (entry.trim(), UNKNOWN_TRACK),
        };
        parsed.records.push(Record::new(playlist, artist, track));
    }

    parsed
}
