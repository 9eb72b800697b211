//! Encoding of result-store lines.
//!
//! Two encodings are understood: versioned JSON objects (one per line) and
//! the legacy arrow line `Playlist: <playlist> -- <artist> -- <track> --> <id>`.
//! Readers accept both so stores written in either format can be resumed and
//! built into a graph.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::*;

/// Current version of the JSON line encoding.
pub const LINE_VERSION: u32 = 1;

const ARROW_PREFIX: &str = "Playlist:";
const FIELD_SEPARATOR: &str = " -- ";
const ID_SEPARATOR: &str = " --> ";

#[derive(Serialize, Deserialize)]
struct JsonLine {
    v: u32,
    key: String,
    playlist: String,
    artist: String,
    track: String,
    canonical_id: Option<String>,
    #[serde(default)]
    tier: Option<ConfidenceTier>,
}

/// Encodes a resolved record as a single line without the trailing newline.
pub fn format_line(record: &ResolvedRecord, format: ResultFormat) -> Result<String> {
    match format {
        ResultFormat::Jsonl => {
            let line = JsonLine {
                v: LINE_VERSION,
                key: record.key.clone(),
                playlist: record.playlist.clone(),
                artist: record.artist.clone(),
                track: record.track.clone(),
                canonical_id: record.canonical_id.clone(),
                tier: record.tier,
            };
            Ok(serde_json::to_string(&line)?)
        }
        ResultFormat::Arrow => Ok(format!(
            "{ARROW_PREFIX} {}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{ID_SEPARATOR}{}",
            record.playlist,
            record.artist,
            record.track,
            record.identifier()
        )),
    }
}

/// Decodes one line in either encoding. Returns `None` for blank or malformed lines.
pub fn parse_line(line: &str) -> Option<ResolvedRecord> {
    let line = line.trim();
    if line.starts_with('{') {
        parse_json_line(line)
    } else {
        parse_arrow_line(line)
    }
}

fn parse_json_line(line: &str) -> Option<ResolvedRecord> {
    let parsed: JsonLine = serde_json::from_str(line).ok()?;
    if parsed.v != LINE_VERSION {
        return None;
    }
    Some(ResolvedRecord {
        key: parsed.key,
        playlist: parsed.playlist,
        artist: parsed.artist,
        track: parsed.track,
        canonical_id: parsed.canonical_id.filter(|id| !id.is_empty()),
        tier: parsed.tier,
    })
}

fn parse_arrow_line(line: &str) -> Option<ResolvedRecord> {
    let rest = line.strip_prefix(ARROW_PREFIX)?.trim_start();
    let (fields, identifier) = rest.rsplit_once(ID_SEPARATOR)?;

    let mut parts = fields.splitn(3, FIELD_SEPARATOR);
    let playlist = parts.next()?.trim();
    let artist = parts.next()?.trim();
    let track = parts.next()?.trim();

    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }
    let canonical_id =
        (!UNRESOLVED_SENTINELS.contains(&identifier)).then(|| identifier.to_string());

    Some(ResolvedRecord {
        key: record_key(playlist, artist, track),
        playlist: playlist.to_string(),
        artist: artist.to_string(),
        track: track.to_string(),
        canonical_id,
        tier: None,
    })
}
