use serde::{Deserialize, Serialize};

use crate::errors::{Result, TuneGraphError};

/// A playlist as stored in a Million Playlist Dataset slice.
///
/// Only the fields the pipeline needs are kept; everything else in the slice
/// is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivePlaylist {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<ArchiveTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveTrack {
    pub artist_name: String,
    pub track_name: String,
}

#[derive(Deserialize)]
struct ArchiveSlice {
    playlists: Vec<ArchivePlaylist>,
}

/// Parses the playlists out of an archive slice.
pub fn parse_archive(json: &str) -> Result<Vec<ArchivePlaylist>> {
    let slice: ArchiveSlice = serde_json::from_str(json).map_err(|e| TuneGraphError::Parse {
        message: format!("invalid playlist archive: {e}"),
        line: Some(e.line()),
    })?;
    Ok(slice.playlists)
}

/// Renders playlists in the extracted-record line protocol.
pub fn render_playlist_text(playlists: &[ArchivePlaylist]) -> String {
    let mut out = String::new();
    for playlist in playlists {
        out.push_str(&format!("Playlist: {}\n", playlist.name));
        for track in &playlist.tracks {
            out.push_str(&format!(
                "  - Artist: {}, Track: {}\n",
                track.artist_name, track.track_name
            ));
        }
    }
    out
}
