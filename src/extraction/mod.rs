/// Playlist extraction.
///
/// Converts a playlist archive into the extracted-record line protocol and
/// parses that protocol back into [`Record`](crate::types::Record)s for the
/// batch processor.
mod archive;
mod playlist_text;

pub use archive::{parse_archive, render_playlist_text, ArchivePlaylist, ArchiveTrack};
pub use playlist_text::{parse_playlist_text, ParsedPlaylists};
