use tunegraph::errors::TuneGraphError;
use tunegraph::extraction::*;
use tunegraph::types::*;

const SAMPLE_TEXT: &str = "\
Playlist: Throwbacks
  - Artist: Missy Elliott, Track: The Rain (Supa Dupa Fly)
  - Artist: Britney Spears, Track: Toxic

Playlist: Chill
  - Artist: Daft Punk, Track: One More Time
";

#[test]
fn test_parse_playlist_text() {
    let parsed = parse_playlist_text(SAMPLE_TEXT);

    assert_eq!(parsed.skipped, 0);
    assert_eq!(
        parsed.records,
        vec![
            Record::new("Throwbacks", "Missy Elliott", "The Rain (Supa Dupa Fly)"),
            Record::new("Throwbacks", "Britney Spears", "Toxic"),
            Record::new("Chill", "Daft Punk", "One More Time"),
        ]
    );
}

#[test]
fn test_missing_track_gets_placeholder() {
    let parsed = parse_playlist_text("Playlist: Mix\n- Artist: Portishead\n");
    assert_eq!(
        parsed.records,
        vec![Record::new("Mix", "Portishead", UNKNOWN_TRACK)]
    );
}

#[test]
fn test_track_separator_splits_at_first_occurrence() {
    let parsed =
        parse_playlist_text("Playlist: Mix\n- Artist: Crosby, Stills, Track: Suite, Track: Two\n");
    assert_eq!(parsed.records[0].artist, "Crosby, Stills");
    assert_eq!(parsed.records[0].track, "Suite, Track: Two");
}

#[test]
fn test_lines_before_header_and_noise_are_skipped() {
    let text = "\
- Artist: Orphan, Track: Lost
random noise
Playlist: Late Night
  - Artist: Burial, Track: Archangel
# comment
";
    let parsed = parse_playlist_text(text);

    assert_eq!(parsed.skipped, 3);
    assert_eq!(
        parsed.records,
        vec![Record::new("Late Night", "Burial", "Archangel")]
    );
}

#[test]
fn test_empty_text() {
    assert_eq!(parse_playlist_text(""), ParsedPlaylists::default());
}

#[test]
fn test_parse_archive_ignores_extra_fields() {
    let json = r#"{
        "info": {"slice": "0-999", "version": "v1"},
        "playlists": [
            {
                "name": "Throwbacks",
                "pid": 0,
                "num_followers": 1,
                "tracks": [
                    {"pos": 0, "artist_name": "Missy Elliott", "track_name": "Lose Control", "duration_ms": 226863},
                    {"pos": 1, "artist_name": "Britney Spears", "track_name": "Toxic", "duration_ms": 198800}
                ]
            },
            {"name": "Empty", "pid": 1}
        ]
    }"#;

    let playlists = parse_archive(json).unwrap();
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0].tracks[1].artist_name, "Britney Spears");
    assert!(playlists[1].tracks.is_empty());
}

#[test]
fn test_parse_archive_reports_invalid_json() {
    let result = parse_archive("{\n  \"playlists\": [\n    {\"name\": }\n  ]\n}");
    match result {
        Err(TuneGraphError::Parse { line, .. }) => assert_eq!(line, Some(3)),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_rendered_text_parses_back_to_records() {
    let playlists = vec![ArchivePlaylist {
        name: "Road Trip".to_string(),
        tracks: vec![
            ArchiveTrack {
                artist_name: "Fleetwood Mac".to_string(),
                track_name: "Dreams".to_string(),
            },
            ArchiveTrack {
                artist_name: "The War on Drugs".to_string(),
                track_name: "Red Eyes".to_string(),
            },
        ],
    }];

    let text = render_playlist_text(&playlists);
    assert_eq!(
        text,
        "Playlist: Road Trip\n  - Artist: Fleetwood Mac, Track: Dreams\n  - Artist: The War on Drugs, Track: Red Eyes\n"
    );

    let parsed = parse_playlist_text(&text);
    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.records[1], Record::new("Road Trip", "The War on Drugs", "Red Eyes"));
}
