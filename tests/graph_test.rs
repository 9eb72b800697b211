use std::fs;

use tempfile::TempDir;
use tunegraph::graph::*;
use tunegraph::result_line::format_line;
use tunegraph::types::*;

const NAMESPACE: &str = "http://example.org/imkb/";

const CHILL_LINE: &str =
    "Playlist: Chill -- Daft Punk -- One More Time --> http://kb.example/Q2831";

fn build(text: &str) -> KnowledgeGraph {
    GraphBuilder::build(NAMESPACE, text)
}

fn named(name: &str) -> Term {
    Term::Named(name.to_string())
}

fn literal(value: &str) -> Term {
    Term::Literal(value.to_string())
}

// ---------------------------------------------------------------------------
// Slugs and URIs
// ---------------------------------------------------------------------------

#[test]
fn test_slugify_normalizes_text() {
    assert_eq!(slugify("Daft Punk"), "daft_punk");
    assert_eq!(slugify("  AC/DC  "), "acdc");
    assert_eq!(slugify("Guns N' Roses"), "guns_n_roses");
    assert_eq!(slugify("Jay-Z"), "jay_z");
    assert_eq!(slugify("a - b"), "a_b");
}

#[test]
fn test_slugify_collapses_equivalent_names() {
    let expected = slugify("Pink Floyd");
    assert_eq!(slugify("Pink   Floyd!!"), expected);
    assert_eq!(slugify("pink-floyd"), expected);
    assert_eq!(slugify("pink_floyd"), expected);
}

#[test]
fn test_slugify_is_idempotent() {
    for text in ["Daft Punk", " Sigur Rós ", "Jay-Z & Kanye", "!!!", "R.E.M."] {
        let once = slugify(text);
        assert_eq!(slugify(&once), once, "slugify not idempotent for {text:?}");
    }
}

#[test]
fn test_uri_uses_kind_and_slug() {
    assert_eq!(uri(EntityKind::Artist, "Daft Punk"), "imkb:Artist_daft_punk");
    assert_eq!(uri(EntityKind::Playlist, "Chill"), "imkb:Playlist_chill");
    assert_eq!(
        uri(EntityKind::Song, "Daft Punk_One More Time"),
        "imkb:Song_daft_punk_one_more_time"
    );
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[test]
fn test_resolved_line_emits_nine_triples() {
    let graph = build(CHILL_LINE);
    let playlist = "imkb:Playlist_chill";
    let song = "imkb:Song_daft_punk_one_more_time";
    let artist = "imkb:Artist_daft_punk";

    let expected = vec![
        Triple::new(playlist, Predicate::Type, named("imkb:Playlist")),
        Triple::new(playlist, Predicate::HasName, literal("Chill")),
        Triple::new(song, Predicate::Type, named("imkb:Song")),
        Triple::new(song, Predicate::HasTitle, literal("One More Time")),
        Triple::new(song, Predicate::HasArtist, named(artist)),
        Triple::new(artist, Predicate::Type, named("imkb:Artist")),
        Triple::new(artist, Predicate::HasName, literal("Daft Punk")),
        Triple::new(
            artist,
            Predicate::LinkedTo,
            Term::Iri("http://kb.example/Q2831".to_string()),
        ),
        Triple::new(playlist, Predicate::Contains, named(song)),
    ];
    assert_eq!(graph.triples(), expected.as_slice());
    assert_eq!(graph.record_count(), 1);
}

#[test]
fn test_unresolved_line_has_no_link() {
    let graph = build("Playlist: Chill -- Unknown DJ -- Intro --> NOT FOUND");

    assert_eq!(graph.triples().len(), 8);
    assert!(graph
        .triples()
        .iter()
        .all(|t| t.predicate != Predicate::LinkedTo));
    assert!(graph.triples().contains(&Triple::new(
        "imkb:Artist_unknown_dj",
        Predicate::HasName,
        literal("Unknown DJ"),
    )));
}

#[test]
fn test_italian_sentinel_is_not_linked() {
    let graph = build("Playlist: Chill -- Daft Punk -- One More Time --> NON TROVATO");

    assert_eq!(graph.triples().len(), 8);
    assert!(!graph.to_turtle().contains("linkedTo"));
    let report = GraphQueries::new(&graph).report();
    assert!(report.linked_artists.is_empty());
    assert_eq!(
        report.unlinked_songs,
        vec![("One More Time".to_string(), "Daft Punk".to_string())]
    );
}

#[test]
fn test_malformed_lines_are_skipped_and_counted() {
    let text = format!(
        "{CHILL_LINE}\n\nthis is not a result line\nPlaylist: Chill -- Daft Punk\n{{\"v\":99}}\n"
    );
    let graph = build(&text);

    assert_eq!(graph.record_count(), 1);
    assert_eq!(graph.skipped_count(), 3);
    assert_eq!(graph.triples().len(), 9);
}

#[test]
fn test_jsonl_results_build_the_same_graph() {
    let record = ResolvedRecord::new(
        &Record::new("Chill", "Daft Punk", "One More Time"),
        &ResolutionResult {
            artist_name: "Daft Punk".to_string(),
            canonical_id: Some("http://kb.example/Q2831".to_string()),
            confidence_tier: ConfidenceTier::Exact,
        },
    );
    let line = format_line(&record, ResultFormat::Jsonl).unwrap();

    assert_eq!(build(&line).triples(), build(CHILL_LINE).triples());
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_turtle_document_layout() {
    let expected = "\
@prefix imkb: <http://example.org/imkb/> .
@prefix wd: <http://www.wikidata.org/entity/> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

imkb:Playlist_chill a imkb:Playlist ;
    imkb:hasName \"Chill\" .
imkb:Song_daft_punk_one_more_time a imkb:Song ;
    imkb:hasTitle \"One More Time\" ;
    imkb:hasArtist imkb:Artist_daft_punk .
imkb:Artist_daft_punk a imkb:Artist ;
    imkb:hasName \"Daft Punk\" ;
    imkb:linkedTo <http://kb.example/Q2831> .
imkb:Playlist_chill imkb:contains imkb:Song_daft_punk_one_more_time .
";
    assert_eq!(build(CHILL_LINE).to_turtle(), expected);
}

#[test]
fn test_empty_graph_has_only_header() {
    let turtle = build("").to_turtle();
    assert_eq!(turtle.lines().count(), 6);
    assert!(turtle.ends_with(" .\n\n"));
}

#[test]
fn test_literals_are_escaped() {
    let graph = build("Playlist: Quotes -- The \"Band\" -- Back\\slash --> NOT FOUND");
    let turtle = graph.to_turtle();

    assert!(turtle.contains("imkb:hasName \"The \\\"Band\\\"\""));
    assert!(turtle.contains("imkb:hasTitle \"Back\\\\slash\""));
}

#[test]
fn test_iri_characters_are_percent_encoded() {
    let graph = build("Playlist: Mix -- Artist -- Song --> http://kb.example/a b<c>");
    assert!(graph
        .to_turtle()
        .contains("imkb:linkedTo <http://kb.example/a%20b%3Cc%3E>"));
}

#[test]
fn test_custom_namespace_in_header() {
    let graph = GraphBuilder::build("http://music.test/kb#", CHILL_LINE);
    assert!(graph
        .to_turtle()
        .starts_with("@prefix imkb: <http://music.test/kb#> .\n"));
    assert_eq!(graph.namespace(), "http://music.test/kb#");
}

#[test]
fn test_write_to_is_deterministic_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("kb.ttl");
    let text = format!("{CHILL_LINE}\nPlaylist: Chill -- Air -- La Femme d'Argent --> NOT FOUND\n");

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "stale content that is much longer than nothing ".repeat(200)).unwrap();

    build(&text).write_to(&path).unwrap();
    let first = fs::read(&path).unwrap();
    build(&text).write_to(&path).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert!(!String::from_utf8(first).unwrap().contains("stale"));
    assert!(!dir.path().join("out").join("kb.tmp").exists());
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn sample_graph() -> KnowledgeGraph {
    build(
        "\
Playlist: Chill -- Daft Punk -- One More Time --> http://www.wikidata.org/entity/Q185828
Playlist: Chill -- Air -- Playground Love --> NOT FOUND
Playlist: Road Trip -- Daft Punk -- Around the World --> http://www.wikidata.org/entity/Q185828
Playlist: Road Trip -- Daft Punk -- One More Time --> http://www.wikidata.org/entity/Q185828
",
    )
}

#[test]
fn test_playlist_songs_are_distinct_and_sorted() {
    let graph = sample_graph();
    let rows = GraphQueries::new(&graph).playlist_songs();

    assert_eq!(
        rows,
        vec![
            ("Chill".to_string(), "One More Time".to_string()),
            ("Chill".to_string(), "Playground Love".to_string()),
            ("Road Trip".to_string(), "Around the World".to_string()),
            ("Road Trip".to_string(), "One More Time".to_string()),
        ]
    );
}

#[test]
fn test_linked_artists_deduplicated() {
    let graph = sample_graph();
    let rows = GraphQueries::new(&graph).linked_artists();

    assert_eq!(
        rows,
        vec![(
            "Daft Punk".to_string(),
            "http://www.wikidata.org/entity/Q185828".to_string()
        )]
    );
}

#[test]
fn test_unlinked_songs() {
    let graph = sample_graph();
    let rows = GraphQueries::new(&graph).unlinked_songs();

    assert_eq!(
        rows,
        vec![("Playground Love".to_string(), "Air".to_string())]
    );
}

#[test]
fn test_report_on_empty_graph() {
    let graph = build("");
    let report = GraphQueries::new(&graph).report();
    assert_eq!(report, GraphReport::default());

    let md = format_report_as_markdown(&report);
    assert!(md.contains("_No playlists._"));
    assert!(md.contains("_No linked artists._"));
}
