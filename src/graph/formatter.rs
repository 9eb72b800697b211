use crate::types::GraphReport;

/// Formats a `GraphReport` as a Markdown document with one section per report.
pub fn format_report_as_markdown(report: &GraphReport) -> String {
    let mut out = String::new();

    out.push_str("## Knowledge Graph Report\n\n");

    out.push_str("### Playlists and Songs\n");
    push_rows(&mut out, &report.playlist_songs, "_No playlists._", |(playlist, song)| {
        format!("- **{}**: {}", playlist, song)
    });

    out.push_str("### Artists Linked to Wikidata\n");
    push_rows(&mut out, &report.linked_artists, "_No linked artists._", |(artist, iri)| {
        format!("- **{}**: <{}>", artist, iri)
    });

    out.push_str("### Songs Without a Wikidata Link\n");
    push_rows(&mut out, &report.unlinked_songs, "_Every song is linked._", |(song, artist)| {
        format!("- {} (by {})", song, artist)
    });

    out
}

/// Formats a `GraphReport` as pretty-printed JSON.
pub fn format_report_as_json(report: &GraphReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}

fn push_rows<F>(out: &mut String, rows: &[(String, String)], empty: &str, render: F)
where
    F: Fn(&(String, String)) -> String,
{
    if rows.is_empty() {
        out.push_str(empty);
        out.push('\n');
    } else {
        for row in rows {
            out.push_str(&render(row));
            out.push('\n');
        }
    }
    out.push('\n');
}
