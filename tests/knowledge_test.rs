use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tunegraph::errors::TuneGraphError;
use tunegraph::knowledge::*;
use tunegraph::types::Candidate;

const SAMPLE_RESULTS: &str = r#"{
  "head": {"vars": ["artist", "artistLabel"]},
  "results": {
    "bindings": [
      {
        "artist": {"type": "uri", "value": "http://www.wikidata.org/entity/Q185828"},
        "artistLabel": {"type": "literal", "value": "Daft Punk", "xml:lang": "en"}
      },
      {
        "artist": {"type": "uri", "value": "http://www.wikidata.org/entity/Q1"}
      },
      {
        "artistLabel": {"type": "literal", "value": "orphan label"}
      }
    ]
  }
}"#;

/// Serves a single HTTP response and hands back the lowercased request head.
fn serve_once(status: &str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let status = status.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/sparql-results+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
        let _ = tx.send(head.to_lowercase());
    });

    (format!("http://{addr}/sparql"), rx)
}

fn kinds() -> Vec<String> {
    vec!["Q5".to_string(), "Q215380".to_string()]
}

// ---------------------------------------------------------------------------
// Query text
// ---------------------------------------------------------------------------

#[test]
fn test_direct_query_text() {
    let kinds = kinds();
    let sparql = direct_query(&ExactLabelQuery {
        label: "Daft Punk",
        kinds: &kinds,
        language: "en",
        limit: 5,
    });

    assert!(sparql.contains("?artist rdfs:label \"Daft Punk\"@en ."));
    assert!(sparql.contains("{ ?artist wdt:P31 wd:Q5 . }"));
    assert!(sparql.contains("UNION"));
    assert!(sparql.contains("{ ?artist wdt:P31 wd:Q215380 . }"));
    assert!(sparql.contains("FILTER(LANG(?artistLabel) = \"en\")"));
    assert!(sparql.trim_end().ends_with("LIMIT 5"));
}

#[test]
fn test_direct_query_escapes_label() {
    let kinds = kinds();
    let sparql = direct_query(&ExactLabelQuery {
        label: "The \"Ramones\" \\ Co",
        kinds: &kinds,
        language: "en",
        limit: 5,
    });
    assert!(sparql.contains(r#"rdfs:label "The \"Ramones\" \\ Co"@en"#));
}

#[test]
fn test_fuzzy_query_text() {
    let sparql = fuzzy_query(&LabelCorpusQuery {
        kind: "Q5",
        language: "fr",
        limit: 100,
    });

    assert!(sparql.contains("?artist wdt:P31 wd:Q5 ."));
    assert!(sparql.contains("FILTER(LANG(?artistLabel) = \"fr\")"));
    assert!(sparql.contains("LIMIT 100"));
    assert!(!sparql.contains("UNION"));
}

#[test]
fn test_escape_literal() {
    assert_eq!(escape_literal("plain"), "plain");
    assert_eq!(escape_literal("a\"b"), "a\\\"b");
    assert_eq!(escape_literal("line\nbreak\ttab"), "line\\nbreak\\ttab");
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

#[test]
fn test_parse_bindings() {
    let candidates = parse_bindings(SAMPLE_RESULTS).unwrap();
    assert_eq!(
        candidates,
        vec![
            Candidate::new("http://www.wikidata.org/entity/Q185828", Some("Daft Punk")),
            Candidate::new("http://www.wikidata.org/entity/Q1", None),
        ]
    );
}

#[test]
fn test_parse_bindings_empty_and_malformed() {
    let empty = r#"{"head": {"vars": []}, "results": {"bindings": []}}"#;
    assert!(parse_bindings(empty).unwrap().is_empty());
    assert!(parse_bindings("<html>rate limited</html>").is_err());
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

#[test]
fn test_client_sends_query_and_parses_response() {
    let (endpoint, rx) = serve_once("200 OK", SAMPLE_RESULTS);
    let client = SparqlClient::new(&endpoint, "tunegraph-test/1.0", Duration::from_secs(5));
    let kinds = kinds();

    let candidates = client
        .exact_label(&ExactLabelQuery {
            label: "Daft Punk",
            kinds: &kinds,
            language: "en",
            limit: 5,
        })
        .unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].label.as_deref(), Some("Daft Punk"));

    let head = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(head.starts_with("get /sparql?"));
    assert!(head.contains("format=json"));
    assert!(head.contains("query="));
    assert!(head.contains("user-agent: tunegraph-test/1.0"));
    assert!(head.contains("accept: application/sparql-results+json"));
}

#[test]
fn test_http_error_status_is_a_query_error() {
    let (endpoint, _rx) = serve_once("500 Internal Server Error", "{}");
    let client = SparqlClient::new(&endpoint, "tunegraph-test/1.0", Duration::from_secs(5));

    let result = client.label_corpus(&LabelCorpusQuery {
        kind: "Q5",
        language: "en",
        limit: 10,
    });
    match result {
        Err(TuneGraphError::Query { endpoint: e, .. }) => assert_eq!(e, endpoint),
        other => panic!("expected query error, got {other:?}"),
    }
}

#[test]
fn test_malformed_body_is_a_query_error() {
    let (endpoint, _rx) = serve_once("200 OK", "not json");
    let client = SparqlClient::new(&endpoint, "tunegraph-test/1.0", Duration::from_secs(5));

    let result = client.label_corpus(&LabelCorpusQuery {
        kind: "Q5",
        language: "en",
        limit: 10,
    });
    assert!(matches!(result, Err(TuneGraphError::Query { .. })));
}

#[test]
fn test_unreachable_endpoint_is_a_query_error() {
    // Bind then drop to get a port nothing is listening on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = SparqlClient::new(
        &format!("http://127.0.0.1:{port}/sparql"),
        "tunegraph-test/1.0",
        Duration::from_secs(2),
    );

    let result = client.label_corpus(&LabelCorpusQuery {
        kind: "Q5",
        language: "en",
        limit: 10,
    });
    assert!(matches!(result, Err(TuneGraphError::Query { .. })));
}

#[test]
fn test_silent_endpoint_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let _held = listener.accept();
        thread::sleep(Duration::from_secs(5));
    });

    let client = SparqlClient::new(
        &format!("http://{addr}/sparql"),
        "tunegraph-test/1.0",
        Duration::from_millis(300),
    );
    assert_eq!(client.endpoint(), format!("http://{addr}/sparql"));

    let result = client.label_corpus(&LabelCorpusQuery {
        kind: "Q5",
        language: "en",
        limit: 10,
    });
    assert!(matches!(result, Err(TuneGraphError::Query { .. })));
}
