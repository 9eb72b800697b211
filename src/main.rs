use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use tunegraph::graph::{format_report_as_json, format_report_as_markdown};
use tunegraph::tunegraph::TuneGraph;

/// Links playlist artists to Wikidata and builds an RDF knowledge graph.
#[derive(Parser)]
#[command(name = "tunegraph", about = "Links playlist artists to Wikidata and builds an RDF knowledge graph")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration to .tunegraph/config.json
    Init {
        /// Project path (default: current directory)
        path: Option<String>,
    },
    /// Append the playlists of an archive slice to a playlist text file
    Extract {
        /// Archive slice (JSON)
        archive: PathBuf,
        /// Playlist text file to append to
        #[arg(short, long, default_value = "playlists.txt")]
        output: PathBuf,
    },
    /// Resolve every artist in a playlist text file
    Resolve {
        /// Playlist text file
        input: PathBuf,
        /// Result store to append to
        #[arg(short, long, default_value = "results.jsonl")]
        output: PathBuf,
        /// Records per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Pause between batches in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Resolve a single artist name
    Lookup {
        /// Artist name
        name: String,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Build the Turtle document from a result store
    Build {
        /// Result store
        results: PathBuf,
        /// Turtle document to write (overwritten)
        #[arg(short, long, default_value = "music_knowledge_base.ttl")]
        output: PathBuf,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Report playlists, linked artists and unlinked songs
    Report {
        /// Result store
        results: PathBuf,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Installs a stderr subscriber honoring `RUST_LOG`, defaulting to info
/// (debug with `--verbose`) for this crate.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "tunegraph=debug" } else { "tunegraph=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> tunegraph::errors::Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            TuneGraph::init(&project_path)?;
            println!("Initialized tunegraph at {}", project_path.display());
        }
        Commands::Extract { archive, output } => {
            let tg = TuneGraph::open(&resolve_path(None))?;
            let result = tg.extract_archive(&archive, &output)?;
            println!(
                "Extracted {} playlists ({} tracks) into {}",
                result.playlist_count,
                result.track_count,
                output.display()
            );
        }
        Commands::Resolve {
            input,
            output,
            batch_size,
            delay_ms,
            path,
        } => {
            let mut tg = TuneGraph::open(&resolve_path(path))?;
            if let Some(size) = batch_size {
                tg.config_mut().batch_size = size;
            }
            if let Some(delay) = delay_ms {
                tg.config_mut().batch_delay_ms = delay;
            }
            let result = tg.resolve_playlists(&input, &output)?;
            let s = &result.summary;
            println!(
                "Resolved {} of {} records ({} unresolved, {} already written) in {} batches, {}ms",
                s.resolved,
                s.records_read,
                s.unresolved,
                s.skipped_existing,
                s.batches_flushed,
                result.duration_ms
            );
            if result.skipped_lines > 0 {
                println!("  Skipped {} unrecognized input lines", result.skipped_lines);
            }
            println!("Results saved to {}", output.display());
        }
        Commands::Lookup { name, path } => {
            let tg = TuneGraph::open(&resolve_path(path))?;
            let result = tg.lookup(&name)?;
            match result.canonical_id {
                Some(id) => println!("{} -> {} ({})", name, id, result.confidence_tier.as_str()),
                None => println!("{} -> not found", name),
            }
        }
        Commands::Build {
            results,
            output,
            path,
        } => {
            let tg = TuneGraph::open(&resolve_path(path))?;
            let result = tg.build_graph(&results, &output)?;
            println!(
                "Wrote {} triples from {} records to {} in {}ms",
                result.triple_count,
                result.record_count,
                output.display(),
                result.duration_ms
            );
            if result.skipped_count > 0 {
                println!("  Skipped {} malformed lines", result.skipped_count);
            }
        }
        Commands::Report {
            results,
            json,
            path,
        } => {
            let tg = TuneGraph::open(&resolve_path(path))?;
            let report = tg.report(&results)?;
            if json {
                println!("{}", format_report_as_json(&report));
            } else {
                print!("{}", format_report_as_markdown(&report));
            }
        }
    }
    Ok(())
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
