use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::batch::{BatchProcessor, Pacer, ResultStore, ThreadPacer};
use crate::config::{get_cache_path, load_config, save_config, TuneGraphConfig};
use crate::errors::{Result, TuneGraphError};
use crate::extraction::{parse_archive, parse_playlist_text, render_playlist_text};
use crate::graph::{GraphBuilder, GraphQueries, KnowledgeGraph};
use crate::knowledge::{KnowledgeService, SparqlClient};
use crate::resolution::{ArtistResolver, ResolutionCache, ResolverSettings};
use crate::types::*;

/// Central orchestrator that wires configuration, the knowledge service and
/// the pipeline stages together for one project directory.
pub struct TuneGraph {
    config: TuneGraphConfig,
    project_root: PathBuf,
}

/// Result of an archive extraction.
pub struct ExtractResult {
    pub playlist_count: usize,
    pub track_count: usize,
}

/// Result of a resolution run.
pub struct ResolveResult {
    pub summary: ProcessSummary,
    /// Input lines that were not understood.
    pub skipped_lines: usize,
    /// Entries in the resolution cache after the run.
    pub cache_entries: usize,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Result of a graph build.
pub struct BuildResult {
    pub record_count: usize,
    pub skipped_count: usize,
    pub triple_count: usize,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl TuneGraph {
    /// Initializes a project at the given root by writing the default configuration.
    pub fn init(project_root: &Path) -> Result<Self> {
        let config = TuneGraphConfig::default();
        save_config(project_root, &config)?;
        Ok(Self {
            config,
            project_root: project_root.to_path_buf(),
        })
    }

    /// Opens a project, falling back to the default configuration if none
    /// has been saved.
    pub fn open(project_root: &Path) -> Result<Self> {
        let config = load_config(project_root)?;
        Self::with_config(project_root, config)
    }

    pub fn with_config(project_root: &Path, config: TuneGraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            project_root: project_root.to_path_buf(),
        })
    }

    pub fn config(&self) -> &TuneGraphConfig {
        &self.config
    }

    /// Mutable access for command-line overrides; the configuration is
    /// validated again before each run.
    pub fn config_mut(&mut self) -> &mut TuneGraphConfig {
        &mut self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

impl TuneGraph {
    /// Converts an archive slice into playlist text appended to `output`.
    pub fn extract_archive(&self, archive: &Path, output: &Path) -> Result<ExtractResult> {
        let json = read_file(archive)?;
        let playlists = parse_archive(&json)?;
        let text = render_playlist_text(&playlists);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output)
            .map_err(|e| TuneGraphError::Storage {
                message: format!("failed to open playlist text: {e}"),
                path: output.display().to_string(),
            })?;
        file.write_all(text.as_bytes())?;

        let track_count = playlists.iter().map(|p| p.tracks.len()).sum();
        info!(
            archive = %archive.display(),
            playlists = playlists.len(),
            tracks = track_count,
            "extracted playlists"
        );
        Ok(ExtractResult {
            playlist_count: playlists.len(),
            track_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl TuneGraph {
    /// Resolves every record of the playlist text at `input` against the
    /// configured SPARQL endpoint, appending results to `output`.
    pub fn resolve_playlists(&self, input: &Path, output: &Path) -> Result<ResolveResult> {
        let client = SparqlClient::from_config(&self.config);
        self.resolve_playlists_with(client, ThreadPacer, input, output)
    }

    /// Same as [`resolve_playlists`](Self::resolve_playlists) with an explicit
    /// knowledge service and pacer.
    pub fn resolve_playlists_with<S, P>(
        &self,
        service: S,
        pacer: P,
        input: &Path,
        output: &Path,
    ) -> Result<ResolveResult>
    where
        S: KnowledgeService,
        P: Pacer,
    {
        let start = Instant::now();
        self.config.validate()?;

        let parsed = parse_playlist_text(&read_file(input)?);
        let mut store = ResultStore::open(output, self.config.result_format)?;
        let mut processor =
            BatchProcessor::with_pacer(self.config.batch_size, self.config.batch_delay(), pacer)?;
        let mut resolver = self.resolver(service)?;

        let outcome = processor.process(parsed.records, &mut resolver, &mut store);
        let cache = resolver.into_cache();
        self.persist_cache(&cache)?;
        let summary = outcome?;

        Ok(ResolveResult {
            summary,
            skipped_lines: parsed.skipped,
            cache_entries: cache.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Resolves a single artist name against the configured endpoint.
    pub fn lookup(&self, name: &str) -> Result<ResolutionResult> {
        let client = SparqlClient::from_config(&self.config);
        self.lookup_with(client, name)
    }

    pub fn lookup_with<S: KnowledgeService>(&self, service: S, name: &str) -> Result<ResolutionResult> {
        self.config.validate()?;
        let mut resolver = self.resolver(service)?;
        let result = resolver.resolve_detailed(name);
        self.persist_cache(resolver.cache())?;
        Ok(result)
    }

    fn resolver<S: KnowledgeService>(&self, service: S) -> Result<ArtistResolver<S>> {
        let cache = if self.config.enable_cache {
            ResolutionCache::load(&get_cache_path(&self.project_root))?
        } else {
            ResolutionCache::new()
        };
        Ok(ArtistResolver::with_cache(
            service,
            ResolverSettings::from_config(&self.config),
            cache,
        ))
    }

    fn persist_cache(&self, cache: &ResolutionCache) -> Result<()> {
        if !self.config.enable_cache {
            return Ok(());
        }
        info!(
            entries = cache.len(),
            hits = cache.hits(),
            misses = cache.misses(),
            "saving resolution cache"
        );
        cache.save(&get_cache_path(&self.project_root))
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

impl TuneGraph {
    /// Builds the graph from a result store without writing it.
    pub fn load_graph(&self, results: &Path) -> Result<KnowledgeGraph> {
        let text = read_file(results)?;
        Ok(GraphBuilder::build(&self.config.namespace, &text))
    }

    /// Builds the graph from `results` and writes the Turtle document to
    /// `output`, replacing any previous document.
    pub fn build_graph(&self, results: &Path, output: &Path) -> Result<BuildResult> {
        let start = Instant::now();
        let graph = self.load_graph(results)?;
        graph.write_to(output)?;

        info!(
            output = %output.display(),
            records = graph.record_count(),
            skipped = graph.skipped_count(),
            triples = graph.triples().len(),
            "wrote graph document"
        );
        Ok(BuildResult {
            record_count: graph.record_count(),
            skipped_count: graph.skipped_count(),
            triple_count: graph.triples().len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Runs the read-only reports over the graph built from `results`.
    pub fn report(&self, results: &Path) -> Result<GraphReport> {
        let graph = self.load_graph(results)?;
        Ok(GraphQueries::new(&graph).report())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| TuneGraphError::File {
        message: format!("failed to read file: {e}"),
        path: path.display().to_string(),
    })
}
