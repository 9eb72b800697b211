use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::errors::{Result, TuneGraphError};
use crate::types::ResolutionResult;

/// Normalizes an artist name for cache lookups: trimmed, with whitespace runs
/// collapsed to a single space.
///
/// Letter case is kept. The direct phase sends the label verbatim, so two
/// spellings that differ only in case can resolve differently.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolution outcomes keyed by normalized artist name.
///
/// Entries are kept in a `BTreeMap` so the persisted file is stable across runs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResolutionCache {
    entries: BTreeMap<String, ResolutionResult>,
    #[serde(skip)]
    hits: u64,
    #[serde(skip)]
    misses: u64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a cache from `path`, returning an empty cache if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path).map_err(|e| TuneGraphError::File {
            message: format!("failed to read resolution cache: {e}"),
            path: path.display().to_string(),
        })?;
        let entries: BTreeMap<String, ResolutionResult> = serde_json::from_str(&contents)?;
        Ok(Self {
            entries,
            ..Self::default()
        })
    }

    /// Writes the cache to `path`, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        write_atomic(path, json.as_bytes()).map_err(|e| TuneGraphError::Storage {
            message: format!("failed to write resolution cache: {e}"),
            path: path.display().to_string(),
        })
    }

    /// Looks up `name`, returning the cached outcome relabelled with the
    /// spelling that was asked for.
    pub fn get(&mut self, name: &str) -> Option<ResolutionResult> {
        match self.entries.get(&normalize_name(name)) {
            Some(cached) => {
                self.hits += 1;
                Some(ResolutionResult {
                    artist_name: name.to_string(),
                    ..cached.clone()
                })
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, result: &ResolutionResult) {
        self.entries
            .insert(normalize_name(&result.artist_name), result.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
