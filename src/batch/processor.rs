use std::time::Duration;

use tracing::{debug, info};

use super::store::ResultStore;
use crate::errors::{Result, TuneGraphError};
use crate::knowledge::KnowledgeService;
use crate::resolution::ArtistResolver;
use crate::types::*;

/// Inserts the pause between batches.
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Pacer that blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Groups records into fixed-size batches, resolves each record and appends
/// its result line to the store in input order.
///
/// A flat pause separates consecutive batches. It is taken only when another
/// record is about to enter a new batch, so input that turns out to be
/// already written never causes a pause.
pub struct BatchProcessor<P = ThreadPacer> {
    batch_size: usize,
    delay: Duration,
    pacer: P,
}

impl BatchProcessor<ThreadPacer> {
    pub fn new(batch_size: usize, delay: Duration) -> Result<Self> {
        Self::with_pacer(batch_size, delay, ThreadPacer)
    }
}

impl<P: Pacer> BatchProcessor<P> {
    pub fn with_pacer(batch_size: usize, delay: Duration, pacer: P) -> Result<Self> {
        if batch_size == 0 {
            return Err(TuneGraphError::Config {
                message: "batch size must be at least 1".to_string(),
            });
        }
        Ok(Self {
            batch_size,
            delay,
            pacer,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Processes `records` in order, skipping any whose key is already in the
    /// store or already pending in the current batch.
    pub fn process<S, I>(
        &mut self,
        records: I,
        resolver: &mut ArtistResolver<S>,
        store: &mut ResultStore,
    ) -> Result<ProcessSummary>
    where
        S: KnowledgeService,
        I: IntoIterator<Item = Record>,
    {
        let mut summary = ProcessSummary::default();
        let mut batch: Vec<(String, Record)> = Vec::with_capacity(self.batch_size);
        let mut pause_pending = false;

        for record in records {
            summary.records_read += 1;

            let key = record.key();
            if store.contains(&key) || batch.iter().any(|(pending, _)| *pending == key) {
                debug!(
                    playlist = %record.playlist,
                    artist = %record.artist,
                    track = %record.track,
                    "record already written; skipping"
                );
                summary.skipped_existing += 1;
                continue;
            }

            if pause_pending {
                debug!(delay_ms = self.delay.as_millis() as u64, "pausing between batches");
                self.pacer.pause(self.delay);
                summary.delays += 1;
                pause_pending = false;
            }
            batch.push((key, record));

            if batch.len() >= self.batch_size {
                self.flush(&mut batch, resolver, store, &mut summary)?;
                pause_pending = true;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, resolver, store, &mut summary)?;
        }

        info!(
            read = summary.records_read,
            written = summary.records_written,
            skipped = summary.skipped_existing,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            batches = summary.batches_flushed,
            "processing complete"
        );
        Ok(summary)
    }

    fn flush<S: KnowledgeService>(
        &self,
        batch: &mut Vec<(String, Record)>,
        resolver: &mut ArtistResolver<S>,
        store: &mut ResultStore,
        summary: &mut ProcessSummary,
    ) -> Result<()> {
        let mut writer = store.begin_batch()?;

        for (key, record) in batch.drain(..) {
            let resolution = resolver.resolve_detailed(&record.artist);
            let resolved = ResolvedRecord {
                key,
                ..ResolvedRecord::new(&record, &resolution)
            };
            writer.append(&resolved)?;

            info!(
                playlist = %resolved.playlist,
                artist = %resolved.artist,
                track = %resolved.track,
                id = %resolved.identifier(),
                "wrote result"
            );

            summary.records_written += 1;
            if resolved.canonical_id.is_some() {
                summary.resolved += 1;
            } else {
                summary.unresolved += 1;
            }
        }

        let written = writer.finish()?;
        summary.batches_flushed += 1;
        summary.batch_sizes.push(written);
        info!(batch = summary.batches_flushed, records = written, "flushed batch");
        Ok(())
    }
}
