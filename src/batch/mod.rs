/// Batched, rate-limited resolution of extracted records into an
/// append-only result store.
mod processor;
mod store;

pub use processor::{BatchProcessor, Pacer, ThreadPacer};
pub use store::{BatchWriter, ResultStore};
