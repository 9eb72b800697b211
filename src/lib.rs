pub mod atomic;
pub mod batch;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod graph;
pub mod knowledge;
pub mod resolution;
pub mod result_line;
pub mod tunegraph;
pub mod types;
