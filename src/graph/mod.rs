/// Triple synthesis and Turtle serialization.
pub mod builder;

/// Read-only reports over a built graph.
pub mod queries;

/// Markdown and JSON rendering of graph reports.
pub mod formatter;

pub use builder::{slugify, uri, GraphBuilder, KnowledgeGraph};
pub use formatter::{format_report_as_json, format_report_as_markdown};
pub use queries::GraphQueries;
