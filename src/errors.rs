use thiserror::Error;

/// Errors that can occur while resolving artists and building the graph.
#[derive(Error, Debug)]
pub enum TuneGraphError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("parse error: {message} (line: {line:?})")]
    Parse { message: String, line: Option<usize> },

    /// A knowledge-service call failed: transport, HTTP status, timeout or
    /// an unreadable response body.
    #[error("query error: {message} (endpoint: {endpoint})")]
    Query { message: String, endpoint: String },

    /// The result store or the graph document could not be opened for writing.
    #[error("storage error: {message} (path: {path})")]
    Storage { message: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `TuneGraphError`.
pub type Result<T> = std::result::Result<T, TuneGraphError>;
