//! Error types for gql-coverage.

use std::path::PathBuf;

/// Everything that can go wrong while extracting a schema, recording calls
/// or assembling a coverage report.
#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    /// The configured SDK file does not exist on disk.
    #[error("Source file '{}' does not exist.", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to initialize TypeScript parser for {}: {1}", .0.display())]
    ParserInit(PathBuf, String),

    #[error("tree-sitter returned no parse tree for {}", .0.display())]
    TreeSitterParseFailed(PathBuf),

    /// The SDK factory function is not declared in the source file.
    #[error("Function: '{function}' not found in file: '{}'", path.display())]
    FunctionNotFound { function: String, path: PathBuf },

    /// The factory exists but its operation map could not be resolved.
    #[error("The return type of '{0}' could not be determined.")]
    ReturnTypeUnresolved(String),

    /// A custom type refers back to itself through its fields.
    #[error("cyclic type reference detected while resolving '{0}'")]
    CyclicType(String),

    /// The scratch directory was gone when the run ended.
    #[error("Directory with logged coverage was not found: {}", .0.display())]
    MissingCoverageDir(PathBuf),

    /// More coverage items were counted as covered than exist.
    #[error("Args coverage calculation has an issue for '{operation}': {covered} covered of {total} items")]
    Consistency {
        operation: String,
        covered: usize,
        total: usize,
    },

    #[error("call log for operation '{operation}' is not valid JSON: {source}")]
    MalformedCallLog {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoverageError>;
