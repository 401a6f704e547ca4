//! # gql-coverage
//!
//! Operation and argument coverage for generated GraphQL SDK clients.
//!
//! gql-coverage reads a `graphql-codegen` generated TypeScript SDK, records
//! which operations your test suite calls and with which arguments, and
//! reports how much of the API surface the tests exercised.
//!
//! ## Key Features
//!
//! - **Schema extraction**: operations and their argument trees straight from the SDK source
//! - **Call recording**: wrap any client, every routed call lands in a per-operation log
//! - **Coverage**: per-operation argument coverage, enum members counted one by one
//! - **Reports**: console summary, plain-text log and a self-contained HTML page
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gql_coverage::{GraphqlCoverageReport, ReporterOptions};
//!
//! # async fn run() -> gql_coverage::Result<()> {
//! let mut report = GraphqlCoverageReport::new(ReporterOptions::new("src/gql/graphql.ts"))?;
//!
//! report.on_begin().await?;
//! // run the tests, routing SDK calls through `Recorded::call`
//! report.on_end().await?;
//! report.on_exit();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coverage;
pub mod error;
pub mod parser;
pub mod recorder;
pub mod report;
pub mod reporter;
pub mod schema;
pub mod storage;

// Re-exports for convenience
pub use config::ReporterOptions;
pub use error::{CoverageError, Result};
pub use parser::{extract_operations_schema, extract_operations_schema_from_source};
pub use recorder::{CoverageRecorder, Recorded, COVERAGE_DIR_ENV};
pub use report::{OperationArgCoverage, Summary};
pub use reporter::GraphqlCoverageReport;
pub use schema::{EnumLiteral, EnumValue, OperationSchema, ParsedParameter};
