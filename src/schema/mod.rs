//! Operation schema model.
//!
//! The extractor produces these types from a generated SDK and the
//! accumulator mutates their `called` counters during a run.

pub mod types;

pub use types::{EnumLiteral, EnumValue, OperationSchema, ParsedParameter};
