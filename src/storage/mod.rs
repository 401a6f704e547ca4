//! Per-run scratch storage for recorded operation calls.

pub mod stash;

pub use stash::{parse_call_log, CallRecord, CoverageStash, OperationCalls};
