//! Coverage accumulation: merges recorded calls into the operation schema
//! and turns the resulting counters into percentages.

pub mod accumulate;
pub mod calculate;

pub use accumulate::{accumulate, increment_counters};
pub use calculate::{
    args_map, floor_ratio, format_percent, operation_coverage, param_coverage_string,
    total_args_coverage, CoverageTally, COVERAGE_DECIMALS,
};
