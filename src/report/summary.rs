//! The coverage summary of one run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::coverage::{floor_ratio, format_percent, operation_coverage, total_args_coverage, COVERAGE_DECIMALS};
use crate::error::Result;
use crate::schema::OperationSchema;

const RULE_WIDTH: usize = 170;
const BANNER_WIDTH: usize = 75;

/// Argument coverage of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationArgCoverage {
    pub name: String,
    /// Formatted percentage, e.g. `66.66%`.
    pub args_coverage: String,
    /// Called during the run and at or above the per-operation threshold.
    pub covered: bool,
}

/// Final report payload. Built once when a run ends, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Share of operations meeting the threshold, e.g. `25%`.
    pub coverage: String,
    pub coverage_total: usize,
    pub covered: usize,
    /// Mean argument coverage over all operations, e.g. `75.00%`.
    pub operations_coverage_summary: String,
    pub operations_arg_coverage: Vec<OperationArgCoverage>,
}

impl Summary {
    /// Build the summary from accumulated schemas.
    ///
    /// `called` holds the names of operations recorded at least once.
    pub fn build(
        schemas: &[OperationSchema],
        called: &HashSet<String>,
        min_coverage_per_operation: f64,
    ) -> Result<Self> {
        let mut operations_arg_coverage = Vec::with_capacity(schemas.len());
        for schema in schemas {
            let was_called = called.contains(&schema.name);
            let percentage = operation_coverage(schema, was_called)?;
            operations_arg_coverage.push(OperationArgCoverage {
                name: schema.name.clone(),
                args_coverage: format_percent(percentage),
                covered: was_called && percentage >= min_coverage_per_operation,
            });
        }

        let coverages: Vec<&str> = operations_arg_coverage
            .iter()
            .map(|o| o.args_coverage.as_str())
            .collect();
        let operations_coverage_summary = total_args_coverage(&coverages);

        let covered = operations_arg_coverage.iter().filter(|o| o.covered).count();
        let coverage_total = schemas.len();

        Ok(Self {
            coverage: format_percent(floor_ratio(covered, coverage_total, COVERAGE_DECIMALS)),
            coverage_total,
            covered,
            operations_coverage_summary,
            operations_arg_coverage,
        })
    }

    /// The four headline lines.
    pub fn console_lines(&self) -> [String; 4] {
        [
            format!("GQL Operations coverage in executed tests: {}", self.coverage),
            format!("Total operations: {}", self.coverage_total),
            format!("Covered operations: {}", self.covered),
            format!("Total arguments coverage: {}", self.operations_coverage_summary),
        ]
    }

    /// Operations that missed the threshold, with their argument coverage.
    pub fn uncovered(&self) -> impl Iterator<Item = &OperationArgCoverage> {
        self.operations_arg_coverage.iter().filter(|o| !o.covered)
    }

    /// Console report as printed when the run exits.
    pub fn render_console(&self, log_uncovered_operations: bool) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = format!("\n{}\n", rule);
        for line in self.console_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        if log_uncovered_operations {
            let banner = "=".repeat(BANNER_WIDTH);
            out.push_str(&format!("{} Uncovered operations {}\n", banner, banner));
            for op in self.uncovered() {
                out.push_str(&format!("{} {}\n", op.name, op.args_coverage));
            }
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }
}
