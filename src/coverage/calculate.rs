//! Coverage arithmetic and the per-operation argument trees.
//!
//! A coverage item is a parameter, or one member of an enum parameter.
//! Percentages are floored (never rounded up) to [`COVERAGE_DECIMALS`] places.

use crate::error::{CoverageError, Result};
use crate::schema::{OperationSchema, ParsedParameter};

/// Decimal places kept by every coverage percentage.
pub const COVERAGE_DECIMALS: u32 = 2;

const COVERED_SIGN: &str = "\u{2714}"; // ✔
const UNCOVERED_SIGN: &str = "\u{2718}"; // ✘

/// `floor(numerator / denominator * 100 * 10^decimals) / 10^decimals`,
/// computed on integers so the floor is exact.
pub fn floor_ratio(numerator: usize, denominator: usize, decimals: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let scale = 10u128.pow(decimals);
    let scaled = numerator as u128 * 100 * scale / denominator as u128;
    scaled as f64 / scale as f64
}

/// `100` → `100%`, `33.33` → `33.33%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value)
}

/// Covered versus total coverage items of a parameter tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageTally {
    pub covered: usize,
    pub total: usize,
}

impl CoverageTally {
    pub fn of_params(params: &[ParsedParameter]) -> Self {
        let mut tally = Self::default();
        params.iter().for_each(|p| tally.add_param(p));
        tally
    }

    fn add_param(&mut self, param: &ParsedParameter) {
        self.add_item(param.called);
        if let Some(subs) = &param.sub_params {
            subs.iter().for_each(|p| self.add_param(p));
        } else if let Some(values) = &param.enum_values {
            values.iter().for_each(|v| self.add_item(v.called));
        }
    }

    fn add_item(&mut self, called: u64) {
        self.total += 1;
        if called > 0 {
            self.covered += 1;
        }
    }

    /// Percentage of covered items; `100` when there is nothing to cover.
    ///
    /// More covered than total items means the merge is broken, and the
    /// run is aborted rather than reporting a misleading number.
    pub fn percentage(&self, operation: &str) -> Result<f64> {
        if self.total == 0 {
            return Ok(100.0);
        }
        if self.covered > self.total {
            return Err(CoverageError::Consistency {
                operation: operation.to_string(),
                covered: self.covered,
                total: self.total,
            });
        }
        Ok(floor_ratio(self.covered, self.total, COVERAGE_DECIMALS))
    }
}

/// Argument coverage of one operation.
///
/// Operations never called score `0`. Called operations without arguments
/// score `100`.
pub fn operation_coverage(operation: &OperationSchema, covered: bool) -> Result<f64> {
    if !covered {
        return Ok(0.0);
    }
    if operation.input_params.is_empty() {
        return Ok(100.0);
    }
    CoverageTally::of_params(&operation.input_params).percentage(&operation.name)
}

/// Mean of per-operation percentage strings, as `75.00%`.
///
/// Inputs carry at most two decimals, so the mean is computed on integer
/// hundredths and rounded half up.
pub fn total_args_coverage<S: AsRef<str>>(coverages: &[S]) -> String {
    let hundredths: Vec<u128> = coverages
        .iter()
        .filter_map(|c| c.as_ref().trim().trim_end_matches('%').parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| (v * 100.0).round() as u128)
        .collect();
    let mean = if hundredths.is_empty() {
        0
    } else {
        let count = hundredths.len() as u128;
        (2 * hundredths.iter().sum::<u128>() + count) / (2 * count)
    };
    format!("{}.{:02}%", mean / 100, mean % 100)
}

fn cover_sign(called: u64) -> &'static str {
    if called > 0 {
        COVERED_SIGN
    } else {
        UNCOVERED_SIGN
    }
}

/// Glyph tree of one parameter:
///
/// ```text
/// filter ✔: {
///   name ✘,
///   role ✔: [ADMIN ✔, USER ✘]
/// }
/// ```
pub fn param_coverage_string(param: &ParsedParameter, indent: &str) -> String {
    let mut out = format!("{}{} {}", indent, param.key, cover_sign(param.called));
    if let Some(subs) = &param.sub_params {
        let child_indent = format!("{}  ", indent);
        let children: Vec<String> = subs
            .iter()
            .map(|p| param_coverage_string(p, &child_indent))
            .collect();
        out.push_str(&format!(": {{\n{}\n{}}}", children.join(",\n"), indent));
    } else if let Some(values) = &param.enum_values {
        let members: Vec<String> = values
            .iter()
            .map(|v| format!("{} {}", v.value, cover_sign(v.called)))
            .collect();
        out.push_str(&format!(": [{}]", members.join(", ")));
    }
    out
}

/// `(<param trees joined by ",\n">);\n` for one operation.
pub fn args_map(operation: &OperationSchema) -> String {
    let params: Vec<String> = operation
        .input_params
        .iter()
        .map(|p| param_coverage_string(p, ""))
        .collect();
    format!("({});\n", params.join(",\n"))
}
