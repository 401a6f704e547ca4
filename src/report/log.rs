//! Plain-text coverage log.
//!
//! ```text
//! Args coverage: 100%
//! group (id ✔);
//!
//! Args coverage: 0%
//! groups ();
//!
//! Total arguments coverage: 50.00%
//! ```

use crate::coverage::args_map;
use crate::report::Summary;
use crate::schema::OperationSchema;

/// Coverage block of a single operation, without the separating newline.
pub fn operation_block(operation: &OperationSchema, args_coverage: &str) -> String {
    format!(
        "Args coverage: {}\n{} {}",
        args_coverage,
        operation.name,
        args_map(operation)
    )
}

/// The whole coverage log for a run.
pub fn render_coverage_log(summary: &Summary, schemas: &[OperationSchema]) -> String {
    let mut out = String::new();
    for schema in schemas {
        let args_coverage = summary
            .operations_arg_coverage
            .iter()
            .find(|o| o.name == schema.name)
            .map(|o| o.args_coverage.as_str())
            .unwrap_or("0%");
        out.push_str(&operation_block(schema, args_coverage));
        out.push('\n');
    }
    out.push_str(&format!(
        "Total arguments coverage: {}\n",
        summary.operations_coverage_summary
    ));
    out
}
