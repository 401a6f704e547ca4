//! Self-contained HTML rendering of a coverage summary.

use chrono::{DateTime, Local};

use crate::coverage::args_map;
use crate::report::Summary;
use crate::schema::OperationSchema;

const STYLE: &str = r#"
    :root {
        --primary-color: #007BFF;
        --covered-color: #28A745;
        --uncovered-color: #DC3545;
        --gray-color: #E9ECEF;
        --bg-color: #F8F9FA;
        --text-color: #212529;
        --border-radius: 8px;
    }
    body { font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: var(--bg-color); color: var(--text-color); }
    .container { max-width: 1200px; margin: 0 auto; padding: 20px; }
    .header { text-align: center; background-color: var(--primary-color); color: white; padding: 20px; border-radius: var(--border-radius); }
    .header h1 { margin: 0; }
    .header small { opacity: 0.8; }
    .summary { display: flex; justify-content: space-between; margin-top: 20px; padding: 15px; background-color: white; border-radius: var(--border-radius); box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1); }
    .summary div { text-align: center; }
    .operations { margin-top: 30px; }
    .operation { padding: 15px; margin-bottom: 20px; background-color: white; border-radius: var(--border-radius); box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1); }
    .operation h3 { margin-bottom: 10px; }
    .operation h3 span { float: right; }
    .operation.covered { border-left: 5px solid var(--covered-color); }
    .operation.covered h3 span { color: var(--covered-color); }
    .operation.uncovered { border-left: 5px solid var(--uncovered-color); }
    .operation.uncovered h3 span { color: var(--uncovered-color); }
    pre { background-color: #f1f1f1; padding: 10px; border-radius: var(--border-radius); overflow-x: auto; }
    pre.empty-field { background-color: var(--gray-color); }
"#;

/// Render the HTML report for a finished run.
pub fn render_html_report(
    summary: &Summary,
    schemas: &[OperationSchema],
    generated_at: DateTime<Local>,
) -> String {
    let operations: String = schemas
        .iter()
        .map(|schema| render_operation(summary, schema))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GraphQL Coverage Report</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>GraphQL Coverage Report</h1>
            <small>Generated {generated}</small>
        </div>
        <div class="summary">
            <div><strong>Coverage:</strong><br>{coverage}</div>
            <div><strong>Total Operations:</strong><br>{total}</div>
            <div><strong>Covered:</strong><br>{covered}</div>
            <div><strong>Total Args Coverage:</strong><br>{args}</div>
        </div>
        <div class="operations">{operations}
        </div>
    </div>
</body>
</html>
"#,
        style = STYLE,
        generated = escape_html(&generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        coverage = escape_html(&summary.coverage),
        total = summary.coverage_total,
        covered = summary.covered,
        args = escape_html(&summary.operations_coverage_summary),
        operations = operations,
    )
}

fn render_operation(summary: &Summary, schema: &OperationSchema) -> String {
    let info = summary
        .operations_arg_coverage
        .iter()
        .find(|o| o.name == schema.name);
    let class = if info.map(|i| i.covered).unwrap_or(false) {
        "covered"
    } else {
        "uncovered"
    };
    let args_coverage = info.map(|i| i.args_coverage.as_str()).unwrap_or("N/A");

    let (pre_class, body) = if schema.input_params.is_empty() {
        ("empty-field", "No arguments provided".to_string())
    } else {
        ("", escape_html(args_map(schema).trim()))
    };

    format!(
        r#"
            <div class="operation {class}">
                <h3>{name} <span>{coverage}</span></h3>
                <pre class="{pre_class}">{body}</pre>
            </div>"#,
        class = class,
        name = escape_html(&schema.name),
        coverage = escape_html(args_coverage),
        pre_class = pre_class,
        body = body,
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
