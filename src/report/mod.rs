//! Report assembly: the computed `Summary` and its text/HTML renderings.

pub mod html;
pub mod log;
pub mod summary;

pub use html::render_html_report;
pub use log::{operation_block, render_coverage_log};
pub use summary::{OperationArgCoverage, Summary};
