//! Coverage run lifecycle: begin, end, exit.
//!
//! A host calls [`GraphqlCoverageReport::on_begin`] once before tests start,
//! [`GraphqlCoverageReport::on_end`] once they all finished, and
//! [`GraphqlCoverageReport::on_exit`] right before the process exits.

use chrono::Local;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::ReporterOptions;
use crate::coverage::accumulate;
use crate::error::{CoverageError, Result};
use crate::parser::extract_operations_schema;
use crate::recorder::CoverageRecorder;
use crate::report::{render_coverage_log, render_html_report, Summary};
use crate::schema::OperationSchema;
use crate::storage::CoverageStash;

pub struct GraphqlCoverageReport {
    options: ReporterOptions,
    stash: CoverageStash,
    /// Extracted schema with all counters at zero.
    operations_schema: Vec<OperationSchema>,
    /// Schema with the counters of the last finished run.
    accumulated: Option<Vec<OperationSchema>>,
    summary: Option<Summary>,
}

impl GraphqlCoverageReport {
    /// Validate the options and extract the operation schema from the SDK file.
    pub fn new(options: ReporterOptions) -> Result<Self> {
        options.validate()?;

        let sdk_path = absolute(&options.graphql_file_path)?;
        if !sdk_path.is_file() {
            return Err(CoverageError::FileNotFound(sdk_path));
        }

        let operations_schema = extract_operations_schema(&sdk_path, &options.sdk_function_name)?;
        let stash = CoverageStash::new(options.coverage_dir()?);
        info!(
            sdk = %sdk_path.display(),
            operations = operations_schema.len(),
            stash = %stash.path().display(),
            "coverage reporter ready"
        );

        Ok(Self {
            options,
            stash,
            operations_schema,
            accumulated: None,
            summary: None,
        })
    }

    pub fn options(&self) -> &ReporterOptions {
        &self.options
    }

    /// Scratch directory recorders must append to.
    pub fn coverage_dir(&self) -> &Path {
        self.stash.path()
    }

    /// Recorder writing into this run's scratch directory.
    pub fn recorder(&self) -> CoverageRecorder {
        CoverageRecorder::new(self.stash.path())
    }

    /// The extracted schema, counters untouched.
    pub fn operations_schema(&self) -> &[OperationSchema] {
        &self.operations_schema
    }

    /// The schema with counters of the last `on_end`.
    pub fn accumulated_schema(&self) -> Option<&[OperationSchema]> {
        self.accumulated.as_deref()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Wipe leftovers of a previous run and create an empty scratch directory.
    pub async fn on_begin(&mut self) -> Result<()> {
        self.stash.reset().await?;
        self.accumulated = None;
        self.summary = None;
        info!(stash = %self.stash.path().display(), "coverage run started");
        Ok(())
    }

    /// Merge every recorded call into the schema, build the summary and write
    /// the enabled report files. The scratch directory is removed last, also
    /// when the run fails.
    pub async fn on_end(&mut self) -> Result<&Summary> {
        let outcome = self.reconcile().await;
        let cleanup = self.stash.remove().await;
        let (schemas, summary) = outcome?;
        cleanup?;

        info!(
            covered = summary.covered,
            total = summary.coverage_total,
            coverage = %summary.coverage,
            "coverage run finished"
        );

        self.accumulated = Some(schemas);
        Ok(self.summary.insert(summary))
    }

    async fn reconcile(&self) -> Result<(Vec<OperationSchema>, Summary)> {
        let recorded = self.stash.read_all().await?;
        debug!(files = recorded.len(), "call logs read");

        let mut schemas = self.operations_schema.clone();
        schemas.iter_mut().for_each(OperationSchema::reset_counters);
        accumulate(&mut schemas, &recorded);

        let called: HashSet<String> = recorded.into_iter().map(|o| o.name).collect();
        let summary = Summary::build(
            &schemas,
            &called,
            self.options.min_coverage_per_operation,
        )?;

        if self.options.save_gql_coverage_log {
            let path = &self.options.coverage_file_path;
            if fs::metadata(path).await.is_ok() {
                fs::remove_file(path).await?;
            }
            write_report(path, &render_coverage_log(&summary, &schemas)).await?;
            info!(path = %path.display(), "coverage log written");
        }

        if self.options.save_html_summary {
            let path = &self.options.html_file_path;
            write_report(path, &render_html_report(&summary, &schemas, Local::now())).await?;
            info!(path = %path.display(), "html report written");
        }

        Ok((schemas, summary))
    }

    /// Console report of the last finished run.
    pub fn console_report(&self) -> Option<String> {
        self.summary
            .as_ref()
            .map(|s| s.render_console(self.options.log_uncovered_operations))
    }

    /// Print the console report to stdout.
    pub fn on_exit(&self) {
        match self.console_report() {
            Some(report) => print!("{}", report),
            None => warn!("on_exit called before on_end, no coverage to report"),
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

async fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await?;
    Ok(())
}
