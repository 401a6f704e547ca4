//! Reporter options.
//!
//! Options come from code (`ReporterOptions::new`) or a TOML file:
//!
//! ```toml
//! graphql_file_path = "src/gql/graphql.ts"
//! min_coverage_per_operation = 80
//! save_html_summary = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoverageError, Result};
use crate::parser::DEFAULT_SDK_FUNCTION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterOptions {
    /// Generated SDK source file.
    pub graphql_file_path: PathBuf,
    #[serde(default = "ReporterOptions::default_coverage_file_path")]
    pub coverage_file_path: PathBuf,
    #[serde(default = "ReporterOptions::default_html_file_path")]
    pub html_file_path: PathBuf,
    #[serde(default)]
    pub log_uncovered_operations: bool,
    /// Argument coverage an operation needs to count as covered, in percent.
    #[serde(default = "ReporterOptions::default_min_coverage")]
    pub min_coverage_per_operation: f64,
    #[serde(default)]
    pub save_gql_coverage_log: bool,
    #[serde(default)]
    pub save_html_summary: bool,
    /// Scratch directory for call logs. Derived from the SDK file name when unset.
    #[serde(default)]
    pub coverage_dir: Option<PathBuf>,
    #[serde(default = "ReporterOptions::default_sdk_function_name")]
    pub sdk_function_name: String,
}

impl ReporterOptions {
    pub fn new(graphql_file_path: impl Into<PathBuf>) -> Self {
        Self {
            graphql_file_path: graphql_file_path.into(),
            coverage_file_path: Self::default_coverage_file_path(),
            html_file_path: Self::default_html_file_path(),
            log_uncovered_operations: false,
            min_coverage_per_operation: Self::default_min_coverage(),
            save_gql_coverage_log: false,
            save_html_summary: false,
            coverage_dir: None,
            sdk_function_name: Self::default_sdk_function_name(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let options: Self =
            toml::from_str(contents).map_err(|e| CoverageError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoverageError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let min = self.min_coverage_per_operation;
        if !(0.0..=100.0).contains(&min) {
            return Err(CoverageError::Config(format!(
                "min_coverage_per_operation must be within 0..=100, got {}",
                min
            )));
        }
        if self.sdk_function_name.trim().is_empty() {
            return Err(CoverageError::Config(
                "sdk_function_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Scratch directory of this run.
    ///
    /// `src/gql/graphql.ts` maps to `<cwd>/.graphql-coverage` unless
    /// `coverage_dir` is set.
    pub fn coverage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.coverage_dir {
            return Ok(dir.clone());
        }
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(stash_dir_name(&self.graphql_file_path)))
    }

    fn default_coverage_file_path() -> PathBuf {
        PathBuf::from("./gql-coverage.log")
    }

    fn default_html_file_path() -> PathBuf {
        PathBuf::from("./gql-coverage.html")
    }

    fn default_min_coverage() -> f64 {
        100.0
    }

    fn default_sdk_function_name() -> String {
        DEFAULT_SDK_FUNCTION.to_string()
    }
}

fn stash_dir_name(sdk_file: &Path) -> String {
    let file_name = sdk_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".ts").unwrap_or(&file_name);
    format!(".{}-coverage", stem)
}
