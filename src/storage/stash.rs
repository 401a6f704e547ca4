//! Coverage stash: the scratch directory recorders append to during a run.
//!
//! Layout: one file per operation, named after the operation. Each file holds
//! a sequence of JSON objects, each followed by a comma:
//!
//! ```text
//! {"name":"user","inputParams":[{"id":"1"}]},{"name":"user","inputParams":[{"id":"2"}]},
//! ```
//!
//! Appends for different operations never touch the same file; appends for the
//! same operation rely on append-mode writes keeping whole records intact.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{CoverageError, Result};

/// One recorded invocation of an SDK operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub name: String,
    pub input_params: Vec<Value>,
}

/// All recorded calls of a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCalls {
    pub name: String,
    pub calls: Vec<CallRecord>,
}

/// Scratch directory holding the call logs of one run.
#[derive(Debug, Clone)]
pub struct CoverageStash {
    dir: PathBuf,
}

impl CoverageStash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Log file of a single operation.
    pub fn operation_file(&self, operation: &str) -> PathBuf {
        self.dir.join(operation)
    }

    pub async fn exists(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Wipe whatever a previous (possibly aborted) run left behind and
    /// recreate the directory empty.
    pub async fn reset(&self) -> Result<()> {
        if fs::metadata(&self.dir).await.is_ok() {
            fs::remove_dir_all(&self.dir).await?;
        }
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Append one call record to the operation's log file.
    pub async fn append(&self, record: &CallRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push(',');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.operation_file(&record.name))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(operation = %record.name, bytes = line.len(), "call recorded");
        Ok(())
    }

    /// Read every operation log in the stash.
    ///
    /// Files are read concurrently; the result is sorted by operation name.
    pub async fn read_all(&self) -> Result<Vec<OperationCalls>> {
        if !self.exists().await {
            return Err(CoverageError::MissingCoverageDir(self.dir.clone()));
        }

        let mut entries = fs::read_dir(&self.dir).await?;
        let mut reads = JoinSet::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            reads.spawn(async move {
                let contents = fs::read_to_string(&path).await?;
                let calls = parse_call_log(&name, &contents)?;
                Ok::<_, CoverageError>(OperationCalls { name, calls })
            });
        }

        let mut operations = Vec::new();
        while let Some(joined) = reads.join_next().await {
            let operation = joined.map_err(|e| CoverageError::Io(std::io::Error::other(e)))??;
            operations.push(operation);
        }
        operations.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(dir = %self.dir.display(), operations = operations.len(), "stash read");
        Ok(operations)
    }

    /// Delete the stash directory and everything in it.
    pub async fn remove(&self) -> Result<()> {
        if fs::metadata(&self.dir).await.is_ok() {
            fs::remove_dir_all(&self.dir).await?;
        }
        Ok(())
    }
}

/// Parse the comma-terminated record sequence of one operation log.
pub fn parse_call_log(operation: &str, contents: &str) -> Result<Vec<CallRecord>> {
    let trimmed = contents.trim_end();
    let body = trimmed.strip_suffix(',').unwrap_or(trimmed);
    serde_json::from_str(&format!("[{}]", body)).map_err(|source| {
        CoverageError::MalformedCallLog {
            operation: operation.to_string(),
            source,
        }
    })
}
