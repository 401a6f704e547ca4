//! Call recorder: logs every SDK operation invocation into the coverage stash.
//!
//! Wrap a generated client with [`Recorded`] and route operation calls
//! through [`Recorded::call`]. The record append runs alongside the wrapped
//! call and both finish before the caller sees the result, so a settled call
//! always has its record on disk.
//!
//! ```rust,no_run
//! use gql_coverage::{CoverageError, CoverageRecorder, Recorded};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct UserVariables { id: String }
//!
//! struct Sdk;
//! impl Sdk {
//!     async fn user(&self, vars: UserVariables) -> Result<String, CoverageError> {
//!         Ok(vars.id)
//!     }
//! }
//!
//! # async fn run() -> Result<(), CoverageError> {
//! let sdk = Recorded::new(Sdk, CoverageRecorder::new(".sdk-coverage"));
//! let id = sdk
//!     .call("user", UserVariables { id: "1".into() }, |sdk, vars| sdk.user(vars))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::ops::Deref;
use std::path::PathBuf;

use crate::error::CoverageError;
use crate::storage::{CallRecord, CoverageStash};

/// Environment variable a host sets to hand the stash path to test processes.
pub const COVERAGE_DIR_ENV: &str = "GQL_COVERAGE_DIR";

/// Appends call records to a coverage stash.
#[derive(Debug, Clone)]
pub struct CoverageRecorder {
    stash: CoverageStash,
}

impl CoverageRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            stash: CoverageStash::new(dir),
        }
    }

    /// Recorder for the stash named by `GQL_COVERAGE_DIR`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(COVERAGE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(|dir| Self::new(PathBuf::from(dir)))
    }

    pub fn stash(&self) -> &CoverageStash {
        &self.stash
    }

    /// Run `call` while appending `{name, inputParams}` for it.
    ///
    /// The wrapped call's own error takes precedence. A failed append is
    /// reported only when the call itself succeeded.
    pub async fn record<T, E, Fut>(&self, operation: &str, args: Vec<Value>, call: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<CoverageError>,
    {
        let record = CallRecord {
            name: operation.to_string(),
            input_params: args,
        };
        let (logged, outcome) = tokio::join!(self.stash.append(&record), call);
        let value = outcome?;
        logged.map_err(E::from)?;
        Ok(value)
    }
}

/// A client whose operation calls are recorded.
///
/// Derefs to the wrapped client, so members that are not routed through
/// [`Recorded::call`] stay reachable and are never logged.
pub struct Recorded<C> {
    client: C,
    recorder: CoverageRecorder,
}

impl<C> Recorded<C> {
    pub fn new(client: C, recorder: CoverageRecorder) -> Self {
        Self { client, recorder }
    }

    pub fn recorder(&self) -> &CoverageRecorder {
        &self.recorder
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// Invoke an operation of the wrapped client and record its variables.
    pub async fn call<'c, V, T, E, F, Fut>(&'c self, operation: &str, variables: V, f: F) -> Result<T, E>
    where
        V: Serialize,
        F: FnOnce(&'c C, V) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoverageError>,
    {
        let args = serde_json::to_value(&variables)
            .map(|v| vec![v])
            .map_err(|e| E::from(CoverageError::Json(e)))?;
        self.recorder
            .record(operation, args, f(&self.client, variables))
            .await
    }
}

impl<C> Deref for Recorded<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}
