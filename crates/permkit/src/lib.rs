//! # permkit
//!
//! Derive the IAM permissions a deployment role needs to apply a Terraform
//! plan.
//!
//! The pipeline is a straight line:
//!
//! 1. run `terraform plan` and convert its output to JSON with
//!    `parse-terraform-plan`
//! 2. list the resources already in state (`terraform state list`); each
//!    one needs to stay readable
//! 3. turn state and plan into [`ActionRecord`]s
//! 4. look every record up in a [`PermissionsTable`] keyed by
//!    `qualifier.type.action` and union the results
//!
//! ## Example
//!
//! ```no_run
//! use permkit::{Client, PipelineOptions};
//! use std::path::PathBuf;
//!
//! let client = Client::new(permkit::backend::default_backend());
//! let options = PipelineOptions::new(PathBuf::from("infra"), PathBuf::from("permissions.json"));
//!
//! let report = client.run(&options).expect("pipeline failed");
//! for permission in &report.permissions {
//!     println!("{permission}");
//! }
//! ```
//!
//! ## Errors
//!
//! Failing external commands, an unreadable permissions file and a plan
//! JSON that exists but cannot be parsed are fatal. A permissions table
//! without an entry for a record is not: the record just contributes no
//! permissions and is listed in [`Report::unmapped`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod permissions;
pub mod plan;
pub mod ringbuf;
pub mod runner;
pub mod state;
pub mod types;

pub use error::{Error, Result};
pub use permissions::{PermissionsTable, Resolution};
pub use state::StateScanner;
pub use types::{Action, ActionRecord, PermissionSet, Qualifier};

use backend::Backend;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Prefix of the temporary plan files created in the configuration directory.
pub const PLAN_FILE_PREFIX: &str = "terraform-plan";
/// Suffix of the captured plan output.
pub const PLAN_STDOUT_SUFFIX: &str = ".stdout";
/// Suffix of the converted plan JSON.
pub const PLAN_JSON_SUFFIX: &str = ".json";

/// Inputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory holding the Terraform configuration
    pub dir: PathBuf,
    /// Permissions lookup document
    pub permissions: PathBuf,
    /// Resource-type prefixes scanned for in state
    pub providers: Vec<String>,
    /// Existing converter output; skips plan and conversion
    pub plan_json: Option<PathBuf>,
    /// Skip listing state
    pub skip_state: bool,
    /// Keep the temporary plan files instead of removing them
    pub keep_files: bool,
}

impl PipelineOptions {
    /// Options with the default provider and every step enabled.
    pub fn new(dir: PathBuf, permissions: PathBuf) -> Self {
        Self {
            dir,
            permissions,
            providers: vec![state::DEFAULT_PROVIDER.to_string()],
            plan_json: None,
            skip_state: false,
            keep_files: false,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// State records followed by plan records, in pipeline order
    #[serde(rename = "actions")]
    pub records: Vec<ActionRecord>,
    /// Sorted, deduplicated permissions
    pub permissions: PermissionSet,
    /// Distinct records with no entry in the permissions table
    #[serde(skip)]
    pub unmapped: Vec<ActionRecord>,
}

/// Drives a [`Backend`] through the pipeline.
pub struct Client<B: Backend> {
    backend: B,
}

impl<B: Backend> Client<B> {
    /// Create a client over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Run the whole pipeline.
    pub fn run(&self, options: &PipelineOptions) -> Result<Report> {
        let scanner = StateScanner::new(&options.providers)?;
        // Load before any terraform command runs
        let table = PermissionsTable::load(&options.permissions)?;

        let dir = options.dir.canonicalize().map_err(|e| {
            Error::Config(format!(
                "configuration directory {} is not accessible: {e}",
                options.dir.display()
            ))
        })?;

        let plan_records = match &options.plan_json {
            Some(path) => plan::parse_plan_file(path)?,
            None => self.plan_records(&dir, options.keep_files)?,
        };

        let mut records = if options.skip_state {
            Vec::new()
        } else {
            let output = self.backend.state_list(&dir)?;
            scanner.scan(&output)
        };
        log::info!(
            "Found {} resources in state, {} planned changes",
            records.len(),
            plan_records.len()
        );
        records.extend(plan_records);

        let Resolution {
            permissions,
            unmapped,
        } = table.resolve(&records);

        Ok(Report {
            records,
            permissions,
            unmapped,
        })
    }

    /// Plan, convert and parse, using temporary files in `dir`.
    fn plan_records(&self, dir: &Path, keep_files: bool) -> Result<Vec<ActionRecord>> {
        let stdout_file = temp_plan_file(dir, PLAN_STDOUT_SUFFIX)?;
        let json_file = temp_plan_file(dir, PLAN_JSON_SUFFIX)?;

        self.backend.plan(dir, stdout_file.path())?;
        self.backend
            .convert(dir, stdout_file.path(), json_file.path())?;
        let records = plan::parse_plan_file(json_file.path())?;

        if keep_files {
            for file in [stdout_file, json_file] {
                let (_, path) = file.keep().map_err(|e| Error::Io(e.error))?;
                log::info!("Kept {}", path.display());
            }
        }

        Ok(records)
    }
}

fn temp_plan_file(dir: &Path, suffix: &str) -> Result<NamedTempFile> {
    Ok(Builder::new()
        .prefix(PLAN_FILE_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)?)
}
