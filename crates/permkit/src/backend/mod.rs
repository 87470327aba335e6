//! Backend abstraction for the Terraform side of the pipeline.
//!
//! The [`Backend`] trait covers the three external invocations the pipeline
//! needs, allowing for different implementations (real CLI, mock for testing).

pub mod terraform;

use crate::error::Result;
use std::path::Path;

/// External tooling used to inspect a Terraform configuration.
pub trait Backend {
    /// List the addresses currently tracked in state (`terraform state list`).
    fn state_list(&self, dir: &Path) -> Result<String>;

    /// Run a plan and write its human-readable output to `stdout_path`.
    fn plan(&self, dir: &Path, stdout_path: &Path) -> Result<()>;

    /// Convert captured plan output into the JSON read by the plan parser.
    fn convert(&self, dir: &Path, stdout_path: &Path, json_path: &Path) -> Result<()>;
}

/// Get the default backend (real terraform CLI and converter).
pub fn default_backend() -> terraform::TerraformCli {
    terraform::TerraformCli::default()
}
