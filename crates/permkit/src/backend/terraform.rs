//! Real backend using the `terraform` CLI and `parse-terraform-plan`.

use crate::backend::Backend;
use crate::error::Result;
use crate::runner::{self, ExternalCommand};
use std::path::Path;

/// Default Terraform executable.
pub const DEFAULT_TERRAFORM: &str = "terraform";
/// Default plan-to-JSON converter executable.
pub const DEFAULT_CONVERTER: &str = "parse-terraform-plan";

/// Backend that executes real Terraform commands.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    /// Path to the terraform executable
    terraform: String,
    /// Path to the converter executable
    converter: String,
    /// Shell line replacing `terraform state list`
    state_command: Option<String>,
}

impl TerraformCli {
    /// Create a backend with explicit executables.
    pub fn new(terraform: impl Into<String>, converter: impl Into<String>) -> Self {
        Self {
            terraform: terraform.into(),
            converter: converter.into(),
            state_command: None,
        }
    }

    /// List state with a shell command line instead of `terraform state list`.
    pub fn with_state_command(mut self, line: impl Into<String>) -> Self {
        self.state_command = Some(line.into());
        self
    }

    /// `terraform state list`
    pub fn state_list_command(&self, dir: &Path) -> ExternalCommand {
        match &self.state_command {
            Some(line) => ExternalCommand::shell(line).current_dir(dir),
            None => ExternalCommand::new(&self.terraform)
                .args(["state", "list"])
                .current_dir(dir),
        }
    }

    /// `terraform plan -input=false`
    pub fn plan_command(&self, dir: &Path) -> ExternalCommand {
        ExternalCommand::new(&self.terraform)
            .args(["plan", "-input=false"])
            .current_dir(dir)
    }

    /// `parse-terraform-plan --pretty -i <stdout> -o <json>`
    pub fn convert_command(&self, dir: &Path, stdout_path: &Path, json_path: &Path) -> ExternalCommand {
        ExternalCommand::new(&self.converter)
            .arg("--pretty")
            .arg("-i")
            .arg(stdout_path.to_string_lossy())
            .arg("-o")
            .arg(json_path.to_string_lossy())
            .current_dir(dir)
    }
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new(DEFAULT_TERRAFORM, DEFAULT_CONVERTER)
    }
}

impl Backend for TerraformCli {
    fn state_list(&self, dir: &Path) -> Result<String> {
        let captured = runner::run_capture(&self.state_list_command(dir))?;
        Ok(captured.stdout_text())
    }

    fn plan(&self, dir: &Path, stdout_path: &Path) -> Result<()> {
        runner::run_to_file(&self.plan_command(dir), stdout_path)?;
        Ok(())
    }

    fn convert(&self, dir: &Path, stdout_path: &Path, json_path: &Path) -> Result<()> {
        let captured = runner::run_capture(&self.convert_command(dir, stdout_path, json_path))?;
        let stderr = captured.stderr_text();
        if !stderr.trim().is_empty() {
            log::debug!("{}: {}", self.converter, stderr.trim());
        }
        Ok(())
    }
}
