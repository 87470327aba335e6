use crate::cli::{Cli, OutputFormat};
use anyhow::{Result, bail};
use permkit::PipelineOptions;
use permkit::backend::terraform::TerraformCli;
use std::path::PathBuf;

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub dir: PathBuf,
    pub permissions: PathBuf,
    pub providers: Vec<String>,
    pub terraform: String,
    pub converter: String,
    pub state_command: Option<String>,
    pub plan_json: Option<PathBuf>,
    pub skip_state: bool,
    pub keep_files: bool,
    pub format: OutputFormat,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let providers: Vec<String> = cli
            .providers
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if providers.is_empty() {
            bail!("At least one --provider prefix is required");
        }

        Ok(Self {
            dir: expand(&cli.dir),
            permissions: expand(&cli.permissions),
            providers,
            terraform: cli.terraform.clone(),
            converter: cli.converter.clone(),
            state_command: cli.state_command.clone(),
            plan_json: cli.plan_json.as_deref().map(expand),
            skip_state: cli.skip_state,
            keep_files: cli.keep_files,
            format: cli.format,
        })
    }

    pub fn backend(&self) -> TerraformCli {
        let backend = TerraformCli::new(&self.terraform, &self.converter);
        match &self.state_command {
            Some(line) => backend.with_state_command(line),
            None => backend,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            dir: self.dir.clone(),
            permissions: self.permissions.clone(),
            providers: self.providers.clone(),
            plan_json: self.plan_json.clone(),
            skip_state: self.skip_state,
            keep_files: self.keep_files,
        }
    }
}

/// Expand `~` in a user-supplied path
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tfperms"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_cli_defaults() {
        let config = Config::from_cli(&parse(&[])).unwrap();
        assert_eq!(config.dir, PathBuf::from("."));
        assert_eq!(config.permissions, PathBuf::from("permissions.json"));
        assert_eq!(config.providers, vec!["google"]);

        let options = config.pipeline_options();
        assert_eq!(options.dir, PathBuf::from("."));
        assert!(options.plan_json.is_none());
        assert!(!options.keep_files);
    }

    #[test]
    fn test_tilde_expansion() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let config = Config::from_cli(&parse(&["--permissions", "~/perms.json"])).unwrap();
        assert_eq!(config.permissions, PathBuf::from(home).join("perms.json"));
    }

    #[test]
    fn test_blank_providers_rejected() {
        assert!(Config::from_cli(&parse(&["--provider", " , "])).is_err());
    }

    #[test]
    fn test_providers_trimmed() {
        let config = Config::from_cli(&parse(&["--provider", "google, aws"])).unwrap();
        assert_eq!(config.providers, vec!["google", "aws"]);
    }

    #[test]
    fn test_backend_uses_state_command() {
        let config = Config::from_cli(&parse(&[
            "--terraform",
            "tofu",
            "--state-command",
            "terragrunt state list",
        ]))
        .unwrap();
        let backend = config.backend();
        let state = backend.state_list_command(&config.dir);
        assert!(state.args.iter().any(|a| a == "terragrunt state list"));
        assert_eq!(backend.plan_command(&config.dir).program, "tofu");
    }
}
