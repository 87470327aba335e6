use clap::{Parser, ValueEnum};
use clap_complete::Shell;

/// Derive the minimal IAM permissions a Terraform deployment role needs.
///
/// Runs `terraform plan`, converts it with `parse-terraform-plan`, lists the
/// resources already in state and looks every action up in a permissions
/// table keyed by `qualifier.type.action`.
#[derive(Parser, Debug)]
#[command(name = "tfperms")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about, long_about)]
pub struct Cli {
    /// Directory containing the Terraform configuration
    #[arg(long, env = "TFPERMS_DIR", default_value = ".")]
    pub dir: String,

    /// Permissions lookup document (relative to the current directory)
    #[arg(long, env = "TFPERMS_PERMISSIONS", default_value = permkit::permissions::DEFAULT_PERMISSIONS_FILE)]
    pub permissions: String,

    /// Resource-type prefixes to read from state (repeatable or comma-separated)
    #[arg(
        long = "provider",
        env = "TFPERMS_PROVIDERS",
        value_delimiter = ',',
        default_value = permkit::state::DEFAULT_PROVIDER
    )]
    pub providers: Vec<String>,

    /// Terraform executable
    #[arg(long, env = "TFPERMS_TERRAFORM", default_value = permkit::backend::terraform::DEFAULT_TERRAFORM)]
    pub terraform: String,

    /// Plan-to-JSON converter executable
    #[arg(long, env = "TFPERMS_CONVERTER", default_value = permkit::backend::terraform::DEFAULT_CONVERTER)]
    pub converter: String,

    /// Shell command listing state addresses, instead of `terraform state list`
    #[arg(long, env = "TFPERMS_STATE_COMMAND")]
    pub state_command: Option<String>,

    /// Use an existing converter JSON instead of running plan and conversion
    #[arg(long)]
    pub plan_json: Option<String>,

    /// Don't list resources already in state
    #[arg(long)]
    pub skip_state: bool,

    /// Keep the temporary plan files
    #[arg(long)]
    pub keep_files: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Disable colored output (NO_COLOR is honored as well)
    #[arg(long)]
    pub no_color: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bannered text sections
    #[default]
    Plain,
    /// A single JSON object
    Json,
}
