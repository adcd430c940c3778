pub mod workspace;

use crate::core::params::DEFAULT_MAX_POLL_WAIT_SECS;
use crate::utils::format::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "qjob", version)]
#[command(about = "Submit, list and manage jobs in a cloud quantum workspace")]
pub struct Cli {
    /// Workspace defaults file (defaults to <config dir>/qjob/config.toml)
    #[arg(long, global = true, env = "QJOB_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Manage the default workspace
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },
    /// Inspect the targets available in a workspace
    Target {
        #[command(subcommand)]
        command: TargetCommand,
    },
    /// Manage jobs
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Submit a job, wait for it to finish and print its output
    Run(RunArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum WorkspaceCommand {
    /// Save the default workspace used when -g/-w/-l are omitted
    Set(WorkspaceSetArgs),
    /// Show the saved default workspace
    Show,
    /// Remove the saved default workspace
    Clear,
}

#[derive(Debug, Clone, Subcommand)]
pub enum TargetCommand {
    /// List providers and targets with their availability
    List {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum JobCommand {
    /// List jobs in the workspace
    List(JobListArgs),
    /// Get the status and details of a job
    Show(JobIdArgs),
    /// Request cancellation of a job and wait for it to stop
    Cancel(JobWaitArgs),
    /// Wait for a job to complete
    Wait(JobWaitArgs),
    /// Print the results of a successful job
    Output(JobIdArgs),
    /// Submit a job without waiting for it
    Submit(SubmitArgs),
}

/// Connection flags shared by every command that talks to a workspace.
#[derive(Debug, Clone, Default, Args)]
pub struct WorkspaceArgs {
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    #[arg(short = 'w', long)]
    pub workspace_name: Option<String>,

    #[arg(short = 'l', long)]
    pub location: Option<String>,

    #[arg(short = 's', long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    /// Override the service endpoint (defaults to https://<location>.quantum.azure.com)
    #[arg(long, env = "QJOB_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "QJOB_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct WorkspaceSetArgs {
    #[arg(short = 'g', long)]
    pub resource_group: String,

    #[arg(short = 'w', long)]
    pub workspace_name: String,

    #[arg(short = 'l', long)]
    pub location: String,

    #[arg(short = 's', long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,

    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct JobIdArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(short = 'j', long)]
    pub job_id: String,
}

#[derive(Debug, Clone, Args)]
pub struct JobWaitArgs {
    #[command(flatten)]
    pub job: JobIdArgs,

    /// Poll interval ceiling in seconds, at least 1
    #[arg(long, default_value = DEFAULT_MAX_POLL_WAIT_SECS)]
    pub max_poll_wait_secs: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct JobListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(long)]
    pub job_type: Option<String>,

    #[arg(long)]
    pub item_type: Option<String>,

    #[arg(long)]
    pub provider_id: Option<String>,

    #[arg(long)]
    pub target_id: Option<String>,

    #[arg(long = "status")]
    pub job_status: Option<String>,

    /// Only jobs created on or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub created_after: Option<String>,

    /// Only jobs created on or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub created_before: Option<String>,

    /// Only jobs whose name starts with this prefix
    #[arg(long)]
    pub job_name: Option<String>,

    #[arg(long)]
    pub orderby: Option<String>,

    /// asc or desc; requires --orderby
    #[arg(long)]
    pub order: Option<String>,

    #[arg(long)]
    pub skip: Option<u64>,

    #[arg(long)]
    pub top: Option<u64>,
}

#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(short = 't', long)]
    pub target_id: String,

    #[arg(long)]
    pub job_input_file: PathBuf,

    #[arg(long)]
    pub job_input_format: Option<String>,

    #[arg(long)]
    pub job_output_format: Option<String>,

    #[arg(long)]
    pub job_name: Option<String>,

    #[arg(long)]
    pub shots: Option<u64>,

    /// KEY=VALUE pairs or a JSON object; `metadata`, `tags` and `content-type` are handled specially
    #[arg(long, num_args = 1..)]
    pub job_params: Vec<String>,

    #[arg(long)]
    pub target_capability: Option<String>,

    #[arg(long)]
    pub entry_point: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub submit: SubmitArgs,

    #[arg(long, default_value = DEFAULT_MAX_POLL_WAIT_SECS)]
    pub max_poll_wait_secs: String,
}
