use crate::adapters::WorkspaceClient;
use crate::config::workspace::{config_path, WorkspaceConfig, WorkspaceSettings};
use crate::config::{
    Cli, Command, JobCommand, JobIdArgs, JobListArgs, RunArgs, SubmitArgs, TargetCommand,
    WorkspaceArgs, WorkspaceCommand, WorkspaceSetArgs,
};
use crate::core::job::{JobEngine, SubmitRequest};
use crate::core::output::{transform_job, transform_jobs, transform_output, transform_targets};
use crate::core::params::{build_submit_params, validate_max_poll_wait_secs, ParamFlags};
use crate::core::query::{build_list_query, JobFilter};
use crate::utils::error::Result;
use crate::utils::format::{render, OutputFormat};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url};
use serde_json::Value;
use std::path::Path;

type TableTransform = fn(&Value) -> Value;

/// 命令結果與其表格轉換器（僅 `-o table` 時套用）
#[derive(Clone, Debug)]
pub struct CommandOutput {
    pub value: Value,
    pub table: Option<TableTransform>,
}

impl CommandOutput {
    fn plain(value: Value) -> Self {
        Self { value, table: None }
    }

    fn with_table(value: Value, table: TableTransform) -> Self {
        Self {
            value,
            table: Some(table),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        if self.value.is_null() {
            return Ok(String::new());
        }

        match (format, self.table) {
            (OutputFormat::Table, Some(transform)) => render(&transform(&self.value), format),
            _ => render(&self.value, format),
        }
    }
}

pub async fn execute(cli: &Cli) -> Result<CommandOutput> {
    let path = config_path(cli.config.as_deref())?;

    match &cli.command {
        Command::Workspace { command } => workspace_command(command, &path),
        Command::Target {
            command: TargetCommand::List { workspace },
        } => {
            let engine = engine_for(&path, workspace)?;
            let providers = engine.targets().await?;
            Ok(CommandOutput::with_table(
                serde_json::to_value(providers)?,
                transform_targets,
            ))
        }
        Command::Job { command } => job_command(command, &path).await,
        Command::Run(args) => run(args, &path).await,
    }
}

fn engine_for(path: &Path, args: &WorkspaceArgs) -> Result<JobEngine<WorkspaceClient>> {
    let saved = WorkspaceConfig::load(path)?;
    let settings = WorkspaceSettings::resolve(&saved, args)?;
    tracing::debug!(
        "Using workspace {} in {} ({})",
        settings.workspace_name,
        settings.resource_group,
        settings.location
    );
    Ok(JobEngine::new(WorkspaceClient::new(&settings)?))
}

fn workspace_command(command: &WorkspaceCommand, path: &Path) -> Result<CommandOutput> {
    match command {
        WorkspaceCommand::Set(args) => workspace_set(args, path),
        WorkspaceCommand::Show => {
            let saved = WorkspaceConfig::load(path)?;
            Ok(CommandOutput::plain(serde_json::to_value(saved)?))
        }
        WorkspaceCommand::Clear => {
            WorkspaceConfig::clear(path)?;
            tracing::info!("Cleared default workspace ({})", path.display());
            Ok(CommandOutput::plain(Value::Null))
        }
    }
}

fn workspace_set(args: &WorkspaceSetArgs, path: &Path) -> Result<CommandOutput> {
    validate_non_empty_string("--resource-group", &args.resource_group)?;
    validate_non_empty_string("--workspace-name", &args.workspace_name)?;
    validate_non_empty_string("--location", &args.location)?;
    if let Some(endpoint) = &args.endpoint {
        validate_url("--endpoint", endpoint)?;
    }

    let mut config = WorkspaceConfig::load_raw(path)?;
    config.resource_group = Some(args.resource_group.clone());
    config.workspace_name = Some(args.workspace_name.clone());
    config.location = Some(args.location.clone());
    if args.subscription.is_some() {
        config.subscription = args.subscription.clone();
    }
    if args.endpoint.is_some() {
        config.endpoint = args.endpoint.clone();
    }

    config.save(path)?;
    tracing::info!("✅ Default workspace set to {}", args.workspace_name);
    Ok(CommandOutput::plain(serde_json::to_value(config)?))
}

async fn job_command(command: &JobCommand, path: &Path) -> Result<CommandOutput> {
    match command {
        JobCommand::List(args) => list(args, path).await,
        JobCommand::Show(args) => {
            validate_non_empty_string("--job-id", &args.job_id)?;
            let engine = engine_for(path, &args.workspace)?;
            let job = engine.show(&args.job_id).await?;
            Ok(CommandOutput::with_table(serde_json::to_value(job)?, transform_job))
        }
        JobCommand::Cancel(args) => {
            let (engine, max_wait) = waiting_engine(&args.job, &args.max_poll_wait_secs, path)?;
            let job = engine.cancel(&args.job.job_id, max_wait).await?;
            Ok(CommandOutput::with_table(serde_json::to_value(job)?, transform_job))
        }
        JobCommand::Wait(args) => {
            let (engine, max_wait) = waiting_engine(&args.job, &args.max_poll_wait_secs, path)?;
            let job = engine.wait(&args.job.job_id, max_wait).await?;
            Ok(CommandOutput::with_table(serde_json::to_value(job)?, transform_job))
        }
        JobCommand::Output(args) => {
            validate_non_empty_string("--job-id", &args.job_id)?;
            let engine = engine_for(path, &args.workspace)?;
            let output = engine.output(&args.job_id).await?;
            Ok(CommandOutput::with_table(output, transform_output))
        }
        JobCommand::Submit(args) => {
            let request = submit_request(args)?;
            let engine = engine_for(path, &args.workspace)?;
            let job = engine.submit(&request).await?;
            Ok(CommandOutput::with_table(serde_json::to_value(job)?, transform_job))
        }
    }
}

fn waiting_engine(
    args: &JobIdArgs,
    max_poll_wait_secs: &str,
    path: &Path,
) -> Result<(JobEngine<WorkspaceClient>, f64)> {
    validate_non_empty_string("--job-id", &args.job_id)?;
    let max_wait = validate_max_poll_wait_secs(max_poll_wait_secs)?;
    Ok((engine_for(path, &args.workspace)?, max_wait))
}

async fn list(args: &JobListArgs, path: &Path) -> Result<CommandOutput> {
    let filter = JobFilter {
        job_type: args.job_type.clone(),
        item_type: args.item_type.clone(),
        provider_id: args.provider_id.clone(),
        target_id: args.target_id.clone(),
        job_status: args.job_status.clone(),
        created_after: args.created_after.clone(),
        created_before: args.created_before.clone(),
        job_name: args.job_name.clone(),
    };
    let query = build_list_query(
        &filter,
        args.orderby.as_deref(),
        args.order.as_deref(),
        args.skip,
        args.top,
    )?;

    let engine = engine_for(path, &args.workspace)?;
    let jobs = engine.list(&query).await?;
    Ok(CommandOutput::with_table(serde_json::to_value(jobs)?, transform_jobs))
}

fn submit_request(args: &SubmitArgs) -> Result<SubmitRequest> {
    validate_non_empty_string("--target-id", &args.target_id)?;
    validate_path("--job-input-file", &args.job_input_file.to_string_lossy())?;

    let params = build_submit_params(&ParamFlags {
        job_params: &args.job_params,
        shots: args.shots,
        target_capability: args.target_capability.as_deref(),
        entry_point: args.entry_point.as_deref(),
    })?;

    Ok(SubmitRequest {
        target_id: args.target_id.clone(),
        input_file: args.job_input_file.clone(),
        input_format: args.job_input_format.clone(),
        output_format: args.job_output_format.clone(),
        job_name: args.job_name.clone(),
        params,
    })
}

async fn run(args: &RunArgs, path: &Path) -> Result<CommandOutput> {
    let max_wait = validate_max_poll_wait_secs(&args.max_poll_wait_secs)?;
    let request = submit_request(&args.submit)?;
    let engine = engine_for(path, &args.submit.workspace)?;
    let output = engine.run(&request, max_wait).await?;
    Ok(CommandOutput::with_table(output, transform_output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_transform_only_applies_to_table_format() {
        let output = CommandOutput::with_table(
            json!({"Histogram": ["[0]", 0.5, "[1]", 0.5]}),
            transform_output,
        );

        let table = output.render(OutputFormat::Table).unwrap();
        assert!(table.starts_with("Result"));
        assert!(table.contains("0.50000000"));

        let as_json = output.render(OutputFormat::Json).unwrap();
        assert!(as_json.contains("\"Histogram\""));
    }

    #[test]
    fn test_null_output_renders_empty() {
        let output = CommandOutput::plain(Value::Null);
        assert_eq!(output.render(OutputFormat::Json).unwrap(), "");
    }
}
