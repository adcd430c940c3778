use crate::core::blob::parse_blob_url;
use crate::core::formats::{content_type_for, default_formats, provider_of};
use crate::core::params::SubmitParams;
use crate::domain::model::{JobDetails, JobListQuery, JobStatus, ProviderStatus};
use crate::domain::ports::{BlobStore, QuantumService};
use crate::utils::error::{QuantumError, Result};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

const INITIAL_POLL_WAIT_SECS: f64 = 0.2;
const POLL_BACKOFF: f64 = 1.5;
const INPUT_BLOB_NAME: &str = "inputData";

/// 已達上限後固定為 `max`；未達上限前每輪乘以 1.5
fn next_poll_wait(current: f64, max: f64) -> f64 {
    if current >= max {
        max
    } else {
        current * POLL_BACKOFF
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub target_id: String,
    pub input_file: PathBuf,
    pub input_format: Option<String>,
    pub output_format: Option<String>,
    pub job_name: Option<String>,
    pub params: SubmitParams,
}

pub struct JobEngine<C: QuantumService + BlobStore> {
    client: C,
}

impl<C: QuantumService + BlobStore> JobEngine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &JobListQuery) -> Result<Vec<JobDetails>> {
        tracing::debug!(
            "Listing jobs (filter: {:?}, orderby: {:?}, skip: {:?}, top: {:?})",
            query.filter,
            query.orderby,
            query.skip,
            query.top
        );
        let jobs = self.client.list_jobs(query).await?;
        tracing::debug!("Found {} jobs", jobs.len());
        Ok(jobs)
    }

    pub async fn show(&self, job_id: &str) -> Result<JobDetails> {
        self.client.get_job(job_id).await
    }

    pub async fn targets(&self) -> Result<Vec<ProviderStatus>> {
        self.client.list_provider_status().await
    }

    pub async fn submit(&self, request: &SubmitRequest) -> Result<JobDetails> {
        let defaults = default_formats(&request.target_id);

        let input_format = match (&request.input_format, defaults) {
            (Some(format), _) => format.clone(),
            (None, Some((format, _))) => format.to_string(),
            (None, None) => {
                return Err(QuantumError::missing_argument(format!(
                    "--job-input-format is required for target {}",
                    request.target_id
                )))
            }
        };
        let output_format = match (&request.output_format, defaults) {
            (Some(format), _) => format.clone(),
            (None, Some((_, format))) => format.to_string(),
            (None, None) => {
                return Err(QuantumError::missing_argument(format!(
                    "--job-output-format is required for target {}",
                    request.target_id
                )))
            }
        };

        let data = tokio::fs::read(&request.input_file).await?;
        tracing::debug!(
            "Read {} bytes of job input from {}",
            data.len(),
            request.input_file.display()
        );

        let job_id = Uuid::new_v4().to_string();
        let container_name = format!("job-{}", job_id);

        // 建立容器並上傳輸入資料
        let container_uri = self.client.get_sas_uri(&container_name, None).await?;
        self.client.create_container(&container_uri).await?;

        let content_type = request
            .params
            .content_type
            .clone()
            .unwrap_or_else(|| content_type_for(&input_format).to_string());
        let input_data_uri = self
            .client
            .get_sas_uri(&container_name, Some(INPUT_BLOB_NAME))
            .await?;
        self.client
            .upload_blob(&input_data_uri, data, &content_type)
            .await?;
        tracing::debug!("Uploaded job input to container {}", container_name);

        let job = JobDetails {
            id: Some(job_id.clone()),
            name: request.job_name.clone(),
            provider_id: Some(provider_of(&request.target_id).to_string()),
            target: Some(request.target_id.clone()),
            container_uri: Some(container_uri),
            input_data_uri: Some(input_data_uri),
            input_data_format: Some(input_format),
            output_data_format: Some(output_format),
            input_params: Some(request.params.input_params.clone()),
            metadata: request.params.metadata.clone(),
            tags: request.params.tags.clone(),
            ..Default::default()
        };

        let submitted = self.client.create_job(&job).await?;
        tracing::info!("🚀 Submitted job {} to {}", job_id, request.target_id);
        Ok(submitted)
    }

    /// Polls until the job completes. The interval starts at 0.2s and grows by 1.5x up to `max_poll_wait_secs`.
    pub async fn wait(&self, job_id: &str, max_poll_wait_secs: f64) -> Result<JobDetails> {
        let mut poll_wait = INITIAL_POLL_WAIT_SECS;
        let mut job = self.show(job_id).await?;
        let mut waited = false;

        while !job.has_completed() {
            waited = true;
            eprint!(".");
            let _ = std::io::stderr().flush();

            tokio::time::sleep(Duration::from_secs_f64(poll_wait)).await;
            job = self.show(job_id).await?;

            poll_wait = next_poll_wait(poll_wait, max_poll_wait_secs);
        }

        if waited {
            eprintln!();
        }
        tracing::debug!(
            "Job {} finished with status {}",
            job_id,
            job.status.as_ref().map(ToString::to_string).unwrap_or_default()
        );
        Ok(job)
    }

    pub async fn cancel(&self, job_id: &str, max_poll_wait_secs: f64) -> Result<JobDetails> {
        let job = self.show(job_id).await?;
        if job.has_completed() {
            tracing::warn!(
                "Job {} has already completed with status: {}.",
                job_id,
                job.status.as_ref().map(ToString::to_string).unwrap_or_default()
            );
            return Ok(job);
        }

        self.client.cancel_job(job_id).await?;
        tracing::info!("Cancellation requested for job {}", job_id);
        self.wait(job_id, max_poll_wait_secs).await
    }

    pub async fn output(&self, job_id: &str) -> Result<Value> {
        let job = self.show(job_id).await?;
        self.output_of(&job).await
    }

    /// 未成功的工作直接回傳工作本身，讓表格輸出顯示錯誤資訊
    pub async fn output_of(&self, job: &JobDetails) -> Result<Value> {
        if job.status != Some(JobStatus::Succeeded) {
            let mut value = serde_json::to_value(job)?;
            if let Some(obj) = value.as_object_mut() {
                obj.entry("errorData").or_insert(Value::Null);
            }
            return Ok(value);
        }

        let uri = job
            .output_data_uri
            .as_deref()
            .ok_or_else(|| QuantumError::MissingOutput {
                job_id: job.job_id().to_string(),
            })?;

        let blob = parse_blob_url(uri)?;
        tracing::debug!(
            "Downloading output blob {} from container {} (account {})",
            blob.blob,
            blob.container,
            blob.account_name
        );
        let bytes = self.client.download_blob(&blob.download_url()).await?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        }
    }

    pub async fn run(&self, request: &SubmitRequest, max_poll_wait_secs: f64) -> Result<Value> {
        let submitted = self.submit(request).await?;
        let job_id = submitted.job_id().to_string();
        tracing::warn!("Job id: {}", job_id);

        let job = self.wait(&job_id, max_poll_wait_secs).await?;
        self.output_of(&job).await
    }
}
