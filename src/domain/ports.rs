use crate::domain::model::{JobDetails, JobListQuery, ProviderStatus};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 工作區 REST 介面
#[async_trait]
pub trait QuantumService: Send + Sync {
    async fn list_jobs(&self, query: &JobListQuery) -> Result<Vec<JobDetails>>;
    async fn get_job(&self, job_id: &str) -> Result<JobDetails>;
    async fn create_job(&self, job: &JobDetails) -> Result<JobDetails>;
    async fn cancel_job(&self, job_id: &str) -> Result<()>;
    async fn list_provider_status(&self) -> Result<Vec<ProviderStatus>>;
    /// Returns a SAS URI for the container, or for a single blob when `blob_name` is set.
    async fn get_sas_uri(&self, container_name: &str, blob_name: Option<&str>) -> Result<String>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn create_container(&self, container_sas_uri: &str) -> Result<()>;
    async fn upload_blob(
        &self,
        blob_sas_uri: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;
    async fn download_blob(&self, blob_sas_uri: &str) -> Result<Vec<u8>>;
}
