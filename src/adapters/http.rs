use crate::config::workspace::WorkspaceSettings;
use crate::domain::model::{JobDetails, JobListQuery, Page, ProviderStatus};
use crate::domain::ports::{BlobStore, QuantumService};
use crate::utils::error::{QuantumError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_VERSION: &str = "2022-09-12-preview";

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: ServiceErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SasUriRequest<'a> {
    container_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    blob_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SasUriResponse {
    sas_uri: String,
}

/// 量子工作區 REST 與 blob SAS 操作的 reqwest 實作
#[derive(Debug, Clone)]
pub struct WorkspaceClient {
    client: Client,
    workspace_url: String,
    access_token: Option<String>,
}

impl WorkspaceClient {
    pub fn new(settings: &WorkspaceSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!("qjob/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if settings.access_token.is_none() {
            tracing::warn!("No access token configured; requests will be sent unauthenticated");
        }

        Ok(Self {
            client,
            workspace_url: settings.workspace_url(),
            access_token: settings.access_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.workspace_url, path);
        tracing::debug!("{} {}", method, url);
        self.authorized(self.client.request(method, url))
            .query(&[("api-version", API_VERSION)])
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(service_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// 依 nextLink 逐頁取得，`limit` 達到即停止
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: RequestBuilder,
        limit: Option<u64>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page: Page<T> = Self::send_json(first).await?;

        loop {
            items.extend(page.value);

            if let Some(limit) = limit {
                let limit = usize::try_from(limit).unwrap_or(usize::MAX);
                if items.len() >= limit {
                    items.truncate(limit);
                    break;
                }
            }

            match page.next_link.filter(|link| !link.is_empty()) {
                Some(next_link) => {
                    tracing::debug!("Following next link {}", next_link);
                    page = Self::send_json(self.authorized(self.client.get(next_link))).await?;
                }
                None => break,
            }
        }

        Ok(items)
    }
}

fn service_error(status: StatusCode, body: &str) -> QuantumError {
    let detail = serde_json::from_str::<ServiceErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error);

    let code = detail
        .as_ref()
        .and_then(|d| d.code.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Error").replace(' ', ""));
    let message = detail.and_then(|d| d.message).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    QuantumError::ServiceError {
        status: status.as_u16(),
        code,
        message,
    }
}

#[async_trait]
impl QuantumService for WorkspaceClient {
    async fn list_jobs(&self, query: &JobListQuery) -> Result<Vec<JobDetails>> {
        let mut request = self.request(Method::GET, "/jobs");
        if let Some(filter) = &query.filter {
            request = request.query(&[("$filter", filter)]);
        }
        if let Some(orderby) = &query.orderby {
            request = request.query(&[("$orderby", orderby)]);
        }
        if let Some(skip) = query.skip {
            request = request.query(&[("$skip", skip)]);
        }
        if let Some(top) = query.top {
            request = request.query(&[("$top", top)]);
        }

        self.collect_pages(request, query.top).await
    }

    async fn get_job(&self, job_id: &str) -> Result<JobDetails> {
        Self::send_json(self.request(Method::GET, &format!("/jobs/{}", job_id))).await
    }

    async fn create_job(&self, job: &JobDetails) -> Result<JobDetails> {
        let request = self
            .request(Method::PUT, &format!("/jobs/{}", job.job_id()))
            .json(job);
        Self::send_json(request).await
    }

    async fn cancel_job(&self, job_id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("/jobs/{}", job_id));
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn list_provider_status(&self) -> Result<Vec<ProviderStatus>> {
        self.collect_pages(self.request(Method::GET, "/providerStatus"), None)
            .await
    }

    async fn get_sas_uri(&self, container_name: &str, blob_name: Option<&str>) -> Result<String> {
        let request = self
            .request(Method::POST, "/storage/sasUri")
            .json(&SasUriRequest {
                container_name,
                blob_name,
            });
        let response: SasUriResponse = Self::send_json(request).await?;
        Ok(response.sas_uri)
    }
}

// SAS 已在 URL 中授權，blob 請求不帶 bearer token
#[async_trait]
impl BlobStore for WorkspaceClient {
    async fn create_container(&self, container_sas_uri: &str) -> Result<()> {
        let response = self
            .client
            .put(container_sas_uri)
            .query(&[("restype", "container")])
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            tracing::debug!("Container already exists");
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }

    async fn upload_blob(
        &self,
        blob_sas_uri: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let response = self
            .client
            .put(blob_sas_uri)
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn download_blob(&self, blob_sas_uri: &str) -> Result<Vec<u8>> {
        let response = Self::check(self.client.get(blob_sas_uri).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
