use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Waiting,
    Executing,
    Succeeded,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn has_completed(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "Waiting",
            Self::Executing => "Executing",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 工作詳細資料；未列出的欄位保留在 `extra` 並原樣輸出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_execution_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_execution_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<ErrorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cancelling: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobDetails {
    pub fn has_completed(&self) -> bool {
        self.status.as_ref().is_some_and(JobStatus::has_completed)
    }

    pub fn job_id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub id: String,
    #[serde(default)]
    pub current_availability: Option<String>,
    #[serde(default)]
    pub average_queue_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub id: String,
    #[serde(default)]
    pub current_availability: Option<String>,
    #[serde(default)]
    pub targets: Vec<TargetStatus>,
}

/// 服務端分頁回應
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

/// 帶 SAS token 的 blob 位址拆解結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrl {
    pub account_name: String,
    pub container: String,
    pub blob: String,
    pub sas_token: String,
    pub endpoint: String,
}

impl BlobUrl {
    pub fn download_url(&self) -> String {
        if self.sas_token.is_empty() {
            format!("{}/{}/{}", self.endpoint, self.container, self.blob)
        } else {
            format!(
                "{}/{}/{}?{}",
                self.endpoint, self.container, self.blob, self.sas_token
            )
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobListQuery {
    pub filter: Option<String>,
    pub orderby: Option<String>,
    pub skip: Option<u64>,
    pub top: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_details_preserves_unknown_fields() {
        let raw = json!({
            "id": "11111111-2222-3333-4444-555555555555",
            "status": "Executing",
            "target": "ionq.simulator",
            "priority": "High",
            "inputParams": {"shots": 500}
        });

        let job: JobDetails = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(job.status, Some(JobStatus::Executing));
        assert!(!job.has_completed());
        assert_eq!(job.extra.get("priority"), Some(&json!("High")));

        let back = serde_json::to_value(&job).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_unrecognised_status_is_not_completed() {
        let job: JobDetails = serde_json::from_value(json!({"status": "Finishing"})).unwrap();
        assert_eq!(job.status, Some(JobStatus::Unknown));
        assert!(!job.has_completed());
    }

    #[test]
    fn test_completed_statuses() {
        assert!(JobStatus::Succeeded.has_completed());
        assert!(JobStatus::Failed.has_completed());
        assert!(JobStatus::Cancelled.has_completed());
        assert!(!JobStatus::Waiting.has_completed());
        assert!(!JobStatus::Executing.has_completed());
    }
}
