use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantumError {
    #[error("{message}")]
    InvalidArgumentValue { message: String },

    #[error("{message}")]
    RequiredArgumentMissing { message: String },

    #[error("Service returned {status} ({code}): {message}")]
    ServiceError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Job {job_id} has no output data")]
    MissingOutput { job_id: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Argument,
    Service,
    Network,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuantumError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgumentValue {
            message: message.into(),
        }
    }

    pub fn missing_argument(message: impl Into<String>) -> Self {
        Self::RequiredArgumentMissing {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgumentValue { .. } | Self::RequiredArgumentMissing { .. } => {
                ErrorCategory::Argument
            }
            Self::ServiceError { .. } | Self::MissingOutput { .. } => ErrorCategory::Service,
            Self::ApiError(_) => ErrorCategory::Network,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::UrlError(_) | Self::ConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidArgumentValue { .. } | Self::RequiredArgumentMissing { .. } => {
                ErrorSeverity::High
            }
            // 5xx 與網路錯誤通常可重試
            Self::ServiceError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            Self::ApiError(_) => ErrorSeverity::Medium,
            Self::ServiceError { .. } | Self::MissingOutput { .. } => ErrorSeverity::High,
            Self::UrlError(_) | Self::ConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidArgumentValue { message } | Self::RequiredArgumentMissing { message } => {
                message.clone()
            }
            Self::ServiceError { code, message, .. } => {
                format!("The quantum workspace rejected the request ({}): {}", code, message)
            }
            Self::ApiError(e) if e.is_timeout() => {
                "The request to the quantum workspace timed out".to_string()
            }
            Self::ApiError(e) if e.is_connect() => {
                "Could not connect to the quantum workspace".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidArgumentValue { .. } => "Check the argument value and try again",
            Self::RequiredArgumentMissing { .. } => {
                "Provide the missing argument or save a default with `qjob workspace set`"
            }
            Self::ServiceError { status: 401, .. } | Self::ServiceError { status: 403, .. } => {
                "Refresh the access token (QJOB_ACCESS_TOKEN) and make sure it has access to the workspace"
            }
            Self::ServiceError { status: 404, .. } => {
                "Verify the job id and the workspace (resource group, name, location)"
            }
            Self::ServiceError { .. } => "Retry later; the service may be temporarily unavailable",
            Self::MissingOutput { .. } => "Check the job status with `qjob job show`",
            Self::ApiError(_) => "Check network connectivity and the workspace endpoint",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "The service returned data in an unexpected format",
            Self::CsvError(_) => "Try a different output format, e.g. `-o json`",
            Self::UrlError(_) => "Check the endpoint URL",
            Self::ConfigError { .. } => "Inspect the workspace config with `qjob workspace show`",
        }
    }
}

pub type Result<T> = std::result::Result<T, QuantumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_errors_display_message_verbatim() {
        let err = QuantumError::invalid_argument("--max-poll-wait-secs parameter is not valid: 0");
        assert_eq!(err.to_string(), "--max-poll-wait-secs parameter is not valid: 0");
        assert_eq!(err.category(), ErrorCategory::Argument);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_service_error_severity_by_status() {
        let transient = QuantumError::ServiceError {
            status: 503,
            code: "ServiceUnavailable".to_string(),
            message: "try again".to_string(),
        };
        assert_eq!(transient.severity(), ErrorSeverity::Medium);

        let not_found = QuantumError::ServiceError {
            status: 404,
            code: "JobNotFound".to_string(),
            message: "no such job".to_string(),
        };
        assert_eq!(not_found.severity(), ErrorSeverity::High);
        assert!(not_found.recovery_suggestion().contains("job id"));
    }
}
