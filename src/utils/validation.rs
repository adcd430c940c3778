use crate::utils::error::{QuantumError, Result};
use chrono::{DateTime, NaiveDate};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(QuantumError::invalid_argument(format!(
            "{} cannot be empty",
            field_name
        )));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(QuantumError::invalid_argument(format!(
                "{} has an unsupported URL scheme: {}",
                field_name, scheme
            ))),
        },
        Err(e) => Err(QuantumError::invalid_argument(format!(
            "{} is not a valid URL ({}): {}",
            field_name, e, url_str
        ))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(QuantumError::invalid_argument(format!(
            "{} cannot be empty",
            field_name
        )));
    }

    if path.contains('\0') {
        return Err(QuantumError::invalid_argument(format!(
            "{} contains null bytes",
            field_name
        )));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(QuantumError::invalid_argument(format!(
            "{} value is not valid: {} (must be at least {})",
            field_name, value, min_value
        )));
    }
    Ok(())
}

/// 缺少必要參數時回傳 RequiredArgumentMissing
pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| {
        QuantumError::missing_argument(format!("the following argument is required: {}", field_name))
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(QuantumError::invalid_argument(format!(
            "{} cannot be empty or whitespace-only",
            field_name
        )));
    }
    Ok(())
}

/// 接受 `YYYY-MM-DD` 或 RFC 3339 時間戳
pub fn validate_iso_datetime(field_name: &str, value: &str) -> Result<()> {
    let is_date = NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    let is_timestamp = DateTime::parse_from_rfc3339(value).is_ok();

    if is_date || is_timestamp {
        Ok(())
    } else {
        Err(QuantumError::invalid_argument(format!(
            "{} parameter is not valid: {}. Use YYYY-MM-DD or an RFC 3339 timestamp",
            field_name, value
        )))
    }
}
