use crate::domain::model::JobListQuery;
use crate::utils::error::{QuantumError, Result};
use crate::utils::validation::{validate_iso_datetime, validate_positive_number};

pub const ERROR_MSG_INVALID_ORDER_ARGUMENT: &str =
    "The --order argument is not valid: Specify either asc or desc";
pub const ERROR_MSG_MISSING_ORDERBY_ARGUMENT: &str =
    "The --order argument is not valid without an --orderby argument";

/// `job list` 的篩選條件
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub job_type: Option<String>,
    pub item_type: Option<String>,
    pub provider_id: Option<String>,
    pub target_id: Option<String>,
    pub job_status: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub job_name: Option<String>,
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn construct_filter_query(filter: &JobFilter) -> Result<Option<String>> {
    let mut clauses = Vec::new();

    if let Some(job_type) = &filter.job_type {
        clauses.push(format!("JobType eq {}", quote(job_type)));
    }
    if let Some(item_type) = &filter.item_type {
        clauses.push(format!("ItemType eq {}", quote(item_type)));
    }
    if let Some(provider_id) = &filter.provider_id {
        clauses.push(format!("ProviderId eq {}", quote(provider_id)));
    }
    if let Some(target_id) = &filter.target_id {
        clauses.push(format!("Target eq {}", quote(target_id)));
    }
    if let Some(job_status) = &filter.job_status {
        clauses.push(format!("State eq {}", quote(job_status)));
    }
    if let Some(created_after) = &filter.created_after {
        validate_iso_datetime("--created-after", created_after)?;
        clauses.push(format!("CreationTime ge {}", created_after));
    }
    if let Some(created_before) = &filter.created_before {
        validate_iso_datetime("--created-before", created_before)?;
        clauses.push(format!("CreationTime le {}", created_before));
    }
    if let Some(job_name) = &filter.job_name {
        clauses.push(format!("startswith(Name, {})", quote(job_name)));
    }

    if clauses.is_empty() {
        Ok(None)
    } else {
        Ok(Some(clauses.join(" and ")))
    }
}

pub fn construct_orderby_expression(
    orderby: Option<&str>,
    order: Option<&str>,
) -> Result<Option<String>> {
    let orderby = orderby.filter(|field| !field.is_empty());

    match (orderby, order) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(QuantumError::missing_argument(
            ERROR_MSG_MISSING_ORDERBY_ARGUMENT,
        )),
        (Some(field), None) => Ok(Some(field.to_string())),
        (Some(field), Some(direction)) => match direction.to_ascii_lowercase().as_str() {
            "asc" => Ok(Some(format!("{} asc", field))),
            "desc" => Ok(Some(format!("{} desc", field))),
            _ => Err(QuantumError::invalid_argument(
                ERROR_MSG_INVALID_ORDER_ARGUMENT,
            )),
        },
    }
}

pub fn build_list_query(
    filter: &JobFilter,
    orderby: Option<&str>,
    order: Option<&str>,
    skip: Option<u64>,
    top: Option<u64>,
) -> Result<JobListQuery> {
    if let Some(top) = top {
        validate_positive_number("--top", top, 1)?;
    }

    Ok(JobListQuery {
        filter: construct_filter_query(filter)?,
        orderby: construct_orderby_expression(orderby, order)?,
        skip,
        top,
    })
}
