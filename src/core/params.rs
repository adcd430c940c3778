use crate::utils::error::{QuantumError, Result};
use crate::utils::validation::validate_positive_number;
use serde_json::{Map, Number, Value};

pub const DEFAULT_MAX_POLL_WAIT_SECS: &str = "5";

const ERROR_MSG_JOB_PARAMS_USAGE: &str =
    "Usage error: --job-params KEY=VALUE [KEY=VALUE ...] or a JSON object";

/// 輪詢上限秒數必須 >= 1.0
pub fn validate_max_poll_wait_secs(value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 1.0 => Ok(secs),
        _ => Err(QuantumError::invalid_argument(format!(
            "--max-poll-wait-secs parameter is not valid: {}",
            value
        ))),
    }
}

fn numeric_value(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Converts top-level numeric strings in place. Lists and nested objects are left alone.
pub fn convert_numeric_params(params: &mut Map<String, Value>) {
    for value in params.values_mut() {
        let converted = match value {
            Value::String(text) => numeric_value(text),
            _ => None,
        };
        if let Some(number) = converted {
            *value = number;
        }
    }
}

/// 解析 `--job-params`：`KEY=VALUE` 或整段 JSON 物件
pub fn parse_job_params(items: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();

    for item in items {
        let trimmed = item.trim();
        if trimmed.starts_with('{') {
            let parsed: Value = serde_json::from_str(trimmed).map_err(|e| {
                QuantumError::invalid_argument(format!("--job-params JSON is not valid: {}", e))
            })?;
            match parsed {
                Value::Object(obj) => params.extend(obj),
                _ => return Err(QuantumError::invalid_argument(ERROR_MSG_JOB_PARAMS_USAGE)),
            }
            continue;
        }

        match trimmed.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                params.insert(key.trim().to_string(), Value::String(value.to_string()));
            }
            _ => return Err(QuantumError::invalid_argument(ERROR_MSG_JOB_PARAMS_USAGE)),
        }
    }

    Ok(params)
}

/// Everything derived from the user's parameter flags that ends up on the submitted job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitParams {
    pub input_params: Map<String, Value>,
    pub metadata: Option<Map<String, Value>>,
    pub tags: Option<Vec<String>>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParamFlags<'a> {
    pub job_params: &'a [String],
    pub shots: Option<u64>,
    pub target_capability: Option<&'a str>,
    pub entry_point: Option<&'a str>,
}

pub fn build_submit_params(flags: &ParamFlags<'_>) -> Result<SubmitParams> {
    let mut input_params = parse_job_params(flags.job_params)?;

    let metadata = match input_params.remove("metadata") {
        None => None,
        Some(Value::Object(obj)) => Some(obj),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(obj)) => Some(obj),
            _ => {
                return Err(QuantumError::invalid_argument(
                    "--job-params metadata must be a JSON object",
                ))
            }
        },
        Some(_) => {
            return Err(QuantumError::invalid_argument(
                "--job-params metadata must be a JSON object",
            ))
        }
    };

    let tags = match input_params.remove("tags") {
        None => None,
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|tag| match tag {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        Some(Value::String(text)) => Some(
            text.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Some(other) => Some(vec![other.to_string()]),
    };

    let content_type = match input_params.remove("content-type") {
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
        None => None,
    };

    if let Some(shots) = flags.shots {
        validate_positive_number("--shots", shots, 1)?;
        input_params.insert("shots".to_string(), Value::Number(shots.into()));
    }
    if let Some(capability) = flags.target_capability {
        input_params.insert(
            "targetCapability".to_string(),
            Value::String(capability.to_string()),
        );
    }
    if let Some(entry_point) = flags.entry_point {
        input_params.insert("entryPoint".to_string(), Value::String(entry_point.to_string()));
    }

    convert_numeric_params(&mut input_params);

    Ok(SubmitParams {
        input_params,
        metadata,
        tags,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(obj) => obj,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_validate_max_poll_wait_secs() {
        assert_eq!(validate_max_poll_wait_secs("1").unwrap(), 1.0);
        assert_eq!(validate_max_poll_wait_secs("60").unwrap(), 60.0);
        assert_eq!(validate_max_poll_wait_secs("2.5").unwrap(), 2.5);

        for bad in ["0.999999999", "-1.0", "foobar", "inf", "NaN", ""] {
            let err = validate_max_poll_wait_secs(bad).unwrap_err();
            assert!(matches!(err, QuantumError::InvalidArgumentValue { .. }));
            assert_eq!(
                err.to_string(),
                format!("--max-poll-wait-secs parameter is not valid: {}", bad)
            );
        }
    }

    #[test]
    fn test_convert_numeric_params() {
        let mut params = as_map(json!({
            "integer1": "1", "float1.5": "1.5", "integer2": 2,
            "float2.5": 2.5, "integer3": "3", "float3.5": "3.5"
        }));
        convert_numeric_params(&mut params);
        assert_eq!(
            Value::Object(params),
            json!({
                "integer1": 1, "float1.5": 1.5, "integer2": 2,
                "float2.5": 2.5, "integer3": 3, "float3.5": 3.5
            })
        );

        let mut params = as_map(json!({
            "string1": "string_value1", "string2": "string_value2", "string3": "string_value3"
        }));
        let expected = Value::Object(params.clone());
        convert_numeric_params(&mut params);
        assert_eq!(Value::Object(params), expected);
    }

    #[test]
    fn test_convert_numeric_params_leaves_lists_and_objects() {
        let mut params = as_map(json!({
            "string1": "string_value1", "tags": ["tag1", "tag2", "3", "4"], "integer1": "1"
        }));
        convert_numeric_params(&mut params);
        assert_eq!(
            Value::Object(params),
            json!({"string1": "string_value1", "tags": ["tag1", "tag2", "3", "4"], "integer1": 1})
        );

        let mut params = as_map(json!({
            "string1": "string_value1",
            "metadata": {"meta1": "meta_value1", "meta2": "2"},
            "integer1": "1"
        }));
        convert_numeric_params(&mut params);
        assert_eq!(
            Value::Object(params),
            json!({
                "string1": "string_value1",
                "metadata": {"meta1": "meta_value1", "meta2": "2"},
                "integer1": 1
            })
        );
    }

    #[test]
    fn test_convert_numeric_params_keeps_non_finite_strings() {
        let mut params = as_map(json!({"a": "NaN", "b": "inf", "c": "-7", "d": "1e3"}));
        convert_numeric_params(&mut params);
        assert_eq!(
            Value::Object(params),
            json!({"a": "NaN", "b": "inf", "c": -7, "d": 1000.0})
        );
    }

    #[test]
    fn test_parse_job_params_key_values_and_json() {
        let items = vec![
            "count=100".to_string(),
            "content-type=application/json".to_string(),
            "expr=a=b".to_string(),
            r#"{"metadata": {"origin": "cli"}}"#.to_string(),
        ];
        let params = parse_job_params(&items).unwrap();

        assert_eq!(params.get("count"), Some(&json!("100")));
        assert_eq!(params.get("content-type"), Some(&json!("application/json")));
        assert_eq!(params.get("expr"), Some(&json!("a=b")));
        assert_eq!(params.get("metadata"), Some(&json!({"origin": "cli"})));
    }

    #[test]
    fn test_parse_job_params_rejects_bare_words() {
        let err = parse_job_params(&["shots".to_string()]).unwrap_err();
        assert!(err.to_string().starts_with("Usage error: --job-params"));

        assert!(parse_job_params(&["=1".to_string()]).is_err());
        assert!(parse_job_params(&["[1, 2]".to_string()]).is_err());
    }

    #[test]
    fn test_build_submit_params() {
        let job_params = vec![
            "count=100".to_string(),
            "content-type=application/json".to_string(),
            "tags=nightly, ghz".to_string(),
            r#"metadata={"owner": "lab"}"#.to_string(),
        ];
        let flags = ParamFlags {
            job_params: &job_params,
            shots: Some(500),
            target_capability: Some("AdaptiveExecution"),
            entry_point: Some("ENTRYPOINT__main"),
        };

        let submit = build_submit_params(&flags).unwrap();

        assert_eq!(
            Value::Object(submit.input_params),
            json!({
                "count": 100,
                "shots": 500,
                "targetCapability": "AdaptiveExecution",
                "entryPoint": "ENTRYPOINT__main"
            })
        );
        assert_eq!(submit.content_type.as_deref(), Some("application/json"));
        assert_eq!(submit.tags, Some(vec!["nightly".to_string(), "ghz".to_string()]));
        assert_eq!(submit.metadata, Some(as_map(json!({"owner": "lab"}))));
    }

    #[test]
    fn test_build_submit_params_rejects_zero_shots() {
        let flags = ParamFlags {
            shots: Some(0),
            ..Default::default()
        };
        assert!(build_submit_params(&flags).is_err());
    }
}
