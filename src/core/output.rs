use serde_json::{Map, Value};

const NOT_FOUND: &str = "Not found";
const BAR_WIDTH: i64 = 20;

/// 機率必須介於 0 與 1 之間，否則視為格式錯誤
fn probability_of(value: &Value) -> Option<f64> {
    value.as_f64().filter(|p| (0.0..=1.0).contains(p))
}

fn histogram_row(label: Value, probability: f64) -> Value {
    let repeat = ((probability * BAR_WIDTH as f64).round_ties_even() as i64).clamp(0, BAR_WIDTH);
    let bars = "\u{2588}".repeat(repeat as usize);
    let spaces = " ".repeat((BAR_WIDTH - repeat) as usize);

    let mut row = Map::new();
    row.insert("Result".to_string(), label);
    row.insert(
        "Frequency".to_string(),
        Value::String(format!("{:10.8}", probability)),
    );
    row.insert(
        String::new(),
        Value::String(format!("\u{2590}{}{}\u{258C}", bars, spaces)),
    );
    Value::Object(row)
}

/// `Histogram` 為 [label, p, label, p, ...] 的扁平陣列
fn flat_histogram_table(histogram: &[Value]) -> Option<Value> {
    if histogram.len() % 2 != 0 {
        return None;
    }

    let mut table = Vec::with_capacity(histogram.len() / 2);
    for pair in histogram.chunks(2) {
        let probability = probability_of(&pair[1])?;
        table.push(histogram_row(pair[0].clone(), probability));
    }
    Some(Value::Array(table))
}

fn keyed_histogram_table(histogram: &Map<String, Value>) -> Option<Value> {
    let mut table = Vec::with_capacity(histogram.len());
    for (label, probability) in histogram {
        table.push(histogram_row(Value::String(label.clone()), probability_of(probability)?));
    }
    Some(Value::Array(table))
}

fn field_or_not_found(source: Option<&Map<String, Value>>, key: &str) -> Value {
    match source.and_then(|obj| obj.get(key)) {
        Some(Value::Null) | None => Value::String(NOT_FOUND.to_string()),
        Some(value) => value.clone(),
    }
}

fn error_table(results: &Map<String, Value>) -> Value {
    let error_data = results.get("errorData").and_then(Value::as_object);

    let mut table = Map::new();
    table.insert("Status".to_string(), field_or_not_found(Some(results), "status"));
    table.insert("Error Code".to_string(), field_or_not_found(error_data, "code"));
    table.insert(
        "Error Message".to_string(),
        field_or_not_found(error_data, "message"),
    );
    table.insert("Target".to_string(), field_or_not_found(Some(results), "target"));
    table.insert("Job ID".to_string(), field_or_not_found(Some(results), "id"));
    table.insert(
        "Submission Time".to_string(),
        field_or_not_found(Some(results), "creationTime"),
    );
    Value::Object(table)
}

/// Table view for `job output`. Anything it does not recognise is returned unchanged.
pub fn transform_output(results: &Value) -> Value {
    let Some(obj) = results.as_object() else {
        return results.clone();
    };

    if let Some(histogram) = obj.get("Histogram") {
        return histogram
            .as_array()
            .and_then(|items| flat_histogram_table(items))
            .unwrap_or_else(|| results.clone());
    }

    if let Some(histogram) = obj.get("histogram") {
        return histogram
            .as_object()
            .and_then(keyed_histogram_table)
            .unwrap_or_else(|| results.clone());
    }

    if obj.contains_key("errorData") {
        return error_table(obj);
    }

    results.clone()
}

fn field(job: &Value, key: &str) -> Value {
    job.get(key).cloned().unwrap_or(Value::Null)
}

pub fn transform_job(job: &Value) -> Value {
    let mut row = Map::new();
    row.insert("Name".to_string(), field(job, "name"));
    row.insert("Id".to_string(), field(job, "id"));
    row.insert("Status".to_string(), field(job, "status"));
    row.insert("Target".to_string(), field(job, "target"));
    row.insert("Submission time".to_string(), field(job, "creationTime"));
    row.insert("Completion time".to_string(), field(job, "endExecutionTime"));
    Value::Object(row)
}

pub fn transform_jobs(jobs: &Value) -> Value {
    match jobs.as_array() {
        Some(items) => Value::Array(items.iter().map(transform_job).collect()),
        None => transform_job(jobs),
    }
}

pub fn transform_targets(providers: &Value) -> Value {
    let mut rows = Vec::new();

    for provider in providers.as_array().into_iter().flatten() {
        let provider_id = field(provider, "id");
        let targets = provider.get("targets").and_then(Value::as_array);

        for target in targets.into_iter().flatten() {
            let mut row = Map::new();
            row.insert("Provider".to_string(), provider_id.clone());
            row.insert("Target-id".to_string(), field(target, "id"));
            row.insert(
                "Current Availability".to_string(),
                field(target, "currentAvailability"),
            );
            row.insert(
                "Average Queue Time (seconds)".to_string(),
                field(target, "averageQueueTime"),
            );
            rows.push(Value::Object(row));
        }
    }

    Value::Array(rows)
}
