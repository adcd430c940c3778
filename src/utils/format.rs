use crate::utils::error::Result;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
    Tsv,
}

pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(value)),
        OutputFormat::Tsv => render_tsv(value),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        nested => nested.to_string(),
    }
}

/// 將 JSON 攤平成 (欄位, 列) 形式；物件陣列每個元素一列
fn to_rows(value: &Value) -> (Vec<String>, Vec<Vec<String>>) {
    let objects: Vec<&Map<String, Value>> = match value {
        Value::Object(obj) => vec![obj],
        Value::Array(items) if items.iter().all(Value::is_object) => {
            items.iter().filter_map(Value::as_object).collect()
        }
        Value::Array(items) => {
            let rows = items.iter().map(|item| vec![cell_text(item)]).collect();
            return (vec!["Result".to_string()], rows);
        }
        scalar => return (vec!["Result".to_string()], vec![vec![cell_text(scalar)]]),
    };

    let mut columns: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|column| obj.get(column).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    (columns, rows)
}

pub fn render_table(value: &Value) -> String {
    let (columns, rows) = to_rows(value);
    if rows.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(&columns[..]));
    lines.push(rule.join("  "));
    for row in &rows {
        lines.push(format_line(&row[..]));
    }
    lines.join("\n")
}

pub fn render_tsv(value: &Value) -> Result<String> {
    let (_, rows) = to_rows(value);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());

    for row in &rows {
        writer.write_record(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}
