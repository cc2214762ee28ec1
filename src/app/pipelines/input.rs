use crate::core::JobRecord;
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// 依副檔名判斷輸入格式
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(EtlError::InputFormatError {
                source_name: path.to_string(),
                reason: "expected a .json or .csv file".to_string(),
            }),
        }
    }
}

pub fn decode_records(bytes: &[u8], format: InputFormat, source_name: &str) -> Result<Vec<JobRecord>> {
    match format {
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            decode_json(value, source_name)
        }
        InputFormat::Csv => decode_csv(bytes),
    }
}

/// 接受物件陣列、帶 `items` 陣列的物件，或單一物件。
/// 形如 `{"json": {...}}` 的項目會被展開。
pub fn decode_json(value: serde_json::Value, source_name: &str) -> Result<Vec<JobRecord>> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("items") {
            Some(serde_json::Value::Array(items)) => items,
            Some(other) => {
                obj.insert("items".to_string(), other);
                vec![serde_json::Value::Object(obj)]
            }
            None => vec![serde_json::Value::Object(obj)],
        },
        other => {
            return Err(EtlError::InputFormatError {
                source_name: source_name.to_string(),
                reason: format!("expected an array or object, found {}", json_kind(&other)),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match unwrap_item(item) {
            Some(data) => records.push(JobRecord::new(data)),
            None => tracing::warn!("⚠️ Skipping item {} in {}: not an object", index, source_name),
        }
    }
    Ok(records)
}

fn unwrap_item(item: serde_json::Value) -> Option<HashMap<String, serde_json::Value>> {
    let serde_json::Value::Object(mut obj) = item else {
        return None;
    };
    if let Some(serde_json::Value::Object(inner)) = obj.remove("json") {
        return Some(inner.into_iter().collect());
    }
    Some(obj.into_iter().collect())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

pub fn decode_csv(bytes: &[u8]) -> Result<Vec<JobRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let data = headers
            .iter()
            .zip(row.iter())
            .map(|(header, field)| {
                (
                    header.to_string(),
                    serde_json::Value::String(field.to_string()),
                )
            })
            .collect();
        records.push(JobRecord::new(data));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_array_and_item_envelope() {
        let value = json!([
            {"job_id": "a1", "title": "Data Analyst"},
            {"json": {"job_id": "a2", "title": "BI Analyst"}},
            "not a record"
        ]);
        let records = decode_json(value, "jobs.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text("title").as_deref(), Some("BI Analyst"));
    }

    #[test]
    fn test_decode_json_items_object_and_single_object() {
        let wrapped = json!({"items": [{"title": "A"}, {"title": "B"}]});
        assert_eq!(decode_json(wrapped, "x").unwrap().len(), 2);

        let single = json!({"title": "Only"});
        let records = decode_json(single, "x").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("title").as_deref(), Some("Only"));

        assert!(decode_json(json!(42), "x").is_err());
    }

    #[test]
    fn test_decode_csv_reads_headers_as_fields() {
        let csv_data = "job_id,title,skills,experience\n1,Data Analyst,\"python, sql\",2-4 yrs\n2,BI Developer,power bi,\n";
        let records = decode_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("skills").as_deref(), Some("python, sql"));
        assert_eq!(records[1].text("experience"), None);
    }

    #[test]
    fn test_input_format_from_path() {
        assert_eq!(InputFormat::from_path("data/jobs.JSON").unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path("jobs.csv").unwrap(), InputFormat::Csv);
        assert!(InputFormat::from_path("jobs.xlsx").is_err());
    }
}
