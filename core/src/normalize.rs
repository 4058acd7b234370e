//! Normalization boundary between the remote service's shapes and the
//! canonical types.
//!
//! # Design
//! Responses are first sniffed into a [`ResponseBody`] based on status and
//! content type, then the loosely-typed JSON is mapped field by field. The
//! first non-null field among the known aliases wins, mirroring how the
//! service's different serializers spell things.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::types::{Student, StudentId, YearLabel, YearStat};

const COUNT_KEYS: [&str; 4] = ["count", "total", "totalElements", "value"];
const YEAR_LABEL_KEYS: [&str; 4] = ["year", "annee", "graduationYear", "key"];
const YEAR_VALUE_KEYS: [&str; 4] = ["count", "total", "nbrStudent", "value"];

/// A response body after content-type sniffing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// 204, or a content type that is neither JSON nor text.
    Empty,
    Json(Value),
    Number(f64),
    Text(String),
}

impl ResponseBody {
    /// View the body as JSON. Text bodies that parsed as numbers count.
    pub fn into_json(self) -> Option<Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Number(n) => serde_json::Number::from_f64(n).map(Value::Number),
            ResponseBody::Text(_) | ResponseBody::Empty => None,
        }
    }
}

/// Sniff a successful response body.
pub fn decode_body(response: &HttpResponse) -> Result<ResponseBody, ApiError> {
    if response.status == 204 {
        return Ok(ResponseBody::Empty);
    }
    let content_type = response.header("content-type").unwrap_or_default();
    if content_type.contains("json") {
        return serde_json::from_str(&response.body)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::Deserialization(e.to_string()));
    }
    if content_type.contains("text") {
        return Ok(match response.body.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => ResponseBody::Number(n),
            _ => ResponseBody::Text(response.body.clone()),
        });
    }
    Ok(ResponseBody::Empty)
}

/// Map one raw student resource to the canonical record.
pub fn map_student(resource: &Value) -> Student {
    Student {
        id: first_present(resource, &["id"])
            .and_then(id_from_value)
            .or_else(|| id_from_links(resource)),
        fname: first_present(resource, &["fname", "firstName"])
            .map(value_to_string)
            .unwrap_or_default(),
        lname: first_present(resource, &["lname", "lastName"])
            .map(value_to_string)
            .unwrap_or_default(),
        birth_date: first_present(resource, &["birthDate", "dateOfBirth"]).map(value_to_string),
    }
}

/// Map a list body. Anything that is not a JSON array is rejected.
pub fn map_students(body: ResponseBody) -> Result<Vec<Student>, ApiError> {
    match body.into_json() {
        Some(Value::Array(items)) => Ok(items.iter().map(map_student).collect()),
        _ => Err(ApiError::Deserialization(
            "expected an array of students".to_string(),
        )),
    }
}

/// Pull a count out of a bare number or an object with a count-bearing key.
pub fn extract_count(body: ResponseBody) -> Option<u64> {
    match body.into_json()? {
        Value::Number(n) => number_to_count(&n),
        Value::Object(map) => COUNT_KEYS.iter().find_map(|key| match map.get(*key) {
            Some(Value::Number(n)) => number_to_count(n),
            _ => None,
        }),
        _ => None,
    }
}

/// Map a year distribution body: a bare array or a `_embedded.students` wrapper.
pub fn map_year_stats(body: ResponseBody) -> Vec<YearStat> {
    let json = body.into_json();
    let entries: &[Value] = match &json {
        Some(Value::Array(items)) => items.as_slice(),
        Some(value) => match value.pointer("/_embedded/students") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        None => &[],
    };
    entries.iter().map(map_year_stat).collect()
}

fn map_year_stat(entry: &Value) -> YearStat {
    if !entry.is_object() {
        return YearStat::unknown();
    }
    let label = match first_present(entry, &YEAR_LABEL_KEYS) {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(YearLabel::Number)
            .unwrap_or_else(|| YearLabel::Text(n.to_string())),
        Some(other) => YearLabel::Text(value_to_string(other)),
        None => YearLabel::unknown(),
    };
    let value = first_present(entry, &YEAR_VALUE_KEYS)
        .and_then(|v| match v {
            Value::Number(n) => number_to_count(n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0);
    YearStat { label, value }
}

fn first_present<'a>(resource: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| resource.get(*key))
        .find(|value| !value.is_null())
}

fn id_from_value(value: &Value) -> Option<StudentId> {
    match value {
        Value::Number(n) => Some(
            n.as_i64()
                .map(StudentId::Number)
                .unwrap_or_else(|| StudentId::Text(n.to_string())),
        ),
        Value::String(s) => Some(StudentId::Text(s.clone())),
        _ => None,
    }
}

/// Recover an id from the last segment of `_links.self.href`.
fn id_from_links(resource: &Value) -> Option<StudentId> {
    let href = resource.pointer("/_links/self/href")?.as_str()?;
    href.rsplit('/').next().map(StudentId::from)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number_to_count(n: &serde_json::Number) -> Option<u64> {
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}
