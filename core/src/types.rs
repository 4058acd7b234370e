//! Canonical student DTOs.
//!
//! # Design
//! These are the post-normalization shapes. The remote service may spell
//! fields differently (`firstName`, `dateOfBirth`, HAL links instead of ids);
//! `normalize` folds those variants into these types so nothing past the
//! client ever sees them.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Student identifier. The service hands out numbers, but ids recovered from
/// a `_links.self.href` arrive as text.
///
/// Equality and hashing go through the displayed form, so `Number(3)` and
/// `Text("3")` name the same student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Number(i64),
    Text(String),
}

impl StudentId {
    /// Whether the id is unusable for addressing a record: empty text or zero.
    pub fn is_blank(&self) -> bool {
        match self {
            StudentId::Number(n) => *n == 0,
            StudentId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentId::Number(n) => write!(f, "{n}"),
            StudentId::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for StudentId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StudentId::Number(a), StudentId::Number(b)) => a == b,
            (StudentId::Text(a), StudentId::Text(b)) => a == b,
            (a, b) => a.to_string() == b.to_string(),
        }
    }
}

impl Eq for StudentId {}

impl Hash for StudentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<i64> for StudentId {
    fn from(n: i64) -> Self {
        StudentId::Number(n)
    }
}

impl From<&str> for StudentId {
    fn from(s: &str) -> Self {
        StudentId::Text(s.to_string())
    }
}

/// A student record as held by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StudentId>,
    pub fname: String,
    pub lname: String,
    #[serde(default)]
    pub birth_date: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname, self.lname)
    }

    /// The id, if it can address the record on the server.
    pub fn usable_id(&self) -> Option<&StudentId> {
        self.id.as_ref().filter(|id| !id.is_blank())
    }
}

/// Body sent to `POST /students/save`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub fname: String,
    pub lname: String,
    pub birth_date: String,
}

/// Body sent to `PUT /students/{id}`: the payload plus the addressed id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStudentBody<'a> {
    pub id: &'a StudentId,
    #[serde(flatten)]
    pub payload: &'a StudentPayload,
}

/// Label of a year bucket. Usually a year number; free text otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum YearLabel {
    Number(i64),
    Text(String),
}

impl YearLabel {
    pub fn unknown() -> Self {
        YearLabel::Text("Unknown".to_string())
    }
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearLabel::Number(n) => write!(f, "{n}"),
            YearLabel::Text(s) => f.write_str(s),
        }
    }
}

/// Number of students per year, as reported by `GET /students/byYear`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearStat {
    pub label: YearLabel,
    pub value: u64,
}

impl YearStat {
    pub fn unknown() -> Self {
        Self {
            label: YearLabel::unknown(),
            value: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn numeric_and_text_ids_name_the_same_student() {
        assert_eq!(StudentId::Number(3), StudentId::from("3"));
        assert_ne!(StudentId::Number(3), StudentId::from("03"));
        assert_ne!(StudentId::from("abc"), StudentId::from("abd"));
        let ids: HashSet<StudentId> = [StudentId::Number(3), StudentId::from("3")].into_iter().collect();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn student_serializes_birth_date_in_camel_case() {
        let student = Student {
            id: Some(StudentId::Number(3)),
            fname: "Ada".to_string(),
            lname: "Lovelace".to_string(),
            birth_date: Some("1815-12-10T00:00:00.000Z".to_string()),
        };
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["birthDate"], "1815-12-10T00:00:00.000Z");
    }

    #[test]
    fn student_without_id_omits_the_field() {
        let student = Student {
            id: None,
            fname: "Ada".to_string(),
            lname: "Lovelace".to_string(),
            birth_date: None,
        };
        let json = serde_json::to_value(&student).unwrap();
        assert!(json.get("id").is_none());
        assert!(json["birthDate"].is_null());
    }

    #[test]
    fn update_body_flattens_payload_after_id() {
        let id = StudentId::Text("12".to_string());
        let payload = StudentPayload {
            fname: "Jane".to_string(),
            lname: "Doe".to_string(),
            birth_date: "2001-05-10T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(UpdateStudentBody { id: &id, payload: &payload }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "12",
                "fname": "Jane",
                "lname": "Doe",
                "birthDate": "2001-05-10T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn blank_ids_are_not_usable() {
        assert!(StudentId::Number(0).is_blank());
        assert!(StudentId::Text("  ".to_string()).is_blank());
        assert!(!StudentId::Number(7).is_blank());
        assert!(!StudentId::from("abc").is_blank());
    }
}
