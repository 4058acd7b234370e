//! Stateless HTTP request builder and response parser for the student API.
//!
//! # Design
//! `StudentClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Normalization of the service's field-name variants happens inside the
//! `parse_*` methods, so callers only ever see canonical types.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{self, ResponseBody};
use crate::types::{Student, StudentId, StudentPayload, UpdateStudentBody, YearStat};

const ACCEPT: &str = "application/json, application/hal+json";
const CONTENT_TYPE: &str = "application/json";

/// Synchronous, stateless client for the student API.
#[derive(Debug, Clone)]
pub struct StudentClient {
    base_url: String,
}

impl StudentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_students(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/students/all", None)
    }

    pub fn build_count_students(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/students/count", None)
    }

    pub fn build_students_by_year(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/students/byYear", None)
    }

    pub fn build_get_student(&self, id: &StudentId) -> Result<HttpRequest, ApiError> {
        let id = require_id(Some(id))?;
        Ok(self.request(HttpMethod::Get, &format!("/students/{id}"), None))
    }

    pub fn build_create_student(&self, payload: &StudentPayload) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, "/students/save", Some(body)))
    }

    pub fn build_update_student(
        &self,
        id: Option<&StudentId>,
        payload: &StudentPayload,
    ) -> Result<HttpRequest, ApiError> {
        let id = require_id(id)?;
        let body = serde_json::to_string(&UpdateStudentBody { id, payload })
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Put, &format!("/students/{id}"), Some(body)))
    }

    pub fn build_delete_student(&self, id: Option<&StudentId>) -> Result<HttpRequest, ApiError> {
        let id = require_id(id)?;
        Ok(self.request(HttpMethod::Delete, &format!("/students/{id}"), None))
    }

    pub fn parse_list_students(&self, response: HttpResponse) -> Result<Vec<Student>, ApiError> {
        normalize::map_students(decode(&response)?)
    }

    /// `Ok(None)` when the body carries no recognizable count.
    pub fn parse_count_students(&self, response: HttpResponse) -> Result<Option<u64>, ApiError> {
        Ok(normalize::extract_count(decode(&response)?))
    }

    pub fn parse_students_by_year(&self, response: HttpResponse) -> Result<Vec<YearStat>, ApiError> {
        Ok(normalize::map_year_stats(decode(&response)?))
    }

    /// `Ok(None)` for a 404 or a body that is not a student resource.
    pub fn parse_get_student(&self, response: HttpResponse) -> Result<Option<Student>, ApiError> {
        if response.status == 404 {
            return Ok(None);
        }
        Ok(decode(&response)?
            .into_json()
            .filter(|value| value.is_object())
            .map(|value| normalize::map_student(&value)))
    }

    pub fn parse_create_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        parse_resource(&response)
    }

    pub fn parse_update_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        parse_resource(&response)
    }

    pub fn parse_delete_student(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode(&response).map(|_| ())
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let path = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        HttpRequest {
            method,
            path,
            headers: vec![
                ("accept".to_string(), ACCEPT.to_string()),
                ("content-type".to_string(), CONTENT_TYPE.to_string()),
            ],
            body,
        }
    }
}

fn require_id(id: Option<&StudentId>) -> Result<&StudentId, ApiError> {
    id.filter(|id| !id.is_blank()).ok_or(ApiError::MissingId)
}

/// Reject non-2xx statuses, then sniff the body.
fn decode(response: &HttpResponse) -> Result<ResponseBody, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        });
    }
    normalize::decode_body(response)
}

/// Write endpoints answer with the resource; an empty answer maps to an
/// empty record the same way a missing field would.
fn parse_resource(response: &HttpResponse) -> Result<Student, ApiError> {
    let value = decode(response)?.into_json().unwrap_or(serde_json::Value::Null);
    Ok(normalize::map_student(&value))
}
