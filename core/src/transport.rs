//! The seam where the host plugs in real HTTP, plus a service that pairs it
//! with the stateless client.

use tracing::{debug, info, warn};

use crate::client::StudentClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Student, StudentId, StudentPayload, YearStat};

/// Executes one HTTP round-trip. `Sync` so the aggregate loader can fan out
/// over scoped threads.
pub trait Transport: Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Student operations over a concrete transport.
///
/// The `fetch_*` reads collapse any failure into an empty result, for callers
/// that only want whatever data is available. The `try_fetch_*` reads surface
/// every failure. Writes always surface errors.
#[derive(Debug, Clone)]
pub struct StudentService<T> {
    client: StudentClient,
    transport: T,
}

impl<T: Transport> StudentService<T> {
    pub fn new(client: StudentClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &StudentClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub fn try_fetch_all(&self) -> Result<Vec<Student>, ApiError> {
        let response = self.send(self.client.build_list_students())?;
        self.client.parse_list_students(response)
    }

    pub fn try_fetch_count(&self) -> Result<Option<u64>, ApiError> {
        let response = self.send(self.client.build_count_students())?;
        self.client.parse_count_students(response)
    }

    pub fn try_fetch_by_year(&self) -> Result<Vec<YearStat>, ApiError> {
        let response = self.send(self.client.build_students_by_year())?;
        self.client.parse_students_by_year(response)
    }

    /// All students, or an empty list on any failure.
    pub fn fetch_all(&self) -> Vec<Student> {
        self.try_fetch_all().unwrap_or_else(|err| {
            warn!(error = %err, "listing students failed, using an empty roster");
            Vec::new()
        })
    }

    /// Server-side count, or `None` when it fails or cannot be read.
    pub fn fetch_count(&self) -> Option<u64> {
        self.try_fetch_count().unwrap_or_else(|err| {
            warn!(error = %err, "counting students failed");
            None
        })
    }

    /// Year distribution, or an empty list on any failure.
    pub fn fetch_by_year(&self) -> Vec<YearStat> {
        self.try_fetch_by_year().unwrap_or_else(|err| {
            warn!(error = %err, "fetching year distribution failed");
            Vec::new()
        })
    }

    /// One student. `Ok(None)` when the service has no such record.
    pub fn try_fetch_one(&self, id: &StudentId) -> Result<Option<Student>, ApiError> {
        let request = self.client.build_get_student(id)?;
        self.client.parse_get_student(self.send(request)?)
    }

    /// One student, or `None` when the id is missing, unknown or the call fails.
    pub fn fetch_one(&self, id: Option<&StudentId>) -> Option<Student> {
        let id = id.filter(|id| !id.is_blank())?;
        self.try_fetch_one(id).unwrap_or_else(|err| {
            warn!(%id, error = %err, "fetching student failed");
            None
        })
    }

    pub fn create(&self, payload: &StudentPayload) -> Result<Student, ApiError> {
        let request = self.client.build_create_student(payload)?;
        let created = self.client.parse_create_student(self.send(request)?)?;
        info!(id = ?created.id, "student created");
        Ok(created)
    }

    pub fn update(&self, id: Option<&StudentId>, payload: &StudentPayload) -> Result<Student, ApiError> {
        let request = self.client.build_update_student(id, payload)?;
        let updated = self.client.parse_update_student(self.send(request)?)?;
        info!(id = ?updated.id, "student updated");
        Ok(updated)
    }

    pub fn delete(&self, id: Option<&StudentId>) -> Result<(), ApiError> {
        let request = self.client.build_delete_student(id)?;
        self.client.parse_delete_student(self.send(request)?)?;
        info!(id = ?id, "student deleted");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;

    /// Canned responses keyed by method and path, with a request log.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        routes: Mutex<HashMap<(HttpMethod, String), Result<HttpResponse, String>>>,
        pub(crate) log: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn respond(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
            let content_type = if body.is_empty() { "text/plain" } else { "application/json" };
            let response = HttpResponse {
                status,
                headers: vec![("content-type".to_string(), content_type.to_string())],
                body: body.to_string(),
            };
            self.routes
                .lock()
                .unwrap()
                .insert((method, path.to_string()), Ok(response));
        }

        pub(crate) fn fail(&self, method: HttpMethod, path: &str, message: &str) {
            self.routes
                .lock()
                .unwrap()
                .insert((method, path.to_string()), Err(message.to_string()));
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.log.lock().unwrap().push(request.clone());
            let routes = self.routes.lock().unwrap();
            match routes.get(&(request.method, request.path.clone())) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(message)) => Err(ApiError::Transport(message.clone())),
                None => Ok(HttpResponse {
                    status: 404,
                    headers: Vec::new(),
                    body: String::new(),
                }),
            }
        }
    }
}
