//! Blocking HTTP transport backed by ureq.

use roster_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";

/// Executes `HttpRequest`s with a shared ureq agent.
///
/// Status codes are returned as data rather than errors so the core decides
/// what a 4xx/5xx means. Relative request paths are resolved against `origin`.
pub struct UreqTransport {
    agent: ureq::Agent,
    origin: String,
}

impl UreqTransport {
    pub fn new(origin: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.origin)
        } else {
            path.to_string()
        }
    }
}

macro_rules! with_headers {
    ($builder:expr, $headers:expr) => {{
        let mut builder = $builder;
        for (key, value) in $headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }};
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.url(&req.path);
        let result = match req.method {
            HttpMethod::Get => with_headers!(self.agent.get(&url), &req.headers).call(),
            HttpMethod::Delete => with_headers!(self.agent.delete(&url), &req.headers).call(),
            HttpMethod::Post => with_headers!(self.agent.post(&url), &req.headers)
                .send(req.body.as_deref().unwrap_or_default().as_bytes()),
            HttpMethod::Put => with_headers!(self.agent.put(&url), &req.headers)
                .send(req.body.as_deref().unwrap_or_default().as_bytes()),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}
