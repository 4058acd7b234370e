//! Dashboard flows against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client through a
//! ureq-backed `Transport`. Validates that request building, body sniffing
//! and normalization work end-to-end with a real HTTP stack.

use roster_core::{
    ApiError, Dashboard, DeleteOutcome, HttpMethod, HttpRequest, HttpResponse, ReloadMode,
    StudentClient, StudentForm, StudentId, StudentService, Transport, YearFilter, YearLabel,
};

/// Executes requests with ureq without treating 4xx/5xx as transport errors.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
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
        let result = match req.method {
            HttpMethod::Get => with_headers!(self.agent.get(&req.path), &req.headers).call(),
            HttpMethod::Delete => with_headers!(self.agent.delete(&req.path), &req.headers).call(),
            HttpMethod::Post => with_headers!(self.agent.post(&req.path), &req.headers)
                .send(req.body.as_deref().unwrap_or_default().as_bytes()),
            HttpMethod::Put => with_headers!(self.agent.put(&req.path), &req.headers)
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

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api/")
}

#[test]
fn dashboard_lifecycle() {
    let base = start_server();
    let service = StudentService::new(StudentClient::new(&base), UreqTransport::new());
    let mut dashboard = Dashboard::new(service, 8);

    // Step 1: initial visible load of an empty roster.
    dashboard.load(ReloadMode::Visible).unwrap();
    assert!(dashboard.students().is_empty());
    assert_eq!(dashboard.view().metrics.total, 0);

    // Step 2: the form refuses an empty last name without any request.
    dashboard.open_create_form();
    *dashboard.form_values_mut().unwrap() = StudentForm::new("Jane", "", "2001-05-10");
    assert!(dashboard.submit_form().is_err());
    assert!(dashboard.form().is_open());

    // Step 3: create two students.
    *dashboard.form_values_mut().unwrap() = StudentForm::new("Jane", "Doe", "2001-05-10");
    let jane = dashboard.submit_form().unwrap();
    assert!(!dashboard.form().is_open());
    dashboard.open_create_form();
    *dashboard.form_values_mut().unwrap() = StudentForm::new("John", "Smith", "2000-01-15");
    dashboard.submit_form().unwrap();

    // Step 4: the silent reloads picked both up, with the server's count.
    assert_eq!(dashboard.students().len(), 2);
    let view = dashboard.view();
    assert_eq!(view.metrics.total, 2);
    assert_eq!(view.available_years.len(), 2);
    assert_eq!(view.distribution.total, 2);
    assert!(view
        .distribution
        .bars
        .iter()
        .all(|bar| matches!(bar.stat.label, YearLabel::Number(_))));

    // Step 5: search and year filter.
    dashboard.set_search_term("doe");
    assert_eq!(dashboard.view().filtered.len(), 1);
    dashboard.set_search_term("");
    dashboard.set_year_filter(YearFilter::Year(2000));
    let view = dashboard.view();
    assert_eq!(view.filtered.len(), 1);
    assert_eq!(view.filtered[0].fname, "John");
    dashboard.set_year_filter(YearFilter::All);

    // Step 6: edit Jane.
    dashboard.open_edit_form(&jane);
    dashboard.form_values_mut().unwrap().lname = "Roe".to_string();
    let edited = dashboard.submit_form().unwrap();
    assert_eq!(edited.id, jane.id);
    assert_eq!(edited.lname, "Roe");
    assert!(dashboard.students().iter().any(|s| s.lname == "Roe"));

    // Step 7: fetch one through the lenient read.
    let fetched = dashboard.service().fetch_one(jane.id.as_ref()).unwrap();
    assert_eq!(fetched.lname, "Roe");

    // Step 8: delete with confirmation.
    let outcome = dashboard.delete_student(&edited, |_| true).unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(dashboard.students().len(), 1);
    assert!(dashboard.service().fetch_one(jane.id.as_ref()).is_none());
    let gone = jane.id.clone().unwrap();
    assert!(dashboard.service().try_fetch_one(&gone).unwrap().is_none());

    // Step 9: deleting again surfaces the 404.
    let err = dashboard.service().delete(jane.id.as_ref()).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
}

#[test]
fn server_rejection_reaches_the_user() {
    let base = start_server();
    let service = StudentService::new(StudentClient::new(&base), UreqTransport::new());

    let payload = roster_core::StudentPayload {
        fname: "Jane".to_string(),
        lname: "Doe".to_string(),
        birth_date: "2001-05-10".to_string(),
    };
    let err = service.create(&payload).unwrap_err();
    assert_eq!(err.to_string(), "API request failed (400): invalid birthDate: 2001-05-10");

    let err = service.update(Some(&StudentId::Number(41)), &roster_core::StudentPayload {
        birth_date: "2001-05-10T00:00:00.000Z".to_string(),
        ..payload
    });
    assert!(matches!(err, Err(ApiError::Http { status: 404, .. })));
}

#[test]
fn unreachable_server_is_an_error_banner() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = StudentClient::new(&format!("http://{addr}/api"));
    let service = StudentService::new(client, UreqTransport::new());
    assert!(service.fetch_all().is_empty());
    assert!(service.fetch_one(Some(&StudentId::Number(1))).is_none());
    assert!(matches!(
        service.try_fetch_one(&StudentId::Number(1)),
        Err(ApiError::Transport(_))
    ));

    let mut dashboard = Dashboard::new(service, 8);
    assert!(dashboard.load(ReloadMode::Visible).is_err());
    assert!(dashboard.error().is_some());
    assert!(!dashboard.is_loading());
}
