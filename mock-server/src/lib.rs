//! In-memory stand-in for the remote student service, mounted under `/api`.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub fname: String,
    pub lname: String,
    pub birth_date: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub fname: String,
    pub lname: String,
    pub birth_date: String,
}

/// One row of `GET /students/byYear`, spelled the way the service spells it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct YearCount {
    pub annee: i32,
    pub nbr_student: u64,
}

pub struct Store {
    students: RwLock<BTreeMap<i64, Student>>,
    next_id: AtomicI64,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-populated with `students`, numbered from 1.
pub fn app_with(students: Vec<StudentInput>) -> Router {
    let seeded: BTreeMap<i64, Student> = students
        .into_iter()
        .zip(1..)
        .map(|(input, id)| (id, input.into_student(id)))
        .collect();
    let store = Store {
        next_id: AtomicI64::new(seeded.len() as i64 + 1),
        students: RwLock::new(seeded),
    };
    let api = Router::new()
        .route("/students/all", get(list_students))
        .route("/students/count", get(count_students))
        .route("/students/byYear", get(students_by_year))
        .route("/students/save", post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .with_state(Arc::new(store));
    Router::new().nest("/api", api).layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

impl StudentInput {
    fn into_student(self, id: i64) -> Student {
        Student {
            id,
            fname: self.fname,
            lname: self.lname,
            birth_date: self.birth_date,
        }
    }

    fn validate(&self) -> Result<(), (StatusCode, String)> {
        if self.fname.trim().is_empty() || self.lname.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, "names must not be empty".to_string()));
        }
        if birth_year(&self.birth_date).is_none() {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("invalid birthDate: {}", self.birth_date),
            ));
        }
        Ok(())
    }
}

fn birth_year(birth_date: &str) -> Option<i32> {
    DateTime::parse_from_rfc3339(birth_date)
        .ok()
        .map(|instant| instant.year())
}

async fn list_students(State(db): State<Db>) -> Json<Vec<Student>> {
    let students = db.students.read().await;
    Json(students.values().cloned().collect())
}

async fn count_students(State(db): State<Db>) -> Json<usize> {
    Json(db.students.read().await.len())
}

async fn students_by_year(State(db): State<Db>) -> Json<Vec<YearCount>> {
    let students = db.students.read().await;
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for year in students.values().filter_map(|s| birth_year(&s.birth_date)) {
        *counts.entry(year).or_default() += 1;
    }
    Json(
        counts
            .into_iter()
            .map(|(annee, nbr_student)| YearCount { annee, nbr_student })
            .collect(),
    )
}

async fn create_student(
    State(db): State<Db>,
    Json(input): Json<StudentInput>,
) -> Result<(StatusCode, Json<Student>), (StatusCode, String)> {
    input.validate()?;
    let id = db.next_id.fetch_add(1, Ordering::Relaxed);
    let student = input.into_student(id);
    db.students.write().await.insert(id, student.clone());
    tracing::info!(id, "student created");
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, StatusCode> {
    let students = db.students.read().await;
    students.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<StudentInput>,
) -> Result<Json<Student>, (StatusCode, String)> {
    input.validate()?;
    let mut students = db.students.write().await;
    let slot = students
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("no student {id}")))?;
    *slot = input.into_student(id);
    Ok(Json(slot.clone()))
}

async fn delete_student(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut students = db.students.write().await;
    students.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}
