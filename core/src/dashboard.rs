//! Dashboard controller: the source state, how it is refreshed, and the
//! create/edit/delete flows.
//!
//! # Design
//! Source state is a snapshot replaced wholesale by [`Dashboard::load`]; all
//! derived values come from [`pipeline::compute_view`]. The three reads of a
//! reload run concurrently on scoped threads and the snapshot is only swapped
//! once all of them have succeeded, so a failed reload leaves the previous
//! data on screen.

use std::thread;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::form::{FormError, FormMode, FormState, StudentForm};
use crate::pipeline::{self, DashboardView, ViewState, YearFilter};
use crate::transport::{StudentService, Transport};
use crate::types::{Student, StudentId, YearStat};

/// Notifications disappear this long after being raised.
pub const NOTIFICATION_TTL_MS: i64 = 4000;

/// Whether a reload shows the loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadMode {
    Visible,
    /// Keep the current data on screen and leave `loading` untouched.
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub tone: Tone,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at >= Duration::milliseconds(NOTIFICATION_TTL_MS)
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// A reload between [`Dashboard::begin_load`] and [`Dashboard::finish_load`].
#[derive(Debug)]
#[must_use]
pub struct PendingReload {
    mode: ReloadMode,
}

/// The three reads of one reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    students: Vec<Student>,
    count: Option<u64>,
    year_stats: Vec<YearStat>,
}

pub struct Dashboard<T> {
    service: StudentService<T>,
    students: Vec<Student>,
    count: Option<u64>,
    year_stats: Vec<YearStat>,
    last_synced_at: Option<DateTime<Utc>>,
    view: ViewState,
    loading: bool,
    error: Option<String>,
    form: FormState,
    notification: Option<Notification>,
}

impl<T: Transport> Dashboard<T> {
    pub fn new(service: StudentService<T>, page_size: usize) -> Self {
        Self {
            service,
            students: Vec::new(),
            count: None,
            year_stats: Vec::new(),
            last_synced_at: None,
            view: ViewState::new(page_size),
            loading: false,
            error: None,
            form: FormState::Idle,
            notification: None,
        }
    }

    pub fn service(&self) -> &StudentService<T> {
        &self.service
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn year_stats(&self) -> &[YearStat] {
        &self.year_stats
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The retryable error banner of the last failed reload.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// The current notification, unless it has expired.
    pub fn notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.set_search_term(term);
    }

    pub fn set_year_filter(&mut self, filter: YearFilter) {
        self.view.set_year_filter(filter);
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.set_page(page);
    }

    pub fn view(&self) -> DashboardView {
        self.view_at(Utc::now())
    }

    pub fn view_at(&self, now: DateTime<Utc>) -> DashboardView {
        pipeline::compute_view(&self.students, self.count, &self.year_stats, &self.view, now)
    }

    /// Refresh all source state. Nothing is replaced unless every read succeeds.
    /// Run a whole reload: [`begin_load`](Self::begin_load), the three reads,
    /// then [`finish_load`](Self::finish_load).
    pub fn load(&mut self, mode: ReloadMode) -> Result<(), ApiError> {
        let pending = self.begin_load(mode);
        let result = self.fetch_snapshot();
        self.finish_load(pending, result)
    }

    /// Start a reload. A visible reload raises `loading` until the matching
    /// `finish_load`; a silent one leaves it as it was.
    pub fn begin_load(&mut self, mode: ReloadMode) -> PendingReload {
        if mode == ReloadMode::Visible {
            self.loading = true;
        }
        self.error = None;
        PendingReload { mode }
    }

    /// The three reads of a reload, run concurrently. Source state is not
    /// touched, so hosts may run this off the UI thread.
    pub fn fetch_snapshot(&self) -> Result<Snapshot, ApiError> {
        let service = &self.service;
        thread::scope(|scope| {
            let students = scope.spawn(|| service.try_fetch_all());
            let count = scope.spawn(|| service.try_fetch_count());
            let year_stats = service.try_fetch_by_year();
            let students = join(students.join());
            let count = join(count.join());
            Ok(Snapshot {
                students: students?,
                count: count?,
                year_stats: year_stats?,
            })
        })
    }

    /// Commit the snapshot, or keep the previous one and raise the error banner.
    pub fn finish_load(
        &mut self,
        pending: PendingReload,
        result: Result<Snapshot, ApiError>,
    ) -> Result<(), ApiError> {
        if pending.mode == ReloadMode::Visible {
            self.loading = false;
        }
        let silent = pending.mode == ReloadMode::Silent;
        match result {
            Ok(snapshot) => {
                info!(
                    students = snapshot.students.len(),
                    count = ?snapshot.count,
                    years = snapshot.year_stats.len(),
                    silent,
                    "roster reloaded"
                );
                self.students = snapshot.students;
                self.count = snapshot.count;
                self.year_stats = snapshot.year_stats;
                self.last_synced_at = Some(Utc::now());
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "roster reload failed");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// The loaded student whose id matches `id`, whichever form either id takes.
    pub fn find_student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|student| student.id.as_ref() == Some(id))
    }

    pub fn open_create_form(&mut self) {
        self.form = FormState::open(None);
    }

    pub fn open_edit_form(&mut self, student: &Student) {
        self.form = FormState::open(Some(student));
    }

    pub fn close_form(&mut self) {
        self.form.close();
    }

    /// Edit the values of the open form.
    pub fn form_values_mut(&mut self) -> Option<&mut StudentForm> {
        self.form.as_open_mut().map(|form| &mut form.values)
    }

    /// Validate, send, silently reload and close the form.
    ///
    /// Field errors stay inline on the form. A write failure raises a danger
    /// notification and leaves the form open for another attempt.
    pub fn submit_form(&mut self) -> Result<Student, DashboardError> {
        let (mode, payload) = match self.form.begin_submit() {
            Ok(submission) => submission,
            Err(err @ FormError::InvalidBirthDate) => {
                self.notify(err.to_string(), Tone::Danger);
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let result = match &mode {
            FormMode::Create => self.service.create(&payload),
            FormMode::Edit(id) => self.service.update(Some(id), &payload),
        };
        let saved = match result {
            Ok(saved) => saved,
            Err(err) => {
                self.notify(err.to_string(), Tone::Danger);
                self.form.submit_failed();
                return Err(err.into());
            }
        };

        let message = match mode {
            FormMode::Create => "New student added to the system",
            FormMode::Edit(_) => "Student profile updated",
        };
        self.notify(message, Tone::Success);
        // A failed reload shows up in the error banner; the write itself succeeded.
        let _ = self.load(ReloadMode::Silent);
        self.form.close();
        Ok(saved)
    }

    /// Remove a student after `confirm` agrees.
    pub fn delete_student(
        &mut self,
        student: &Student,
        confirm: impl FnOnce(&Student) -> bool,
    ) -> Result<DeleteOutcome, DashboardError> {
        let Some(id) = student.usable_id() else {
            self.notify("Unable to delete student without ID", Tone::Danger);
            return Err(ApiError::MissingId.into());
        };
        if !confirm(student) {
            return Ok(DeleteOutcome::Cancelled);
        }
        if let Err(err) = self.service.delete(Some(id)) {
            self.notify(err.to_string(), Tone::Danger);
            return Err(err.into());
        }
        let _ = self.load(ReloadMode::Silent);
        self.notify("Student successfully removed", Tone::Info);
        Ok(DeleteOutcome::Deleted)
    }

    fn notify(&mut self, message: impl Into<String>, tone: Tone) {
        self.notification = Some(Notification {
            message: message.into(),
            tone,
            raised_at: Utc::now(),
        });
    }
}

fn join<R>(joined: thread::Result<Result<R, ApiError>>) -> Result<R, ApiError> {
    joined.unwrap_or_else(|_| Err(ApiError::Transport("request thread panicked".to_string())))
}
