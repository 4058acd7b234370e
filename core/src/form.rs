//! Create/edit form state and validation.

use thiserror::Error;

use crate::dates;
use crate::types::{Student, StudentId, StudentPayload};

pub const INVALID_BIRTH_DATE: &str = "Invalid birth date. Please use the YYYY-MM-DD format.";

/// Raw form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub fname: String,
    pub lname: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
}

impl StudentForm {
    pub fn new(fname: impl Into<String>, lname: impl Into<String>, birth_date: impl Into<String>) -> Self {
        Self {
            fname: fname.into(),
            lname: lname.into(),
            birth_date: birth_date.into(),
        }
    }

    /// Prefill from an existing record.
    pub fn from_student(student: &Student) -> Self {
        Self {
            fname: student.fname.clone(),
            lname: student.lname.clone(),
            birth_date: student
                .birth_date
                .as_deref()
                .map(dates::to_input_date)
                .unwrap_or_default(),
        }
    }

    /// Per-field required checks. Names are checked after trimming.
    pub fn validate(&self) -> FieldErrors {
        FieldErrors {
            fname: self
                .fname
                .trim()
                .is_empty()
                .then_some("First name is required"),
            lname: self
                .lname
                .trim()
                .is_empty()
                .then_some("Last name is required"),
            birth_date: self
                .birth_date
                .is_empty()
                .then_some("Birth date is required"),
        }
    }

    /// Build the request payload from an already validated form.
    pub fn to_payload(&self) -> Result<StudentPayload, FormError> {
        let birth_date = dates::to_iso_date_time(&self.birth_date).ok_or(FormError::InvalidBirthDate)?;
        Ok(StudentPayload {
            fname: self.fname.trim().to_string(),
            lname: self.lname.trim().to_string(),
            birth_date,
        })
    }
}

/// Inline messages, one slot per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub fname: Option<&'static str>,
    pub lname: Option<&'static str>,
    pub birth_date: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.fname.is_none() && self.lname.is_none() && self.birth_date.is_none()
    }

    pub fn messages(&self) -> impl Iterator<Item = &'static str> {
        [self.fname, self.lname, self.birth_date].into_iter().flatten()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no form is open")]
    NotOpen,
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("form has invalid fields")]
    Invalid(FieldErrors),
    #[error("Invalid birth date. Please use the YYYY-MM-DD format.")]
    InvalidBirthDate,
}

/// Whether the open form creates a record or edits one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(StudentId),
}

/// An open form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenForm {
    pub mode: FormMode,
    pub values: StudentForm,
    pub errors: FieldErrors,
    pub submitting: bool,
}

impl OpenForm {
    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }
}

/// Lifecycle of the create/edit form: idle, or open (possibly submitting).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    Open(OpenForm),
}

impl FormState {
    /// Open a blank form, or a prefilled one when `student` has an id.
    pub fn open(student: Option<&Student>) -> Self {
        let (mode, values) = match student {
            Some(student) => {
                let mode = student
                    .usable_id()
                    .cloned()
                    .map(FormMode::Edit)
                    .unwrap_or(FormMode::Create);
                (mode, StudentForm::from_student(student))
            }
            None => (FormMode::Create, StudentForm::default()),
        };
        FormState::Open(OpenForm {
            mode,
            values,
            errors: FieldErrors::default(),
            submitting: false,
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, FormState::Open(_))
    }

    pub fn as_open(&self) -> Option<&OpenForm> {
        match self {
            FormState::Open(form) => Some(form),
            FormState::Idle => None,
        }
    }

    pub fn as_open_mut(&mut self) -> Option<&mut OpenForm> {
        match self {
            FormState::Open(form) => Some(form),
            FormState::Idle => None,
        }
    }

    /// Validate and enter the submitting state. Returns what to send.
    pub fn begin_submit(&mut self) -> Result<(FormMode, StudentPayload), FormError> {
        let form = self.as_open_mut().ok_or(FormError::NotOpen)?;
        if form.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        form.errors = form.values.validate();
        if !form.errors.is_empty() {
            return Err(FormError::Invalid(form.errors));
        }
        let payload = form.values.to_payload()?;
        form.submitting = true;
        Ok((form.mode.clone(), payload))
    }

    /// Leave the submitting state after a failed write so the user can retry.
    pub fn submit_failed(&mut self) {
        if let Some(form) = self.as_open_mut() {
            form.submitting = false;
        }
    }

    pub fn close(&mut self) {
        *self = FormState::Idle;
    }
}
