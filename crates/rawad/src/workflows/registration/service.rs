use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use super::domain::{CvAttachment, Registration, RegistrationDraft, Role};
use super::repository::{NewRegistration, RegistrationRepository, RepositoryError};
use super::storage::{FileStore, StoragePath, UploadError};
use super::validation::{self, CvFileError, RequiredField};

/// Observable states of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Rejected,
    Uploading,
    Persisting,
    Succeeded,
    Failed,
}

impl SubmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Rejected => "rejected",
            SubmissionState::Uploading => "uploading",
            SubmissionState::Persisting => "persisting",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::Failed => "failed",
        }
    }
}

/// One entry in the finite event sequence a submission attempt emits:
/// progress updates followed by exactly one terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionUpdate {
    pub state: SubmissionState,
    pub progress_percent: Option<u8>,
    pub message: Option<String>,
}

impl SubmissionUpdate {
    fn state(state: SubmissionState) -> Self {
        Self {
            state,
            progress_percent: None,
            message: None,
        }
    }

    fn progress(state: SubmissionState, percent: u8) -> Self {
        Self {
            state,
            progress_percent: Some(percent),
            message: None,
        }
    }

    fn message(state: SubmissionState, message: String) -> Self {
        Self {
            state,
            progress_percent: None,
            message: Some(message),
        }
    }
}

/// Receives every state transition and progress event of an attempt.
pub trait SubmissionListener: Send + Sync {
    fn update(&self, update: SubmissionUpdate);
}

/// Listener for callers that only care about the final result.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardUpdates;

impl SubmissionListener for DiscardUpdates {
    fn update(&self, _update: SubmissionUpdate) {}
}

/// User-correctable refusal; the draft stays intact so the registrant can
/// fix the offending fields and resubmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    MissingFields(Vec<RequiredField>),
    InvalidEmail,
    InvalidPhone,
    CvFile(CvFileError),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingFields(fields) => {
                let labels: Vec<&str> = fields.iter().map(|field| field.label()).collect();
                write!(f, "please fill in the following: {}", labels.join(", "))
            }
            RejectionReason::InvalidEmail => write!(f, "the email address format is invalid"),
            RejectionReason::InvalidPhone => {
                write!(f, "the phone number must be 10 digits starting with 05")
            }
            RejectionReason::CvFile(err) => err.fmt(f),
        }
    }
}

/// Error raised by a submission attempt.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Rejected(RejectionReason),
    #[error("CV upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("saving the registration failed: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Sequences validation, file transfer, and record creation for one
/// submission attempt.
///
/// Stateless across attempts; two concurrent wizards get independent
/// attempts with no shared mutable state. Every transition is surfaced
/// through the listener, and the upload always completes (or fails) before
/// the record write begins, so a persisted record's `cv_link` always
/// resolves.
pub struct SubmissionPipeline<S, R> {
    files: Arc<S>,
    repository: Arc<R>,
}

impl<S, R> SubmissionPipeline<S, R>
where
    S: FileStore + 'static,
    R: RegistrationRepository + 'static,
{
    pub fn new(files: Arc<S>, repository: Arc<R>) -> Self {
        Self { files, repository }
    }

    /// Run one attempt to completion. No step retries silently; a failed
    /// record write after a successful upload leaves the uploaded object in
    /// place.
    pub fn submit(
        &self,
        draft: &RegistrationDraft,
        listener: &dyn SubmissionListener,
    ) -> Result<Registration, SubmissionError> {
        listener.update(SubmissionUpdate::state(SubmissionState::Validating));

        let (role, cv_file) = match validate_draft(draft) {
            Ok(validated) => validated,
            Err(reason) => {
                listener.update(SubmissionUpdate::message(
                    SubmissionState::Rejected,
                    reason.to_string(),
                ));
                return Err(SubmissionError::Rejected(reason));
            }
        };

        let destination = StoragePath::for_cv(Utc::now(), &cv_file.file_name);
        listener.update(SubmissionUpdate::progress(SubmissionState::Uploading, 0));

        let mut last_percent = 0u8;
        let upload_result = {
            let mut forward = |percent: u8| {
                let percent = percent.min(100);
                if percent > last_percent {
                    last_percent = percent;
                    listener.update(SubmissionUpdate::progress(
                        SubmissionState::Uploading,
                        percent,
                    ));
                }
            };
            self.files.upload(cv_file, &destination, &mut forward)
        };

        let cv_link = match upload_result {
            Ok(url) => url,
            Err(err) => {
                let err = SubmissionError::from(err);
                listener.update(SubmissionUpdate::message(
                    SubmissionState::Failed,
                    err.to_string(),
                ));
                return Err(err);
            }
        };
        if last_percent < 100 {
            listener.update(SubmissionUpdate::progress(SubmissionState::Uploading, 100));
        }

        listener.update(SubmissionUpdate::state(SubmissionState::Persisting));
        let record = NewRegistration::from_draft(draft, role, cv_link);

        match self.repository.create(record) {
            Ok(stored) => {
                listener.update(SubmissionUpdate::state(SubmissionState::Succeeded));
                Ok(stored)
            }
            Err(err) => {
                let err = SubmissionError::from(err);
                listener.update(SubmissionUpdate::message(
                    SubmissionState::Failed,
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }
}

/// Fixed validation order: required fields, then email format, then phone
/// format, then CV constraints. The first failing check wins so a draft
/// missing fields never surfaces a format error for a field the registrant
/// has not filled in yet.
fn validate_draft(draft: &RegistrationDraft) -> Result<(Role, &CvAttachment), RejectionReason> {
    let missing = validation::missing_required_fields(draft);
    if !missing.is_empty() {
        return Err(RejectionReason::MissingFields(missing));
    }

    if !validation::is_valid_email(&draft.email) {
        return Err(RejectionReason::InvalidEmail);
    }
    if !validation::is_valid_phone(&draft.phone) {
        return Err(RejectionReason::InvalidPhone);
    }

    let Some(cv_file) = &draft.cv_file else {
        return Err(RejectionReason::MissingFields(vec![RequiredField::CvFile]));
    };
    validation::validate_cv_file(cv_file).map_err(RejectionReason::CvFile)?;

    let Some(role) = draft.role else {
        return Err(RejectionReason::MissingFields(vec![RequiredField::Role]));
    };

    Ok((role, cv_file))
}
