//! Registration intake: draft validation, CV transfer to object storage,
//! record persistence, and the wizard shell driving one submission attempt
//! at a time.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    CvAttachment, Registration, RegistrationDraft, RegistrationId, RegistrationStatus, Role,
    RoleDetails,
};
pub use repository::{
    NewRegistration, RegistrationObserver, RegistrationRepository, RepositoryError,
    SubscriptionId,
};
pub use router::{registration_router, SubmissionReceipt};
pub use service::{
    DiscardUpdates, RejectionReason, SubmissionError, SubmissionListener, SubmissionPipeline,
    SubmissionState, SubmissionUpdate,
};
pub use storage::{FileStore, GoogleDriveStore, StoragePath, UploadError};
pub use validation::{CvFileError, RequiredField, MAX_CV_BYTES};
pub use wizard::{RegistrationWizard, WizardError, WizardStep, CONFIRMATION_RESET_DELAY};
