use std::time::Duration;

use super::domain::{Registration, RegistrationDraft};
use super::repository::RegistrationRepository;
use super::service::{SubmissionError, SubmissionListener, SubmissionPipeline, SubmissionState};
use super::storage::FileStore;

/// How long the confirmation stays visible before the caller is expected to
/// `reset` the wizard to a blank draft.
pub const CONFIRMATION_RESET_DELAY: Duration = Duration::from_secs(5);

/// Steps of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    RoleSelection,
    Details,
    Confirmation,
}

impl WizardStep {
    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::RoleSelection => "role selection",
            WizardStep::Details => "details",
            WizardStep::Confirmation => "confirmation",
        }
    }
}

/// Error raised by the wizard shell.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("choose a registration type before continuing")]
    RoleRequired,
    #[error("a submission is already being processed")]
    SubmissionInFlight,
    #[error("this registration was already submitted")]
    AlreadyCompleted,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// UI-facing controller: owns the draft exclusively across steps and
/// triggers the submission pipeline at most once per completed form.
///
/// Only one attempt may be in flight per wizard instance; `submit` refuses
/// re-entry until the prior attempt ended in rejection or failure, and
/// refuses entirely once an attempt succeeded (until `reset`).
pub struct RegistrationWizard<S, R> {
    pipeline: SubmissionPipeline<S, R>,
    draft: RegistrationDraft,
    step: WizardStep,
    state: SubmissionState,
}

impl<S, R> RegistrationWizard<S, R>
where
    S: FileStore + 'static,
    R: RegistrationRepository + 'static,
{
    pub fn new(pipeline: SubmissionPipeline<S, R>) -> Self {
        Self {
            pipeline,
            draft: RegistrationDraft::default(),
            step: WizardStep::RoleSelection,
            state: SubmissionState::Idle,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RegistrationDraft {
        &mut self.draft
    }

    /// Move forward one step. Leaving role selection requires a chosen role;
    /// the confirmation step is reached through `submit`, never `advance`.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::RoleSelection {
            if self.draft.role.is_none() {
                return Err(WizardError::RoleRequired);
            }
            self.step = WizardStep::Details;
        }
        Ok(self.step)
    }

    /// Move back one step without losing entered data.
    pub fn back(&mut self) -> WizardStep {
        if self.step == WizardStep::Details {
            self.step = WizardStep::RoleSelection;
        }
        self.step
    }

    /// Run the pipeline for the current draft. Rejection and failure leave
    /// the draft intact; success moves to the confirmation step.
    pub fn submit(
        &mut self,
        listener: &dyn SubmissionListener,
    ) -> Result<Registration, WizardError> {
        match self.state {
            SubmissionState::Validating
            | SubmissionState::Uploading
            | SubmissionState::Persisting => return Err(WizardError::SubmissionInFlight),
            SubmissionState::Succeeded => return Err(WizardError::AlreadyCompleted),
            SubmissionState::Idle | SubmissionState::Rejected | SubmissionState::Failed => {}
        }

        self.state = SubmissionState::Validating;
        let outcome = self.pipeline.submit(&self.draft, listener);
        match &outcome {
            Ok(_) => {
                self.state = SubmissionState::Succeeded;
                self.step = WizardStep::Confirmation;
            }
            Err(SubmissionError::Rejected(_)) => self.state = SubmissionState::Rejected,
            Err(_) => self.state = SubmissionState::Failed,
        }

        outcome.map_err(WizardError::from)
    }

    /// Restore a blank draft at the first step, once the confirmation has
    /// been displayed for [`CONFIRMATION_RESET_DELAY`].
    pub fn reset(&mut self) {
        self.draft = RegistrationDraft::default();
        self.step = WizardStep::RoleSelection;
        self.state = SubmissionState::Idle;
    }
}
