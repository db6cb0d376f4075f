use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Registration, RegistrationDraft, RegistrationId, RegistrationStatus, Role, RoleDetails,
};

/// Fields of a registration the caller supplies; the backing store assigns
/// the identifier and creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cv_link: String,
    pub bio: String,
    pub additional_notes: String,
    pub status: RegistrationStatus,
    pub details: RoleDetails,
}

impl NewRegistration {
    /// Map a validated draft into the persisted shape: trimmed fields,
    /// lower-cased email, and detail fields for the matching role only.
    pub fn from_draft(draft: &RegistrationDraft, role: Role, cv_link: String) -> Self {
        let details = match role {
            Role::Beneficiary => RoleDetails::Beneficiary {
                current_field: draft.current_field.trim().to_string(),
                reason: draft.reason.trim().to_string(),
            },
            Role::Mentor => RoleDetails::Mentor {
                years_of_experience: draft.years_of_experience.trim().to_string(),
                specializations: draft.specializations.trim().to_string(),
                hr_experience: draft.hr_experience,
            },
        };

        Self {
            full_name: draft.full_name.trim().to_string(),
            email: draft.email.trim().to_lowercase(),
            phone: draft.phone.trim().to_string(),
            cv_link,
            bio: draft.bio.trim().to_string(),
            additional_notes: draft.additional_notes.trim().to_string(),
            status: RegistrationStatus::Pending,
            details,
        }
    }

    pub fn into_registration(self, id: RegistrationId, created_at: DateTime<Utc>) -> Registration {
        Registration {
            id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            cv_link: self.cv_link,
            bio: self.bio,
            additional_notes: self.additional_notes,
            status: self.status,
            created_at,
            details: self.details,
        }
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("registration not found")]
    NotFound,
    #[error("store rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Observer receiving the full ordered snapshot on every store change.
pub trait RegistrationObserver: Send + Sync {
    fn registrations_changed(&self, registrations: &[Registration]);
}

/// Handle identifying one active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Storage abstraction over the hosted document database so the pipeline
/// and the admin surface can be exercised in isolation.
pub trait RegistrationRepository: Send + Sync {
    /// Atomic single-document create; a failed call leaves no visible record.
    fn create(&self, registration: NewRegistration) -> Result<Registration, RepositoryError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<Registration>, RepositoryError>;
    fn delete(&self, id: &RegistrationId) -> Result<(), RepositoryError>;
    fn subscribe(&self, observer: Arc<dyn RegistrationObserver>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}
