use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the backing store when a registration is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

/// The two roles a registrant may choose during intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Beneficiary,
    Mentor,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Beneficiary => "beneficiary",
            Role::Mentor => "mentor",
        }
    }
}

/// CV file held locally until the pipeline moves it to durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl CvAttachment {
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// In-progress form data owned by the wizard while the registrant works
/// through the steps. Role-dependent fields stay blank until the matching
/// role is chosen; nothing here is persisted until the pipeline succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub current_field: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub years_of_experience: String,
    #[serde(default)]
    pub specializations: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub hr_experience: bool,
    #[serde(default)]
    pub cv_file: Option<CvAttachment>,
    #[serde(default)]
    pub additional_notes: String,
}

/// Role-conditional detail block; only the fields for the chosen role exist
/// on a persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDetails {
    Beneficiary {
        current_field: String,
        reason: String,
    },
    Mentor {
        years_of_experience: String,
        specializations: String,
        hr_experience: bool,
    },
}

impl RoleDetails {
    pub const fn role(&self) -> Role {
        match self {
            RoleDetails::Beneficiary { .. } => Role::Beneficiary,
            RoleDetails::Mentor { .. } => Role::Mentor,
        }
    }
}

/// Every record this pipeline writes starts out pending review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
        }
    }
}

/// The immutable persisted record of a completed signup. Owned by the
/// backing store once written; the admin surface reads it, never edits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cv_link: String,
    pub bio: String,
    pub additional_notes: String,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub details: RoleDetails,
}

impl Registration {
    pub const fn role(&self) -> Role {
        self.details.role()
    }
}
