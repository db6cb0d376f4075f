use mime::Mime;

use super::domain::{CvAttachment, RegistrationDraft, Role};

/// Hard upper bound for an attached CV, inclusive.
pub const MAX_CV_BYTES: u64 = 5 * 1024 * 1024;

/// Fields the intake form requires before a submission may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    FullName,
    Email,
    Phone,
    Role,
    CvFile,
    Bio,
    Specializations,
    YearsOfExperience,
    CurrentField,
    Reason,
}

impl RequiredField {
    pub const fn label(self) -> &'static str {
        match self {
            RequiredField::FullName => "full name",
            RequiredField::Email => "email address",
            RequiredField::Phone => "phone number",
            RequiredField::Role => "registration type",
            RequiredField::CvFile => "CV attachment",
            RequiredField::Bio => "bio",
            RequiredField::Specializations => "specializations",
            RequiredField::YearsOfExperience => "years of experience",
            RequiredField::CurrentField => "current field",
            RequiredField::Reason => "reason for registering",
        }
    }
}

/// List every required field the draft leaves blank. Role-dependent fields
/// are demanded only once the matching role has been chosen.
pub fn missing_required_fields(draft: &RegistrationDraft) -> Vec<RequiredField> {
    let mut missing = Vec::new();

    if draft.full_name.trim().is_empty() {
        missing.push(RequiredField::FullName);
    }
    if draft.email.trim().is_empty() {
        missing.push(RequiredField::Email);
    }
    if draft.phone.trim().is_empty() {
        missing.push(RequiredField::Phone);
    }
    if draft.role.is_none() {
        missing.push(RequiredField::Role);
    }
    if draft.cv_file.is_none() {
        missing.push(RequiredField::CvFile);
    }

    match draft.role {
        Some(Role::Mentor) => {
            if draft.bio.trim().is_empty() {
                missing.push(RequiredField::Bio);
            }
            if draft.specializations.trim().is_empty() {
                missing.push(RequiredField::Specializations);
            }
            if draft.years_of_experience.trim().is_empty() {
                missing.push(RequiredField::YearsOfExperience);
            }
        }
        Some(Role::Beneficiary) => {
            if draft.current_field.trim().is_empty() {
                missing.push(RequiredField::CurrentField);
            }
            if draft.reason.trim().is_empty() {
                missing.push(RequiredField::Reason);
            }
        }
        None => {}
    }

    missing
}

/// `local@domain.tld` shape, case-insensitive: no whitespace, exactly one
/// `@`, a dotted domain, and an alphabetic TLD of at least two characters.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if host.is_empty() {
        return false;
    }

    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Local mobile numbering convention: exactly 10 digits, leading `05`.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    phone.len() == 10 && phone.starts_with("05") && phone.chars().all(|c| c.is_ascii_digit())
}

/// Constraint violations for an attached CV.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CvFileError {
    #[error("the CV must be a PDF document, not {found}")]
    NotPdf { found: String },
    #[error("the CV must be 5 MiB or smaller ({size_bytes} bytes attached)")]
    TooLarge { size_bytes: u64 },
}

/// The attachment must be `application/pdf` and at most [`MAX_CV_BYTES`]
/// (inclusive at the boundary).
pub fn validate_cv_file(file: &CvAttachment) -> Result<(), CvFileError> {
    let mime: Mime = file.mime_type.parse().map_err(|_| CvFileError::NotPdf {
        found: file.mime_type.clone(),
    })?;
    if mime.essence_str() != mime::APPLICATION_PDF.essence_str() {
        return Err(CvFileError::NotPdf {
            found: mime.essence_str().to_string(),
        });
    }

    if file.size_bytes() > MAX_CV_BYTES {
        return Err(CvFileError::TooLarge {
            size_bytes: file.size_bytes(),
        });
    }

    Ok(())
}
