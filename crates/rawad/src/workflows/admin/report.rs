use chrono::NaiveDate;
use serde::Deserialize;

use crate::workflows::registration::domain::{Registration, Role, RoleDetails};

/// Filters applied to the registration list before export. All criteria
/// compose; an unset criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        let date = registration.created_at.date_naive();
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }

        if let Some(role) = self.role {
            if registration.role() != role {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !registration.full_name.to_lowercase().contains(&needle)
                && !registration.email.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

pub fn filter_registrations<'a>(
    registrations: &'a [Registration],
    filter: &ReportFilter,
) -> Vec<&'a Registration> {
    registrations
        .iter()
        .filter(|registration| filter.matches(registration))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("report produced invalid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub const CSV_HEADERS: [&str; 9] = [
    "Full Name",
    "Email",
    "Phone",
    "Role",
    "Specialization",
    "Years of Experience",
    "Reason",
    "Additional Notes",
    "Registered At",
];

/// Render the filtered registrations as CSV: one header row plus one row
/// per registration.
pub fn export_csv(registrations: &[&Registration]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for registration in registrations {
        let (specialization, years, reason) = match &registration.details {
            RoleDetails::Mentor {
                years_of_experience,
                specializations,
                ..
            } => (specializations.as_str(), years_of_experience.as_str(), ""),
            RoleDetails::Beneficiary {
                current_field,
                reason,
            } => (current_field.as_str(), "", reason.as_str()),
        };
        let registered_at = registration.created_at.format("%Y-%m-%d %H:%M").to_string();

        writer.write_record([
            registration.full_name.as_str(),
            registration.email.as_str(),
            registration.phone.as_str(),
            registration.role().label(),
            or_dash(specialization),
            or_dash(years),
            or_dash(reason),
            or_dash(&registration.additional_notes),
            registered_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ReportError::Csv(csv::Error::from(err.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
