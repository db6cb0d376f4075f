use chrono::{DateTime, Utc};

use super::domain::CvAttachment;

mod drive;

pub use drive::GoogleDriveStore;

/// Destination key for one uploaded object. Derived fresh per submission
/// attempt so a retry never overwrites an earlier upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// `cv_uploads/<millis>_<sanitized file name>`.
    pub fn for_cv(submitted_at: DateTime<Utc>, file_name: &str) -> Self {
        StoragePath(format!(
            "cv_uploads/{}_{}",
            submitted_at.timestamp_millis(),
            sanitize_file_name(file_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Collapse whitespace runs to `_` and keep only ASCII alphanumerics, `.`,
/// and `_`.
fn sanitize_file_name(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                sanitized.push(c);
            }
        }
    }
    sanitized
}

/// Transport failure taxonomy for the object store. A failed transfer never
/// yields a URL.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("storage transport failure: {0}")]
    Network(String),
    #[error("storage rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("storage quota exhausted: {0}")]
    QuotaExceeded(String),
}

/// Moves exactly one file to durable storage and resolves a stable,
/// publicly fetchable URL.
///
/// Progress callbacks carry percentages in [0, 100]; callers may receive
/// zero of them, and completion implies 100 whether or not it was reported.
pub trait FileStore: Send + Sync {
    fn upload(
        &self,
        file: &CvAttachment,
        destination: &StoragePath,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, UploadError>;

    fn resolve_public_url(&self, destination: &StoragePath) -> Result<String, UploadError>;
}
