use std::io::Cursor;

use google_drive3::{api::File, api::Scope, DriveHub, Error as DriveError};
use tokio::runtime::Runtime;

use super::{FileStore, StoragePath, UploadError};
use crate::workflows::registration::domain::CvAttachment;

/// Thin wrapper around the generated google-drive3 client allowing the
/// synchronous submission pipeline to interact with Drive without exposing
/// async details.
pub struct GoogleDriveStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    runtime: Runtime,
    folder_id: Option<String>,
}

impl<C> GoogleDriveStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, runtime: Runtime, folder_id: Option<String>) -> Self {
        Self {
            hub,
            runtime,
            folder_id,
        }
    }

    pub fn with_runtime(hub: DriveHub<C>, folder_id: Option<String>) -> Result<Self, UploadError> {
        let runtime = Runtime::new().map_err(|err| UploadError::Network(err.to_string()))?;
        Ok(Self::new(hub, runtime, folder_id))
    }

    fn classify(err: DriveError) -> UploadError {
        match err {
            DriveError::MissingAPIKey => {
                UploadError::Unauthorized("no API key configured".to_string())
            }
            DriveError::MissingToken(source) => UploadError::Unauthorized(source.to_string()),
            DriveError::UploadSizeLimitExceeded(size, limit) => UploadError::QuotaExceeded(
                format!("object of {size} bytes exceeds the {limit} byte limit"),
            ),
            DriveError::Failure(response) => {
                let status = response.status();
                if status.as_u16() == 401 || status.as_u16() == 403 {
                    UploadError::Unauthorized(format!("storage returned {status}"))
                } else {
                    UploadError::Network(format!("storage returned {status}"))
                }
            }
            other => UploadError::Network(other.to_string()),
        }
    }
}

impl<C> std::fmt::Debug for GoogleDriveStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveStore").finish_non_exhaustive()
    }
}

impl<C> FileStore for GoogleDriveStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn upload(
        &self,
        file: &CvAttachment,
        destination: &StoragePath,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, UploadError> {
        let metadata = File {
            name: Some(destination.as_str().to_string()),
            parents: self.folder_id.clone().map(|parent| vec![parent]),
            ..File::default()
        };

        let media_type = file
            .mime_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::APPLICATION_PDF);
        let content = Cursor::new(file.content.clone());

        // The generated client surfaces no intermediate transfer events, so
        // progress is reported at the start and end of the transfer only.
        on_progress(0);

        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .create(metadata)
                .param("fields", "id,webViewLink,webContentLink")
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .upload(content, media_type)
                .await
        });

        let (_, created) = result.map_err(Self::classify)?;
        on_progress(100);

        Ok(created
            .web_view_link
            .or(created.web_content_link)
            .unwrap_or_else(|| {
                format!(
                    "https://drive.google.com/file/d/{}/view",
                    created.id.unwrap_or_default()
                )
            }))
    }

    fn resolve_public_url(&self, destination: &StoragePath) -> Result<String, UploadError> {
        let query = format!("name = '{}' and trashed = false", destination.as_str());
        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .list()
                .q(&query)
                .param("fields", "files(id,webViewLink)")
                .page_size(1)
                .include_items_from_all_drives(true)
                .supports_all_drives(true)
                .add_scope(Scope::Readonly)
                .doit()
                .await
        });

        let (_, file_list) = result.map_err(Self::classify)?;
        let files = file_list.files.unwrap_or_default();
        files
            .into_iter()
            .next()
            .and_then(|file| {
                file.web_view_link.or_else(|| {
                    file.id
                        .map(|id| format!("https://drive.google.com/file/d/{id}/view"))
                })
            })
            .ok_or_else(|| {
                UploadError::Network(format!("no stored object at {}", destination.as_str()))
            })
    }
}
