use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::workflows::registration::domain::{
    CvAttachment, Registration, RegistrationDraft, RegistrationId, Role,
};
use crate::workflows::registration::repository::{
    NewRegistration, RegistrationObserver, RegistrationRepository, RepositoryError,
    SubscriptionId,
};
use crate::workflows::registration::service::{
    SubmissionListener, SubmissionPipeline, SubmissionState, SubmissionUpdate,
};
use crate::workflows::registration::storage::{FileStore, StoragePath, UploadError};

pub(super) fn pdf_attachment(name: &str, size_bytes: usize) -> CvAttachment {
    CvAttachment {
        file_name: name.to_string(),
        mime_type: "application/pdf".to_string(),
        content: vec![0u8; size_bytes],
    }
}

pub(super) fn beneficiary_draft() -> RegistrationDraft {
    RegistrationDraft {
        role: Some(Role::Beneficiary),
        full_name: "Ahmed Ali".to_string(),
        email: "ahmed@example.com".to_string(),
        phone: "0512345678".to_string(),
        current_field: "طالب".to_string(),
        reason: "توجيه مهني عام".to_string(),
        cv_file: Some(pdf_attachment("cv ahmed.pdf", 2 * 1024 * 1024)),
        ..RegistrationDraft::default()
    }
}

pub(super) fn mentor_draft() -> RegistrationDraft {
    RegistrationDraft {
        role: Some(Role::Mentor),
        full_name: "Sara Al-Qahtani".to_string(),
        email: "sara@example.com".to_string(),
        phone: "0598765432".to_string(),
        years_of_experience: "8".to_string(),
        specializations: "Software Engineering, Career Coaching".to_string(),
        bio: "Engineering lead mentoring early-career developers.".to_string(),
        hr_experience: true,
        cv_file: Some(pdf_attachment("sara-cv.pdf", 512 * 1024)),
        additional_notes: "Available on weekends.".to_string(),
        ..RegistrationDraft::default()
    }
}

#[derive(Default)]
pub(super) struct MemoryFileStore {
    uploads: Mutex<Vec<String>>,
    progress_script: Vec<u8>,
    fail: bool,
}

impl MemoryFileStore {
    pub(super) fn with_progress(progress_script: Vec<u8>) -> Self {
        Self {
            progress_script,
            ..Self::default()
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn uploaded_paths(&self) -> Vec<String> {
        self.uploads.lock().expect("upload mutex poisoned").clone()
    }
}

impl FileStore for MemoryFileStore {
    fn upload(
        &self,
        _file: &CvAttachment,
        destination: &StoragePath,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Network("connection reset".to_string()));
        }
        for percent in &self.progress_script {
            on_progress(*percent);
        }
        self.uploads
            .lock()
            .expect("upload mutex poisoned")
            .push(destination.as_str().to_string());
        Ok(format!("https://files.rawad.example/{}", destination.as_str()))
    }

    fn resolve_public_url(&self, destination: &StoragePath) -> Result<String, UploadError> {
        Ok(format!("https://files.rawad.example/{}", destination.as_str()))
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<Registration>>,
    observers: Mutex<HashMap<u64, Arc<dyn RegistrationObserver>>>,
    next_subscription: AtomicU64,
    sequence: AtomicU64,
    fail: bool,
}

impl MemoryRepository {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn stored(&self) -> Vec<Registration> {
        self.records.lock().expect("record mutex poisoned").clone()
    }

    fn notify(&self) {
        let snapshot = self.stored();
        let observers = self
            .observers
            .lock()
            .expect("observer mutex poisoned")
            .values()
            .cloned()
            .collect::<Vec<_>>();
        for observer in observers {
            observer.registrations_changed(&snapshot);
        }
    }
}

impl RegistrationRepository for MemoryRepository {
    fn create(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = registration
            .into_registration(RegistrationId(format!("reg-{sequence:06}")), Utc::now());
        self.records
            .lock()
            .expect("record mutex poisoned")
            .insert(0, stored.clone());
        self.notify();
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<Registration>, RepositoryError> {
        Ok(self.stored())
    }

    fn delete(&self, id: &RegistrationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        drop(guard);
        self.notify();
        Ok(())
    }

    fn subscribe(&self, observer: Arc<dyn RegistrationObserver>) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.observers
            .lock()
            .expect("observer mutex poisoned")
            .insert(id, observer);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.observers
            .lock()
            .expect("observer mutex poisoned")
            .remove(&id.0);
    }
}

#[derive(Default)]
pub(super) struct RecordingListener {
    updates: Mutex<Vec<SubmissionUpdate>>,
}

impl RecordingListener {
    pub(super) fn updates(&self) -> Vec<SubmissionUpdate> {
        self.updates.lock().expect("listener mutex poisoned").clone()
    }

    pub(super) fn states(&self) -> Vec<SubmissionState> {
        self.updates().into_iter().map(|update| update.state).collect()
    }
}

impl SubmissionListener for RecordingListener {
    fn update(&self, update: SubmissionUpdate) {
        self.updates
            .lock()
            .expect("listener mutex poisoned")
            .push(update);
    }
}

pub(super) fn build_pipeline() -> (
    SubmissionPipeline<MemoryFileStore, MemoryRepository>,
    Arc<MemoryFileStore>,
    Arc<MemoryRepository>,
) {
    let files = Arc::new(MemoryFileStore::with_progress(vec![25, 60, 100]));
    let repository = Arc::new(MemoryRepository::default());
    let pipeline = SubmissionPipeline::new(files.clone(), repository.clone());
    (pipeline, files, repository)
}
