use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use rawad::workflows::admin::{AdminCredentials, CredentialStore, CredentialStoreError};
use rawad::workflows::registration::{
    CvAttachment, FileStore, NewRegistration, Registration, RegistrationId, RegistrationObserver,
    RegistrationRepository, RepositoryError, StoragePath, SubscriptionId, UploadError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local registration store standing in for the hosted document
/// database. Records live newest first; observers get the full snapshot on
/// every change.
#[derive(Default)]
pub(crate) struct InMemoryRegistrationStore {
    records: Mutex<Vec<Registration>>,
    observers: Mutex<HashMap<u64, Arc<dyn RegistrationObserver>>>,
    next_subscription: AtomicU64,
    sequence: AtomicU64,
}

impl InMemoryRegistrationStore {
    fn snapshot(&self) -> Vec<Registration> {
        self.records.lock().expect("record mutex poisoned").clone()
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let observers: Vec<_> = self
            .observers
            .lock()
            .expect("observer mutex poisoned")
            .values()
            .cloned()
            .collect();
        for observer in observers {
            observer.registrations_changed(&snapshot);
        }
    }
}

impl RegistrationRepository for InMemoryRegistrationStore {
    fn create(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
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
        Ok(self.snapshot())
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

/// Process-local object store standing in for the hosted storage service.
/// Keeps uploaded bytes so resolved URLs stay meaningful for the lifetime
/// of the process.
#[derive(Default)]
pub(crate) struct InMemoryFileStore {
    objects: Mutex<HashMap<String, u64>>,
}

impl InMemoryFileStore {
    fn url_for(path: &StoragePath) -> String {
        format!("https://storage.rawad.example/{}", path.as_str())
    }
}

impl FileStore for InMemoryFileStore {
    fn upload(
        &self,
        file: &CvAttachment,
        destination: &StoragePath,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<String, UploadError> {
        on_progress(0);
        self.objects
            .lock()
            .expect("object mutex poisoned")
            .insert(destination.as_str().to_string(), file.size_bytes());
        on_progress(100);
        Ok(Self::url_for(destination))
    }

    fn resolve_public_url(&self, destination: &StoragePath) -> Result<String, UploadError> {
        let objects = self.objects.lock().expect("object mutex poisoned");
        if objects.contains_key(destination.as_str()) {
            Ok(Self::url_for(destination))
        } else {
            Err(UploadError::Network(format!(
                "no stored object at {}",
                destination.as_str()
            )))
        }
    }
}

/// Process-local credential document standing in for the hosted store.
#[derive(Default)]
pub(crate) struct InMemoryCredentialStore {
    document: Mutex<Option<AdminCredentials>>,
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<AdminCredentials>, CredentialStoreError> {
        Ok(self
            .document
            .lock()
            .expect("credential mutex poisoned")
            .clone())
    }

    fn save(&self, credentials: AdminCredentials) -> Result<(), CredentialStoreError> {
        *self.document.lock().expect("credential mutex poisoned") = Some(credentials);
        Ok(())
    }
}
