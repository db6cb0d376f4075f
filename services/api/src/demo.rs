use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use rawad::error::AppError;
use rawad::workflows::admin::{self, AdminAuthenticator};
use rawad::workflows::registration::{
    CvAttachment, Registration, RegistrationDraft, RegistrationObserver, RegistrationRepository,
    RegistrationWizard, Role, SubmissionListener, SubmissionPipeline, SubmissionUpdate,
};

use crate::infra::{InMemoryCredentialStore, InMemoryFileStore, InMemoryRegistrationStore};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the admin back-office portion of the demo.
    #[arg(long)]
    pub(crate) skip_admin: bool,
}

struct PrintingListener;

impl SubmissionListener for PrintingListener {
    fn update(&self, update: SubmissionUpdate) {
        match (update.progress_percent, update.message) {
            (Some(percent), _) => println!("  [{}] {percent}%", update.state.label()),
            (None, Some(message)) => println!("  [{}] {message}", update.state.label()),
            (None, None) => println!("  [{}]", update.state.label()),
        }
    }
}

struct CountObserver;

impl RegistrationObserver for CountObserver {
    fn registrations_changed(&self, registrations: &[Registration]) {
        println!("  store now holds {} registration(s)", registrations.len());
    }
}

fn sample_beneficiary() -> RegistrationDraft {
    RegistrationDraft {
        role: Some(Role::Beneficiary),
        full_name: "Ahmed Ali".to_string(),
        email: "Ahmed@Example.com".to_string(),
        phone: "0512345678".to_string(),
        current_field: "طالب".to_string(),
        reason: "توجيه مهني عام".to_string(),
        cv_file: Some(CvAttachment {
            file_name: "cv ahmed.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            content: vec![0u8; 64 * 1024],
        }),
        ..RegistrationDraft::default()
    }
}

fn sample_mentor() -> RegistrationDraft {
    RegistrationDraft {
        role: Some(Role::Mentor),
        full_name: "Sara Al-Qahtani".to_string(),
        email: "sara@example.com".to_string(),
        phone: "0598765432".to_string(),
        years_of_experience: "8".to_string(),
        specializations: "Software Engineering, Career Coaching".to_string(),
        bio: "Engineering lead mentoring early-career developers.".to_string(),
        hr_experience: true,
        cv_file: Some(CvAttachment {
            file_name: "sara-cv.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            content: vec![0u8; 48 * 1024],
        }),
        additional_notes: "Available on weekends.".to_string(),
        ..RegistrationDraft::default()
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Rawad platform demo");

    let repository = Arc::new(InMemoryRegistrationStore::default());
    let files = Arc::new(InMemoryFileStore::default());
    let subscription = repository.subscribe(Arc::new(CountObserver));

    println!("\nSubmitting a beneficiary registration");
    let pipeline = SubmissionPipeline::new(files.clone(), repository.clone());
    let mut wizard = RegistrationWizard::new(pipeline);
    *wizard.draft_mut() = sample_beneficiary();
    wizard.advance().map_err(demo_failure)?;
    let stored = wizard.submit(&PrintingListener).map_err(demo_failure)?;
    println!("  stored as {} with CV at {}", stored.id.0, stored.cv_link);
    wizard.reset();

    println!("\nSubmitting a mentor registration");
    let pipeline = SubmissionPipeline::new(files, repository.clone());
    let mut wizard = RegistrationWizard::new(pipeline);
    *wizard.draft_mut() = sample_mentor();
    wizard.advance().map_err(demo_failure)?;
    let stored = wizard.submit(&PrintingListener).map_err(demo_failure)?;
    println!("  stored as {} with CV at {}", stored.id.0, stored.cv_link);

    repository.unsubscribe(subscription);

    if args.skip_admin {
        return Ok(());
    }

    println!("\nAdmin back office");
    let auth = AdminAuthenticator::new(
        Arc::new(InMemoryCredentialStore::default()),
        "demo-salt",
        "demo-password",
    );
    let session = auth.login("demo-password").map_err(demo_failure)?;
    println!("  logged in; session expires {}", session.expires_at);

    let registrations = repository.list().map_err(demo_failure)?;
    let summary = admin::summarize(&registrations, Utc::now().date_naive());
    println!(
        "  {} total | {} mentor(s) | {} beneficiar(ies)",
        summary.total_registrations, summary.mentor_count, summary.beneficiary_count
    );
    for entry in &summary.top_specializations {
        println!("  - {}: {}", entry.specialization, entry.count);
    }

    let filtered = admin::filter_registrations(&registrations, &admin::ReportFilter::default());
    let csv = admin::export_csv(&filtered).map_err(demo_failure)?;
    println!("\nExported report ({} rows incl. header):", csv.lines().count());
    for line in csv.lines() {
        println!("  {line}");
    }

    auth.logout(&session.token);
    Ok(())
}

fn demo_failure(err: impl std::fmt::Display) -> AppError {
    AppError::Io(std::io::Error::other(err.to_string()))
}
