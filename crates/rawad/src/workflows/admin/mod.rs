//! Back office for the platform team: password login with lockout, session
//! tokens, registration listing, analytics aggregation, and report export.

pub mod analytics;
pub mod auth;
pub mod report;
pub mod router;

pub use analytics::{
    summarize, AnalyticsSummary, DailyCount, ExperienceBucket, SpecializationCount, WeeklyGrowth,
};
pub use auth::{
    AdminAuthenticator, AdminCredentials, AuthError, CredentialStore, CredentialStoreError,
    Session, SessionRegistry, MAX_LOGIN_ATTEMPTS, SESSION_TTL_HOURS,
};
pub use report::{export_csv, filter_registrations, ReportError, ReportFilter, CSV_HEADERS};
pub use router::{admin_router, AdminContext};
