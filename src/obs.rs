//! Observability hooks for inquiry handling.

use crate::errors::AppError;
use crate::models::{MappedRecord, RecordId};

/// Receives the outcome of every inquiry request.
///
/// Handlers report here instead of logging inline, so the mapping and store code stay
/// free of logging calls and tests can assert on outcomes.
pub trait InquiryObserver: Send + Sync {
    fn record_created(&self, profile: &str, record: &MappedRecord, record_id: &RecordId);

    fn request_failed(&self, profile: &str, error: &AppError);
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl InquiryObserver for TracingObserver {
    fn record_created(&self, profile: &str, record: &MappedRecord, record_id: &RecordId) {
        tracing::info!(
            profile,
            record_id = %record_id,
            title = %record.title,
            "✅ Inquiry saved to Notion"
        );
    }

    fn request_failed(&self, profile: &str, error: &AppError) {
        match error {
            AppError::Validation(e) => {
                tracing::warn!(profile, error = %e, "Rejected inquiry payload");
            }
            AppError::MethodNotAllowed => {
                tracing::warn!(profile, "Unsupported method on inquiry route");
            }
            AppError::PayloadTooLarge | AppError::RateLimited => {
                tracing::warn!(profile, code = error.code(), "Request refused before mapping");
            }
            AppError::Configuration(msg) => {
                tracing::error!(profile, error = %msg, "❌ Notion integration is not configured");
            }
            AppError::ExternalStore(e) => {
                tracing::error!(profile, code = error.code(), error = %e, "❌ Notion save failed");
            }
        }
    }
}
