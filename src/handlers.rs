use crate::config::Config;
use crate::errors::{AppError, ValidationError};
use crate::mapping::MappingProfile;
use crate::models::{InquiryInput, SaveInquiryResponse};
use crate::obs::InquiryObserver;
use crate::services::{InquiryService, RecordStore};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// External store client. `None` when no credential was configured at start-up.
    pub store: Option<Arc<dyn RecordStore>>,
    /// Receives request outcomes for logging.
    pub observer: Arc<dyn InquiryObserver>,
    /// Profile served on `/api/save-complex`.
    pub complex_profile: MappingProfile,
    /// Profile served on `/api/save-data`.
    pub pricing_profile: MappingProfile,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Option<Arc<dyn RecordStore>>,
        observer: Arc<dyn InquiryObserver>,
    ) -> Self {
        let pricing_profile = MappingProfile::full_pricing(config.amount_unit.clone());
        Self {
            config,
            store,
            observer,
            complex_profile: MappingProfile::complex_only(),
            pricing_profile,
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-inquiry-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/save-complex
///
/// Stores only the complex name and lookup time.
pub async fn save_complex(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InquiryInput>, JsonRejection>,
) -> Response {
    save_inquiry(&state, &state.complex_profile, body).await
}

/// POST /api/save-data
///
/// Stores the complex name with size, pricing and guarantee result labels.
pub async fn save_data(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InquiryInput>, JsonRejection>,
) -> Response {
    save_inquiry(&state, &state.pricing_profile, body).await
}

/// OPTIONS on an inquiry route: empty 200. CORS headers come from the router layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other verb on `/api/save-complex`.
pub async fn reject_complex_method(State(state): State<Arc<AppState>>) -> Response {
    method_not_allowed(&state, &state.complex_profile)
}

/// Any other verb on `/api/save-data`.
pub async fn reject_data_method(State(state): State<Arc<AppState>>) -> Response {
    method_not_allowed(&state, &state.pricing_profile)
}

fn method_not_allowed(state: &AppState, profile: &MappingProfile) -> Response {
    let err = AppError::MethodNotAllowed;
    state.observer.request_failed(profile.name, &err);
    err.to_response(state.config.environment.exposes_error_details())
}

async fn save_inquiry(
    state: &AppState,
    profile: &MappingProfile,
    body: Result<Json<InquiryInput>, JsonRejection>,
) -> Response {
    match process_inquiry(state, profile, body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            state.observer.request_failed(profile.name, &err);
            err.to_response(state.config.environment.exposes_error_details())
        }
    }
}

/// Validate → map → check configuration → create record.
///
/// A payload that fails validation never reaches the store.
async fn process_inquiry(
    state: &AppState,
    profile: &MappingProfile,
    body: Result<Json<InquiryInput>, JsonRejection>,
) -> Result<SaveInquiryResponse, AppError> {
    let Json(input) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            ValidationError::MalformedBody(rejection.body_text()).into()
        }
    })?;

    let record = profile.map_and_validate(&input, Utc::now())?;

    let (_, database_id) = state.config.store_target()?;
    let store = state.store.as_deref().ok_or_else(|| {
        AppError::Configuration("Notion client was not initialized".to_string())
    })?;

    let record_id = InquiryService::new(store, database_id)
        .submit(profile, &record)
        .await?;

    state.observer.record_created(profile.name, &record, &record_id);

    Ok(SaveInquiryResponse {
        success: true,
        message: profile.success_message.to_string(),
        complex_name: record.title.clone(),
        record,
        record_id,
    })
}
