//! Real-Estate Inquiry API Library
//!
//! Accepts real-estate listing inquiries over HTTP, derives display labels from the
//! raw figures and appends each inquiry as a new page in a Notion database.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (router and handlers).
//! - `core`: Domain namespace (mapping, models, errors, services).
//! - `integrations`: External service integrations.
//! - `app`: Router assembly and CORS.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `mapping`: Inquiry validation and record mapping profiles.
//! - `models`: Inquiry, record and response models.
//! - `notion_client`: Notion API client.
//! - `obs`: Observability hooks.
//! - `services`: Record store seam and submission.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and the server binary
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod notion_client;
pub mod obs;
pub mod services;
