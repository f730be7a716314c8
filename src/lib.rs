//! # Cantieri console
//!
//! Client core for the cable-installation work tracker: session and
//! role handling against the hosted backend, client-side aggregation
//! of work logs into dashboard metrics, and the spreadsheet import
//! pipeline for bulk work assignment.
//!
//! ## Layout
//!
//! - **domain**: work logs, catalog, projects, users, periods
//! - **client**: HTTP transport, payload decoding, endpoint calls
//! - **session**: cached token, profile resolution, route gating
//! - **reporting**: per-page metric builders and the CSV export
//! - **import**: spreadsheet reading, normalization, batch assembly

pub mod client;
pub mod config;
pub mod domain;
pub mod import;
pub mod reporting;
pub mod session;
pub mod shared;

pub use client::ApiClient;
pub use config::{default_config_path, AppConfig, TargetsConfig};
pub use session::{home_view, RouteDecision, SessionManager, View};

pub use shared::errors::{ApiError, ConfigError, ImportError, SessionError};
