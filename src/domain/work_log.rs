//! Work-log domain entities: the unit of the approval workflow

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::catalog::CatalogItem;
use crate::domain::project::Project;
use crate::shared::decode::{
    lenient_f64, lenient_i64, lenient_opt_datetime, lenient_opt_i64, lenient_opt_string,
};

/// Approval workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    InAttesa,
    DaApprovare,
    Approvato,
    Rifiutato,
}

impl WorkStatus {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "in_attesa" => Some(Self::InAttesa),
            "da_approvare" => Some(Self::DaApprovare),
            "approvato" => Some(Self::Approvato),
            "rifiutato" => Some(Self::Rifiutato),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InAttesa => "in_attesa",
            Self::DaApprovare => "da_approvare",
            Self::Approvato => "approvato",
            Self::Rifiutato => "rifiutato",
        }
    }

    /// User-facing Italian label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InAttesa => "In attesa",
            Self::DaApprovare => "Da approvare",
            Self::Approvato => "Approvato",
            Self::Rifiutato => "Rifiutato",
        }
    }
}

/// One cable-installation job record.
///
/// Shapes differ slightly per endpoint (the queue embeds line items and
/// a joined project under `_projects`, the operator list joins it under
/// `projects`); a single tolerant model covers all of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkLog {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub users_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub projects_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub cable_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub cable_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_opt_datetime")]
    pub approved_at: Option<DateTime<Utc>>,
    /// Joined project record when the endpoint embeds one.
    #[serde(default, rename = "projects", alias = "_projects")]
    pub project: Option<Project>,
    /// Line items when the endpoint embeds them (approval queue).
    #[serde(default)]
    pub items: Vec<WorkLogItem>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub start_point: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub end_point: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub references: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub calculated_length: Option<String>,
}

impl WorkLog {
    pub fn status_kind(&self) -> Option<WorkStatus> {
        self.status.as_deref().and_then(WorkStatus::from_raw)
    }

    /// Known statuses map to their label, unknown raw strings pass
    /// through, absent status renders as a dash.
    pub fn status_label(&self) -> String {
        match self.status_kind() {
            Some(st) => st.label().to_string(),
            None => match self.status.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => "-".to_string(),
            },
        }
    }
}

/// A quantified catalog entry attached to a work log, billed at the
/// price frozen when it was declared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkLogItem {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub work_logs_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub price_list_items_id: Option<i64>,
    #[serde(default, alias = "quantita", deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub frozen_price_client: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_price_client: f64,
    /// Joined catalog record when the endpoint embeds one.
    #[serde(default, rename = "_price_list_items")]
    pub catalog: Option<CatalogItem>,
}

impl WorkLogItem {
    /// Billing rule: the stored total wins when positive, otherwise
    /// quantity times the frozen unit price. The live catalog price is
    /// never consulted.
    pub fn total(&self) -> f64 {
        if self.total_price_client > 0.0 {
            self.total_price_client
        } else {
            self.quantity * self.frozen_price_client
        }
    }
}

/// Photo attached to a work log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Photo {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub work_logs_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
}

// ── Tests ──────────────────────────────────────────────────────
