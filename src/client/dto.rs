//! Typed decode layer for backend payloads
//!
//! The backend is tolerant about shape (token under two possible field
//! names, plain or nested; lists bare or keyed; numerics as strings).
//! Every one of those decisions is made here, once, so callers consume
//! plain structs.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{CatalogItem, Photo, Project, User, WorkLog, WorkLogItem};
use crate::shared::decode::{lenient_f64, lenient_i64, lenient_opt_i64, lenient_opt_string};

// ── Login ──────────────────────────────────────────────────────

/// Raw login response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default, rename = "authToken")]
    pub auth_token: Option<TokenField>,
    #[serde(default)]
    pub token: Option<TokenField>,
    /// Optional embedded profile; provisional, `auth/me` overrides it.
    #[serde(default)]
    pub user: Value,
}

/// The token slot as observed in the wild: a plain string, a nested
/// object carrying the same pair of field names, or something else
/// entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenField {
    Text(String),
    Nested {
        #[serde(rename = "authToken")]
        auth_token: Option<String>,
        token: Option<String>,
    },
    Other(Value),
}

impl LoginResponse {
    /// Token extraction rule. `authToken` wins over `token`; a nested
    /// object is searched for the same pair; if the preferred slot held
    /// something unusable, a top-level plain string under either name
    /// still rescues the login. An empty string found early does not
    /// fall through to the rescue and is rejected at the end.
    pub fn extract_token(&self) -> Option<String> {
        let primary = self.auth_token.as_ref().or(self.token.as_ref());
        let candidate = match primary {
            Some(TokenField::Text(s)) => Some(s.clone()),
            Some(TokenField::Nested { auth_token, token }) => {
                match auth_token.as_ref().or(token.as_ref()) {
                    Some(s) => Some(s.clone()),
                    None => self.top_level_text(),
                }
            }
            Some(TokenField::Other(_)) | None => self.top_level_text(),
        };
        candidate.filter(|s| !s.is_empty())
    }

    fn top_level_text(&self) -> Option<String> {
        if let Some(TokenField::Text(s)) = &self.auth_token {
            return Some(s.clone());
        }
        if let Some(TokenField::Text(s)) = &self.token {
            return Some(s.clone());
        }
        None
    }

    /// Embedded user object, when the response carries one.
    pub fn embedded_user(&self) -> Option<User> {
        if !self.user.is_object() {
            return None;
        }
        serde_json::from_value(self.user.clone()).ok()
    }
}

// ── Dashboards ─────────────────────────────────────────────────

/// Completion counts as the operator endpoint reports them.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CompletionCounts {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub assigned: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub worked: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorDashboard {
    #[serde(default)]
    pub approved: Vec<WorkLog>,
    #[serde(default)]
    pub recent: Vec<WorkLog>,
    #[serde(default)]
    pub items: Vec<WorkLogItem>,
    #[serde(default)]
    pub completion: CompletionCounts,
}

/// The admin endpoint sends the raw assignment lists instead of counts;
/// their lengths are the counts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionLists {
    #[serde(default)]
    pub assigned: Vec<Value>,
    #[serde(default)]
    pub worked: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminDashboard {
    #[serde(default)]
    pub logs: Vec<WorkLog>,
    #[serde(default)]
    pub items: Vec<WorkLogItem>,
    #[serde(default)]
    pub catalog: Vec<CatalogItem>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub completion: CompletionLists,
}

// ── Approved-works report ──────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovedLogsPayload {
    #[serde(default)]
    pub logs: Vec<WorkLog>,
    #[serde(default)]
    pub items: Vec<WorkLogItem>,
    #[serde(default)]
    pub photos: Vec<PhotoRow>,
    #[serde(default)]
    pub catalog: Vec<CatalogItem>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Photo rows arrive flat or with the record nested under `photo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoRow {
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub work_logs_id: Option<i64>,
    #[serde(default)]
    pub photo: Option<Photo>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
}

impl PhotoRow {
    /// Parent log id plus the unwrapped photo. Rows without a positive
    /// parent id or without a URL are dropped.
    pub fn into_photo(self) -> Option<(i64, Photo)> {
        let log_id = self.work_logs_id.filter(|id| *id > 0)?;
        let photo = match self.photo {
            Some(p) => p,
            None => Photo {
                id: self.id,
                work_logs_id: self.work_logs_id,
                url: self.url,
            },
        };
        photo.url.as_deref().filter(|u| !u.is_empty())?;
        Some((log_id, photo))
    }
}

// ── Approval queue ─────────────────────────────────────────────

/// Pending declarations plus the projects they reference.
#[derive(Debug, Clone, Default)]
pub struct ApprovalQueue {
    pub logs: Vec<WorkLog>,
    pub projects: Vec<Project>,
}

impl ApprovalQueue {
    /// Decode order observed in production payloads: a `logs` array
    /// wins, then a bare top-level array, then `items`, then `data`;
    /// anything else yields an empty queue. `projects` rides alongside
    /// when the payload is keyed.
    pub fn from_value(payload: &Value) -> Self {
        let logs = rows::<WorkLog>(payload.get("logs"))
            .or_else(|| rows(Some(payload)))
            .or_else(|| rows(payload.get("items")))
            .or_else(|| rows(payload.get("data")))
            .unwrap_or_default();
        let projects = rows::<Project>(payload.get("projects")).unwrap_or_default();
        Self { logs, projects }
    }
}

fn rows<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Option<Vec<T>> {
    let arr = value?.as_array()?;
    Some(
        arr.iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    )
}

// ── Import ─────────────────────────────────────────────────────

/// Counts reported by the import endpoint, trusted as-is.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ImportOutcome {
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub skipped: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub errors: Option<i64>,
}

// ── Tests ──────────────────────────────────────────────────────
