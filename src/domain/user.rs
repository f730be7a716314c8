//! User domain entity and the closed role set

use serde::{Deserialize, Serialize};

use crate::shared::decode::{lenient_i64, lenient_opt_string};

/// Access role, resolved once from the backend's raw role string and
/// consumed as a closed set by every route gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Impresa,
    /// Default for unknown or absent role strings.
    Operator,
}

impl Role {
    /// Lower-cased match over the raw backend value; anything
    /// unrecognized falls back to operator behavior.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.unwrap_or("").trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "impresa" => Role::Impresa,
            _ => Role::Operator,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Impresa => "impresa",
            Role::Operator => "operator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend user profile. Display-name fields vary between deployments,
/// so every candidate is kept and resolved through one chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub cognome: Option<String>,
}

impl User {
    pub fn role_kind(&self) -> Role {
        Role::from_raw(self.role.as_deref())
    }

    /// Display name chain: name, nome, full_name, first+last,
    /// nome+cognome, email, then a numbered placeholder.
    pub fn display_name(&self) -> String {
        let joined = |a: &Option<String>, b: &Option<String>| -> Option<String> {
            let parts: Vec<&str> = [a, b]
                .iter()
                .filter_map(|s| s.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        };
        self.non_blank(&self.name)
            .or_else(|| self.non_blank(&self.nome))
            .or_else(|| self.non_blank(&self.full_name))
            .or_else(|| joined(&self.first_name, &self.last_name))
            .or_else(|| joined(&self.nome, &self.cognome))
            .or_else(|| self.non_blank(&self.email))
            .unwrap_or_else(|| format!("Tecnico #{}", self.id))
    }

    fn non_blank(&self, field: &Option<String>) -> Option<String> {
        field
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

// ── Tests ──────────────────────────────────────────────────────
