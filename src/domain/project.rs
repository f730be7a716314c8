//! Project (cantiere) domain entity

use serde::Deserialize;

use crate::shared::decode::{lenient_i64, lenient_opt_string};

pub const UNKNOWN_PROJECT: &str = "Cantiere sconosciuto";

/// A construction site. Display-name fields vary per deployment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub client_code: Option<String>,
}

impl Project {
    /// First non-empty of name, nome, client code.
    pub fn display_name(&self) -> Option<String> {
        [&self.name, &self.nome, &self.client_code]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Display name with the numbered placeholder fallback.
    pub fn display_name_or_placeholder(&self) -> String {
        self.display_name()
            .unwrap_or_else(|| format!("Cantiere #{}", self.id))
    }
}
