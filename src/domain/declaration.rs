//! Work-declaration builder
//!
//! Turns the declaration form into the line-item list the backend
//! expects. Catalog ids are fixed by the published price list; only
//! strictly positive quantities are submitted.

use serde::Serialize;
use uuid::Uuid;

use crate::shared::errors::DeclarationError;

/// Cable family for duct-laid cable, selecting the price-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CableFamily {
    Cpr,
    Microcavo,
    Multifibra,
}

impl CableFamily {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "cpr" => Some(Self::Cpr),
            "microcavo" => Some(Self::Microcavo),
            "multifibra" => Some(Self::Multifibra),
            _ => None,
        }
    }

    fn price_id(&self) -> i64 {
        match self {
            Self::Cpr => 1,
            Self::Microcavo => 3,
            Self::Multifibra => 4,
        }
    }
}

/// One line of the declaration payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclarationItem {
    pub id_prezzo: i64,
    pub quantita: f64,
}

/// Declaration form as entered by the operator. Metre fields default
/// to zero and are skipped unless positive.
#[derive(Debug, Clone, Default)]
pub struct DeclarationForm {
    /// Metres of cable laid in duct; billed per the cable family.
    pub cable_in_duct_m: f64,
    pub cable_family: Option<CableFamily>,
    /// Metres of cable strapped onto an existing bundle.
    pub cable_strapped_m: f64,
    pub pte_installed: bool,
    pub pte_spliced: bool,
    pub pvc_duct_m: f64,
    pub vtr_conduit_m: f64,
    pub microduct_m: f64,
    pub asphalt_dig_m: f64,
    pub soil_dig_m: f64,
    pub premium_restore_m: f64,
    pub chamber_search: f64,
    pub duct_restore_m: f64,
}

impl DeclarationForm {
    /// Build the items to submit, in the fixed price-list order.
    ///
    /// Duct-laid metres without a recognized cable family contribute
    /// nothing (there is no price entry to bill them against).
    pub fn build_items(&self) -> Vec<DeclarationItem> {
        let mut items = Vec::new();
        let mut push = |id_prezzo: i64, quantita: f64| {
            if quantita > 0.0 {
                items.push(DeclarationItem {
                    id_prezzo,
                    quantita,
                });
            }
        };

        if self.cable_in_duct_m > 0.0 {
            if let Some(family) = self.cable_family {
                push(family.price_id(), self.cable_in_duct_m);
            }
        }
        push(2, self.cable_strapped_m);
        if self.pte_installed {
            push(5, 1.0);
        }
        if self.pte_spliced {
            push(6, 1.0);
        }
        push(7, self.pvc_duct_m);
        push(8, self.vtr_conduit_m);
        push(9, self.microduct_m);
        push(10, self.asphalt_dig_m);
        push(11, self.soil_dig_m);
        push(12, self.premium_restore_m);
        push(13, self.chamber_search);
        push(14, self.duct_restore_m);
        items
    }

    pub fn total_cable_meters(&self) -> f64 {
        self.cable_in_duct_m.max(0.0) + self.cable_strapped_m.max(0.0)
    }
}

/// Payload for the declare-work endpoint. The item list travels as a
/// JSON-encoded string and every attempt carries a fresh submission
/// token for backend-side duplicate suppression.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationPayload {
    pub work_logs_id: i64,
    pub cable_code: String,
    pub items: String,
    pub submission_token: String,
}

impl DeclarationPayload {
    pub fn build(
        work_log_id: i64,
        cable_code: &str,
        form: &DeclarationForm,
    ) -> Result<Self, DeclarationError> {
        let items = form.build_items();
        if items.is_empty() {
            return Err(DeclarationError::NoItems);
        }
        // Encoding a Vec of two plain fields cannot fail.
        let items_json =
            serde_json::to_string(&items).map_err(|_| DeclarationError::NoItems)?;
        Ok(Self {
            work_logs_id: work_log_id,
            cable_code: cable_code.to_string(),
            items: items_json,
            submission_token: Uuid::new_v4().to_string(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────
