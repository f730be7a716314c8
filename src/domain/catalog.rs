//! Price-catalog domain entity

use serde::Deserialize;

use crate::shared::decode::{lenient_f64, lenient_i64, lenient_opt_string};

/// One entry of the client price list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogItem {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub item_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    /// Unit of measure, free text ("m", "cad", …).
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub unit: Option<String>,
    /// Live client price. Display fallback only; billing always uses
    /// the frozen price on the line item.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_client: f64,
}

impl CatalogItem {
    pub fn unit_label(&self) -> String {
        self.unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or("u")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_label_defaults_to_u() {
        let mut item = CatalogItem::default();
        assert_eq!(item.unit_label(), "u");
        item.unit = Some("  ".into());
        assert_eq!(item.unit_label(), "u");
        item.unit = Some(" m ".into());
        assert_eq!(item.unit_label(), "m");
    }
}
