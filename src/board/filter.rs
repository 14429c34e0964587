//! Product filters and saved presets.
//!
//! Filtering narrows a column view without changing its order, so the
//! filtered list is always a subsequence of the aggregator's output.

use serde::{Deserialize, Serialize};

use super::aggregate::ColumnEntry;
use super::models::{ColumnStatus, ItemKey, Kanban, Product};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive match against name, supplier and notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Columns to keep. Empty keeps every column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(|t| t.trim().is_empty())
            && self.columns.is_empty()
            && self.location_id.is_none()
    }

    pub fn includes_column(&self, column: ColumnStatus) -> bool {
        self.columns.is_empty() || self.columns.contains(&column)
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.includes_column(product.column_status) {
            return false;
        }
        if let Some(location) = &self.location_id
            && product.location_id.as_ref() != Some(location)
        {
            return false;
        }
        match self.text.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [
                    Some(product.name.as_str()),
                    product.supplier.as_deref(),
                    product.notes.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }

    /// Keep entries whose product matches, or groups with at least one
    /// matching member.
    pub fn apply(&self, board: &Kanban, entries: &[ColumnEntry]) -> Vec<ColumnEntry> {
        if self.is_empty() {
            return entries.to_vec();
        }
        entries
            .iter()
            .filter(|entry| match &entry.key {
                ItemKey::Product(id) => board.product(id).is_some_and(|p| self.matches(p)),
                ItemKey::Group(id) => board.group(id).is_some_and(|g| {
                    g.product_ids
                        .iter()
                        .filter_map(|member| board.product(member))
                        .any(|p| self.matches(p))
                }),
            })
            .cloned()
            .collect()
    }
}
