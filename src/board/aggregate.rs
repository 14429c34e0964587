//! Ordered column view: groups as units plus ungrouped products.
//!
//! The list produced here is both what a column renders and the index space
//! every reorder is computed against. A product that belongs to a group never
//! appears on its own; it is represented by its group.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::{ColumnStatus, ItemKey, ItemKind, ItemRef, Kanban, ProductId};
use super::position::{Positioned, sort_column};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnEntry {
    pub key: ItemKey,
    pub column_position: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ColumnEntry {
    pub fn kind(&self) -> ItemKind {
        self.key.kind()
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::from(&self.key)
    }
}

impl Positioned for ColumnEntry {
    fn column_position(&self) -> Option<i64> {
        self.column_position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sort_id(&self) -> &str {
        self.key.id()
    }
}

fn grouped_products(board: &Kanban) -> HashSet<&ProductId> {
    board
        .product_groups
        .iter()
        .flat_map(|g| g.product_ids.iter())
        .collect()
}

pub fn column_items(board: &Kanban, column: ColumnStatus) -> Vec<ColumnEntry> {
    let grouped = grouped_products(board);

    let groups = board
        .product_groups
        .iter()
        .filter(|g| g.column_status == column)
        .map(|g| ColumnEntry {
            key: ItemKey::Group(g.id.clone()),
            column_position: g.column_position,
            created_at: g.created_at,
        });

    let products = board
        .products
        .iter()
        .filter(|p| p.column_status == column && !grouped.contains(&p.id))
        .map(|p| ColumnEntry {
            key: ItemKey::Product(p.id.clone()),
            column_position: p.column_position,
            created_at: p.created_at,
        });

    let mut entries: Vec<ColumnEntry> = groups.chain(products).collect();
    sort_column(&mut entries);
    entries
}

/// Every column of the board's type, in workflow order.
pub fn column_items_all(board: &Kanban) -> Vec<(ColumnStatus, Vec<ColumnEntry>)> {
    board
        .board_type
        .columns()
        .iter()
        .map(|column| (*column, column_items(board, *column)))
        .collect()
}

pub fn index_of(entries: &[ColumnEntry], key: &ItemKey) -> Option<usize> {
    entries.iter().position(|e| &e.key == key)
}

/// Move the entry at `from` so it ends up at index `to`.
pub fn move_entry(entries: &[ColumnEntry], from: usize, to: usize) -> Vec<ItemKey> {
    let mut keys: Vec<ItemKey> = entries.iter().map(|e| e.key.clone()).collect();
    if from < keys.len() {
        let moved = keys.remove(from);
        let to = to.min(keys.len());
        keys.insert(to, moved);
    }
    keys
}

/// Write dense `0..n` positions for `order` into the board.
pub fn renumber(board: &mut Kanban, order: &[ItemKey]) {
    for (index, key) in order.iter().enumerate() {
        board.set_position(key, Some(index as i64));
    }
}
