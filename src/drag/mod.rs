//! Drag session state machine and drop dispatch.
//!
//! A session goes `Idle -> Dragging(active) -> Idle`. Starting a drag only
//! records the active item; ending it turns the drop into a `DropPlan` that
//! the board controller executes. Planning is pure: it reads the board and
//! never mutates it.
//!
//! Drag ids: products use their id, groups use `group-<id>`, columns use the
//! column's wire name (`awaiting_approval`).

use std::str::FromStr;

use crate::board::aggregate::{column_items, index_of, move_entry};
use crate::board::models::{ColumnStatus, GroupId, ItemKey, Kanban, ProductId};
use crate::errors::DragError;

pub const GROUP_PREFIX: &str = "group-";

/// Drag id for an item, as a view would emit it.
pub fn drag_id(key: &ItemKey) -> String {
    match key {
        ItemKey::Product(id) => id.to_string(),
        ItemKey::Group(id) => format!("{}{}", GROUP_PREFIX, id),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveItem {
    pub key: ItemKey,
    pub column: ColumnStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveItem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(ColumnStatus),
    Item(ItemKey),
}

/// Where a cross-column move lands in the destination column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    End,
    /// At the index currently held by this item, pushing it down.
    Before(ItemKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPlan {
    NoOp,
    Reorder {
        column: ColumnStatus,
        order: Vec<ItemKey>,
    },
    MoveProduct {
        product_id: ProductId,
        to: ColumnStatus,
        placement: Placement,
    },
    MoveGroup {
        group_id: GroupId,
        to: ColumnStatus,
        placement: Placement,
    },
}

impl DropPlan {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Resolve a drag id to the item a user can actually pick up. Grouped
/// products never move on their own, so they resolve to their group.
pub fn parse_drag_id(board: &Kanban, id: &str) -> Result<ItemKey, DragError> {
    if let Some(group_id) = id.strip_prefix(GROUP_PREFIX) {
        let group_id = GroupId::from(group_id);
        if board.group(&group_id).is_some() {
            return Ok(ItemKey::Group(group_id));
        }
    }

    let product_id = ProductId::from(id);
    if board.product(&product_id).is_some() {
        return Ok(match board.group_of(&product_id) {
            Some(group) => ItemKey::Group(group.id.clone()),
            None => ItemKey::Product(product_id),
        });
    }

    Err(DragError::UnknownItem { id: id.to_string() })
}

pub fn resolve_drop_target(board: &Kanban, id: &str) -> Result<DropTarget, DragError> {
    if let Ok(column) = ColumnStatus::from_str(id) {
        if !board.board_type.has_column(column) {
            return Err(DragError::InvalidColumn {
                column,
                board_type: board.board_type,
            });
        }
        return Ok(DropTarget::Column(column));
    }

    match parse_drag_id(board, id) {
        Ok(key) => Ok(DropTarget::Item(key)),
        Err(_) => Err(DragError::UnknownTarget { id: id.to_string() }),
    }
}

/// Decide what dropping `active` on `target` means.
pub fn plan_drop(board: &Kanban, active: &ItemKey, target: &DropTarget) -> Result<DropPlan, DragError> {
    let from = board
        .column_of(active)
        .ok_or_else(|| DragError::UnknownItem {
            id: drag_id(active),
        })?;

    let (to, placement) = match target {
        DropTarget::Column(column) if *column == from => return Ok(DropPlan::NoOp),
        DropTarget::Column(column) => (*column, Placement::End),
        DropTarget::Item(over) if over == active => return Ok(DropPlan::NoOp),
        DropTarget::Item(over) => {
            let over_column = board
                .column_of(over)
                .ok_or_else(|| DragError::UnknownTarget { id: drag_id(over) })?;
            if over_column == from {
                return Ok(plan_reorder(board, from, active, over));
            }
            (over_column, Placement::Before(over.clone()))
        }
    };

    Ok(match active {
        ItemKey::Group(group_id) => DropPlan::MoveGroup {
            group_id: group_id.clone(),
            to,
            placement,
        },
        ItemKey::Product(product_id) => DropPlan::MoveProduct {
            product_id: product_id.clone(),
            to,
            placement,
        },
    })
}

fn plan_reorder(board: &Kanban, column: ColumnStatus, active: &ItemKey, over: &ItemKey) -> DropPlan {
    let entries = column_items(board, column);
    match (index_of(&entries, active), index_of(&entries, over)) {
        (Some(old), Some(new)) if old != new => DropPlan::Reorder {
            column,
            order: move_entry(&entries, old, new),
        },
        _ => DropPlan::NoOp,
    }
}

/// One drag gesture.
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveItem> {
        match &self.state {
            DragState::Dragging(active) => Some(active),
            DragState::Idle => None,
        }
    }

    pub fn on_drag_start(&mut self, board: &Kanban, id: &str) -> Result<&ActiveItem, DragError> {
        let key = parse_drag_id(board, id)?;
        let column = board
            .column_of(&key)
            .ok_or_else(|| DragError::UnknownItem { id: id.to_string() })?;
        self.state = DragState::Dragging(ActiveItem { key, column });
        self.active().ok_or(DragError::NotDragging)
    }

    /// End the gesture. The session is back to `Idle` whatever the result.
    pub fn on_drag_end(&mut self, board: &Kanban, over: Option<&str>) -> Result<DropPlan, DragError> {
        let DragState::Dragging(active) = std::mem::take(&mut self.state) else {
            return Err(DragError::NotDragging);
        };
        let Some(over) = over else {
            return Ok(DropPlan::NoOp);
        };
        let target = resolve_drop_target(board, over)?;
        plan_drop(board, &active.key, &target)
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
