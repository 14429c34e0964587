//! Board builders shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use super::models::*;

pub const ORDER_KANBAN: &str = "ord-1";

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn product(id: &str, column: ColumnStatus, position: Option<i64>, created: i64) -> Product {
    Product {
        id: ProductId::from(id),
        kanban_id: KanbanId::from(ORDER_KANBAN),
        name: format!("Product {}", id),
        column_status: column,
        column_position: position,
        created_at: at(created),
        updated_at: at(created),
        quantity: Some(1),
        unit_price: None,
        supplier: None,
        notes: None,
        location_id: None,
        preferred_receive_kanban_id: None,
    }
}

pub fn group(
    id: &str,
    column: ColumnStatus,
    position: Option<i64>,
    created: i64,
    members: &[&str],
) -> ProductGroup {
    ProductGroup {
        id: GroupId::from(id),
        kanban_id: KanbanId::from(ORDER_KANBAN),
        name: format!("Group {}", id),
        column_status: column,
        column_position: position,
        created_at: at(created),
        product_ids: members.iter().map(|m| ProductId::from(*m)).collect(),
    }
}

/// Order board linked to two receive boards, no default destination.
pub fn order_board(products: Vec<Product>, groups: Vec<ProductGroup>) -> Kanban {
    Kanban {
        id: KanbanId::from(ORDER_KANBAN),
        name: "Orders".into(),
        board_type: BoardType::Order,
        products,
        product_groups: groups,
        linked_kanbans: vec![
            LinkedKanban {
                id: KanbanId::from("recv-42"),
                name: "Main Warehouse".into(),
                board_type: BoardType::Receive,
            },
            LinkedKanban {
                id: KanbanId::from("recv-7"),
                name: "Lab Stores".into(),
                board_type: BoardType::Receive,
            },
        ],
        default_linked_kanban_id: None,
    }
}

pub fn pid(id: &str) -> ProductId {
    ProductId::from(id)
}

pub fn gid(id: &str) -> GroupId {
    GroupId::from(id)
}

pub fn pkey(id: &str) -> ItemKey {
    ItemKey::Product(pid(id))
}

pub fn gkey(id: &str) -> ItemKey {
    ItemKey::Group(gid(id))
}
