use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a product record.
    ProductId
);
string_id!(
    /// Identifier of a product group.
    GroupId
);
string_id!(
    /// Identifier of a kanban board.
    KanbanId
);

/// Board type. Selects the column set and whether a terminal column exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardType {
    Order,
    Receive,
    Investment,
}

impl BoardType {
    pub const ALL: [BoardType; 3] = [Self::Order, Self::Receive, Self::Investment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Receive => "receive",
            Self::Investment => "investment",
        }
    }

    /// Workflow columns of this board type, left to right.
    pub fn columns(&self) -> &'static [ColumnStatus] {
        use ColumnStatus::*;
        match self {
            Self::Order => &[Identified, AwaitingApproval, Ordered, Purchased],
            Self::Receive => &[AwaitingDelivery, Received, Inspected, Stored],
            Self::Investment => &[Proposed, Approved, Funded],
        }
    }

    pub fn has_column(&self, column: ColumnStatus) -> bool {
        self.columns().contains(&column)
    }

    /// Column whose entry hands a product off to a linked board, unless
    /// overridden in configuration.
    pub fn default_terminal_column(&self) -> Option<ColumnStatus> {
        match self {
            Self::Order => Some(ColumnStatus::Purchased),
            Self::Receive | Self::Investment => None,
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "receive" => Ok(Self::Receive),
            "investment" => Ok(Self::Investment),
            _ => Err(format!("Invalid board type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStatus {
    Identified,
    AwaitingApproval,
    Ordered,
    Purchased,
    AwaitingDelivery,
    Received,
    Inspected,
    Stored,
    Proposed,
    Approved,
    Funded,
}

impl ColumnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identified => "identified",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Ordered => "ordered",
            Self::Purchased => "purchased",
            Self::AwaitingDelivery => "awaiting_delivery",
            Self::Received => "received",
            Self::Inspected => "inspected",
            Self::Stored => "stored",
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Funded => "funded",
        }
    }
}

impl fmt::Display for ColumnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identified" => Ok(Self::Identified),
            "awaiting_approval" => Ok(Self::AwaitingApproval),
            "ordered" => Ok(Self::Ordered),
            "purchased" => Ok(Self::Purchased),
            "awaiting_delivery" => Ok(Self::AwaitingDelivery),
            "received" => Ok(Self::Received),
            "inspected" => Ok(Self::Inspected),
            "stored" => Ok(Self::Stored),
            "proposed" => Ok(Self::Proposed),
            "approved" => Ok(Self::Approved),
            "funded" => Ok(Self::Funded),
            _ => Err(format!("Invalid column: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub kanban_id: KanbanId,
    pub name: String,
    pub column_status: ColumnStatus,
    #[serde(default)]
    pub column_position: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    /// Receive board this product should land on once purchased.
    #[serde(default)]
    pub preferred_receive_kanban_id: Option<KanbanId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductGroup {
    pub id: GroupId,
    pub kanban_id: KanbanId,
    pub name: String,
    pub column_status: ColumnStatus,
    #[serde(default)]
    pub column_position: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Member products in display order.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Group,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Group => "group",
        }
    }
}

/// Key of anything that can be dragged, locked, or snapshotted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ItemKey {
    Product(ProductId),
    Group(GroupId),
}

impl ItemKey {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::Group(_) => ItemKind::Group,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Product(id) => id.as_str(),
            Self::Group(id) => id.as_str(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.id())
    }
}

/// Entry of the reorder payload: `{ "id": .., "type": "product" | "group" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
}

impl From<&ItemKey> for ItemRef {
    fn from(key: &ItemKey) -> Self {
        Self {
            id: key.id().to_string(),
            kind: key.kind(),
        }
    }
}

/// A draggable unit resolved from board state.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Product(Product),
    Group(ProductGroup),
}

impl Item {
    pub fn key(&self) -> ItemKey {
        match self {
            Self::Product(p) => ItemKey::Product(p.id.clone()),
            Self::Group(g) => ItemKey::Group(g.id.clone()),
        }
    }

    pub fn column_status(&self) -> ColumnStatus {
        match self {
            Self::Product(p) => p.column_status,
            Self::Group(g) => g.column_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedKanban {
    pub id: KanbanId,
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: BoardType,
}

/// Aggregate root: one board with its products and groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kanban {
    pub id: KanbanId,
    pub name: String,
    #[serde(rename = "type")]
    pub board_type: BoardType,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub product_groups: Vec<ProductGroup>,
    #[serde(default)]
    pub linked_kanbans: Vec<LinkedKanban>,
    #[serde(default)]
    pub default_linked_kanban_id: Option<KanbanId>,
}

impl Kanban {
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn product_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| &p.id == id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&ProductGroup> {
        self.product_groups.iter().find(|g| &g.id == id)
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut ProductGroup> {
        self.product_groups.iter_mut().find(|g| &g.id == id)
    }

    /// Group that currently contains `product_id`, if any.
    pub fn group_of(&self, product_id: &ProductId) -> Option<&ProductGroup> {
        self.product_groups
            .iter()
            .find(|g| g.product_ids.contains(product_id))
    }

    pub fn item(&self, key: &ItemKey) -> Option<Item> {
        match key {
            ItemKey::Product(id) => self.product(id).cloned().map(Item::Product),
            ItemKey::Group(id) => self.group(id).cloned().map(Item::Group),
        }
    }

    pub fn column_of(&self, key: &ItemKey) -> Option<ColumnStatus> {
        match key {
            ItemKey::Product(id) => self.product(id).map(|p| p.column_status),
            ItemKey::Group(id) => self.group(id).map(|g| g.column_status),
        }
    }

    pub fn set_position(&mut self, key: &ItemKey, position: Option<i64>) {
        match key {
            ItemKey::Product(id) => {
                if let Some(p) = self.product_mut(id) {
                    p.column_position = position;
                }
            }
            ItemKey::Group(id) => {
                if let Some(g) = self.group_mut(id) {
                    g.column_position = position;
                }
            }
        }
    }

    /// Display name of a linked board, falling back to the raw id.
    pub fn linked_kanban_name(&self, id: &KanbanId) -> String {
        self.linked_kanbans
            .iter()
            .find(|k| &k.id == id)
            .map(|k| k.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// First free position at the end of `column`.
    pub fn next_position(&self, column: ColumnStatus) -> i64 {
        let product_max = self
            .products
            .iter()
            .filter(|p| p.column_status == column)
            .filter_map(|p| p.column_position);
        let group_max = self
            .product_groups
            .iter()
            .filter(|g| g.column_status == column)
            .filter_map(|g| g.column_position);
        product_max.chain(group_max).max().map_or(0, |max| max + 1)
    }

    /// Remove a product and drop it from any group membership.
    pub fn remove_product(&mut self, id: &ProductId) -> Option<Product> {
        let index = self.products.iter().position(|p| &p.id == id)?;
        for group in &mut self.product_groups {
            group.product_ids.retain(|member| member != id);
        }
        Some(self.products.remove(index))
    }

    pub fn replace_product(&mut self, product: Product) {
        match self.product_mut(&product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }
}

/// Inline edit of a product. Only present fields are sent and applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_receive_kanban_id: Option<KanbanId>,
}

impl ProductPatch {
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            product.quantity = Some(quantity);
        }
        if let Some(price) = self.unit_price {
            product.unit_price = Some(price);
        }
        if let Some(supplier) = &self.supplier {
            product.supplier = Some(supplier.clone());
        }
        if let Some(notes) = &self.notes {
            product.notes = Some(notes.clone());
        }
        if let Some(location) = &self.location_id {
            product.location_id = Some(location.clone());
        }
        if let Some(kanban) = &self.preferred_receive_kanban_id {
            product.preferred_receive_kanban_id = Some(kanban.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    pub column_status: ColumnStatus,
    pub product_ids: Vec<ProductId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_status: Option<ColumnStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<ProductId>>,
}
