//! REST boundary.
//!
//! `KanbanApi` is the seam between the engine and the backend. The real
//! implementation is `HttpKanbanApi`; unit tests use `MockKanbanApi`.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::models::{
    ColumnStatus, GroupId, GroupPatch, ItemRef, Kanban, KanbanId, NewGroup, Product, ProductGroup,
    ProductId, ProductPatch,
};
use crate::errors::ApiError;

pub use http::HttpKanbanApi;

/// Why the server picked a transfer destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferBasis {
    ProductPreference,
    KanbanDefault,
}

impl TransferBasis {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ProductPreference => "product preference",
            Self::KanbanDefault => "board default",
        }
    }
}

/// Server report of a transfer it performed as part of a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    pub was_auto_transferred: bool,
    #[serde(default)]
    pub target_kanban_id: Option<KanbanId>,
    #[serde(default)]
    pub target_kanban_name: Option<String>,
    #[serde(default)]
    pub transfer_source: Option<TransferBasis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(skip)]
    pub product_id: ProductId,
    pub column_status: ColumnStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub product: Product,
    #[serde(default)]
    pub transfer_info: Option<TransferInfo>,
}

#[async_trait]
pub trait KanbanApi: Send + Sync {
    async fn load_kanban(&self, kanban_id: &KanbanId) -> Result<Kanban, ApiError>;

    /// Move one product to `column_status`. May fail with
    /// `ApiError::ValidationRequired`.
    async fn move_item(&self, request: &MoveRequest) -> Result<MoveResponse, ApiError>;

    /// Persist the full order of one column in a single call.
    async fn reorder_column(
        &self,
        kanban_id: &KanbanId,
        column: ColumnStatus,
        items: &[ItemRef],
    ) -> Result<(), ApiError>;

    async fn transfer_item(
        &self,
        product_id: &ProductId,
        target_kanban_id: &KanbanId,
    ) -> Result<(), ApiError>;

    async fn bulk_move(
        &self,
        product_ids: &[ProductId],
        column: ColumnStatus,
        location_id: Option<&str>,
    ) -> Result<(), ApiError>;

    async fn update_item(
        &self,
        product_id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError>;

    async fn delete_item(&self, product_id: &ProductId) -> Result<(), ApiError>;

    async fn create_group(
        &self,
        kanban_id: &KanbanId,
        group: &NewGroup,
    ) -> Result<ProductGroup, ApiError>;

    async fn update_group(&self, group_id: &GroupId, patch: &GroupPatch) -> Result<(), ApiError>;

    async fn delete_group(&self, group_id: &GroupId) -> Result<(), ApiError>;
}
