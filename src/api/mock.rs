//! Scriptable in-memory `KanbanApi` for unit tests.
//!
//! Records every call, can fail the next call of a given kind, can report an
//! automatic transfer on the next move, and can delay responses so tests can
//! drive timeouts and overlapping mutations under paused tokio time.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{KanbanApi, MoveRequest, MoveResponse, TransferInfo};
use crate::board::models::*;
use crate::errors::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Load(KanbanId),
    Move(MoveRequest),
    Reorder {
        kanban_id: KanbanId,
        column: ColumnStatus,
        items: Vec<ItemRef>,
    },
    Transfer {
        product_id: ProductId,
        target: KanbanId,
    },
    BulkMove {
        product_ids: Vec<ProductId>,
        column: ColumnStatus,
        location_id: Option<String>,
    },
    Update {
        product_id: ProductId,
        patch: ProductPatch,
    },
    Delete(ProductId),
    CreateGroup(NewGroup),
    UpdateGroup {
        group_id: GroupId,
        patch: GroupPatch,
    },
    DeleteGroup(GroupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Load,
    Move,
    Reorder,
    Transfer,
    BulkMove,
    Update,
    Delete,
    CreateGroup,
    UpdateGroup,
    DeleteGroup,
}

impl ApiCall {
    pub fn op(&self) -> Op {
        match self {
            Self::Load(_) => Op::Load,
            Self::Move(_) => Op::Move,
            Self::Reorder { .. } => Op::Reorder,
            Self::Transfer { .. } => Op::Transfer,
            Self::BulkMove { .. } => Op::BulkMove,
            Self::Update { .. } => Op::Update,
            Self::Delete(_) => Op::Delete,
            Self::CreateGroup(_) => Op::CreateGroup,
            Self::UpdateGroup { .. } => Op::UpdateGroup,
            Self::DeleteGroup(_) => Op::DeleteGroup,
        }
    }
}

pub struct MockKanbanApi {
    board: Mutex<Kanban>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<Op, VecDeque<ApiError>>>,
    transfer_infos: Mutex<VecDeque<TransferInfo>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockKanbanApi {
    pub fn new(board: Kanban) -> Self {
        Self {
            board: Mutex::new(board),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            transfer_infos: Mutex::new(VecDeque::new()),
            delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, op: Op, err: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(err);
    }

    pub fn auto_transfer_next(&self, info: TransferInfo) {
        self.transfer_infos.lock().unwrap().push_back(info);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op() == op).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Record the call, wait out the configured delay, then pop any scripted
    /// failure for this kind of call.
    async fn enter(&self, call: ApiCall) -> Result<InFlight<'_>, ApiError> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(guard),
        }
    }

    fn not_found(what: &str, id: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{} {} not found", what, id),
        }
    }
}

#[async_trait]
impl KanbanApi for MockKanbanApi {
    async fn load_kanban(&self, kanban_id: &KanbanId) -> Result<Kanban, ApiError> {
        let _guard = self.enter(ApiCall::Load(kanban_id.clone())).await?;
        let board = self.board.lock().unwrap();
        if &board.id == kanban_id {
            Ok(board.clone())
        } else {
            Err(Self::not_found("Kanban", kanban_id.as_str()))
        }
    }

    async fn move_item(&self, request: &MoveRequest) -> Result<MoveResponse, ApiError> {
        let _guard = self.enter(ApiCall::Move(request.clone())).await?;
        let transfer_info = self.transfer_infos.lock().unwrap().pop_front();
        let mut board = self.board.lock().unwrap();
        let position = board.next_position(request.column_status);
        let product = board
            .product_mut(&request.product_id)
            .ok_or_else(|| Self::not_found("Product", request.product_id.as_str()))?;
        product.column_status = request.column_status;
        product.column_position = Some(position);
        if let Some(location) = &request.location_id {
            product.location_id = Some(location.clone());
        }
        product.updated_at = Utc::now();
        Ok(MoveResponse {
            product: product.clone(),
            transfer_info,
        })
    }

    async fn reorder_column(
        &self,
        kanban_id: &KanbanId,
        column: ColumnStatus,
        items: &[ItemRef],
    ) -> Result<(), ApiError> {
        let _guard = self
            .enter(ApiCall::Reorder {
                kanban_id: kanban_id.clone(),
                column,
                items: items.to_vec(),
            })
            .await?;
        Ok(())
    }

    async fn transfer_item(
        &self,
        product_id: &ProductId,
        target_kanban_id: &KanbanId,
    ) -> Result<(), ApiError> {
        let _guard = self
            .enter(ApiCall::Transfer {
                product_id: product_id.clone(),
                target: target_kanban_id.clone(),
            })
            .await?;
        self.board.lock().unwrap().remove_product(product_id);
        Ok(())
    }

    async fn bulk_move(
        &self,
        product_ids: &[ProductId],
        column: ColumnStatus,
        location_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let _guard = self
            .enter(ApiCall::BulkMove {
                product_ids: product_ids.to_vec(),
                column,
                location_id: location_id.map(str::to_string),
            })
            .await?;
        Ok(())
    }

    async fn update_item(
        &self,
        product_id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let _guard = self
            .enter(ApiCall::Update {
                product_id: product_id.clone(),
                patch: patch.clone(),
            })
            .await?;
        let mut board = self.board.lock().unwrap();
        let product = board
            .product_mut(product_id)
            .ok_or_else(|| Self::not_found("Product", product_id.as_str()))?;
        patch.apply_to(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_item(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let _guard = self.enter(ApiCall::Delete(product_id.clone())).await?;
        self.board.lock().unwrap().remove_product(product_id);
        Ok(())
    }

    async fn create_group(
        &self,
        kanban_id: &KanbanId,
        group: &NewGroup,
    ) -> Result<ProductGroup, ApiError> {
        let _guard = self.enter(ApiCall::CreateGroup(group.clone())).await?;
        let created = ProductGroup {
            id: GroupId(format!("grp-{}", uuid::Uuid::new_v4())),
            kanban_id: kanban_id.clone(),
            name: group.name.clone(),
            column_status: group.column_status,
            column_position: None,
            created_at: Utc::now(),
            product_ids: group.product_ids.clone(),
        };
        self.board
            .lock()
            .unwrap()
            .product_groups
            .push(created.clone());
        Ok(created)
    }

    async fn update_group(&self, group_id: &GroupId, patch: &GroupPatch) -> Result<(), ApiError> {
        let _guard = self
            .enter(ApiCall::UpdateGroup {
                group_id: group_id.clone(),
                patch: patch.clone(),
            })
            .await?;
        Ok(())
    }

    async fn delete_group(&self, group_id: &GroupId) -> Result<(), ApiError> {
        let _guard = self.enter(ApiCall::DeleteGroup(group_id.clone())).await?;
        Ok(())
    }
}
