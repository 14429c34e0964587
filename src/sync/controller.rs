use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::optimistic::{Coordinator, DEFAULT_REQUEST_TIMEOUT};
use crate::api::{KanbanApi, MoveRequest, MoveResponse, TransferInfo};
use crate::board::aggregate::{column_items, renumber};
use crate::board::models::{
    ColumnStatus, GroupId, GroupPatch, ItemKey, ItemRef, Kanban, KanbanId, NewGroup, Product,
    ProductGroup, ProductId, ProductPatch,
};
use crate::board::store::{BoardEvent, BoardStore};
use crate::drag::{DragSession, DropPlan, Placement};
use crate::errors::{ApiError, DragError, MutationError};
use crate::notice::Notice;
use crate::transfer::{self, TerminalColumns, TransferDecision, TransferOutcome};

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub timeout: Duration,
    pub terminal_columns: TerminalColumns,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            terminal_columns: TerminalColumns::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOptions {
    pub location_id: Option<String>,
    /// Set when re-issuing a move after the user supplied the missing data.
    pub skip_validation: bool,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub product_id: ProductId,
    pub product_name: String,
    pub column: ColumnStatus,
    pub transfer: TransferOutcome,
    /// Set when the move stood but its place within the column could not
    /// be saved. The product is left at the end of the column.
    pub order_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(MoveReport),
    /// The server wants more data (e.g. a location) first. The local move was
    /// rolled back; call `retry_move_with_location` once the data is known.
    ValidationRequired {
        product_id: ProductId,
        column_status: ColumnStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    NoOp,
    Reordered { column: ColumnStatus },
    Product(MoveOutcome),
    GroupMoved { group_id: GroupId, column: ColumnStatus },
}

/// Drives every board operation: optimistic writes through the coordinator,
/// drag drops, and terminal-column transfers.
pub struct BoardController {
    api: Arc<dyn KanbanApi>,
    coordinator: Coordinator,
    terminal_columns: TerminalColumns,
}

fn check_column(board: &Kanban, column: ColumnStatus) -> Result<(), MutationError> {
    if board.board_type.has_column(column) {
        Ok(())
    } else {
        Err(MutationError::InvalidColumn {
            column,
            board_type: board.board_type,
        })
    }
}

/// A product that may move on its own (exists and is not grouped).
fn standalone_product<'a>(board: &'a Kanban, id: &ProductId) -> Result<&'a Product, MutationError> {
    let product = board
        .product(id)
        .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })?;
    if let Some(group) = board.group_of(id) {
        return Err(MutationError::ProductInGroup {
            product_id: id.clone(),
            group_id: group.id.clone(),
        });
    }
    Ok(product)
}

fn group_or_err<'a>(board: &'a Kanban, id: &GroupId) -> Result<&'a ProductGroup, MutationError> {
    board
        .group(id)
        .ok_or_else(|| MutationError::GroupNotFound { id: id.clone() })
}

/// The group and all of its members.
fn group_keys(group: &ProductGroup) -> Vec<ItemKey> {
    std::iter::once(ItemKey::Group(group.id.clone()))
        .chain(group.product_ids.iter().cloned().map(ItemKey::Product))
        .collect()
}

/// A product plus the group whose membership list would change if it left.
fn product_keys(board: &Kanban, id: &ProductId) -> Vec<ItemKey> {
    let mut keys = vec![ItemKey::Product(id.clone())];
    if let Some(group) = board.group_of(id) {
        keys.push(ItemKey::Group(group.id.clone()));
    }
    keys
}

fn column_keys(board: &Kanban, column: ColumnStatus) -> Vec<ItemKey> {
    column_items(board, column).into_iter().map(|e| e.key).collect()
}

/// Column order with `key` moved to just before `over`, or `None` when
/// either is not in `column`.
fn order_before(
    board: &Kanban,
    column: ColumnStatus,
    key: &ItemKey,
    over: &ItemKey,
) -> Option<Vec<ItemKey>> {
    let mut order = column_keys(board, column);
    let from = order.iter().position(|k| k == key)?;
    order.remove(from);
    let index = order.iter().position(|k| k == over)?;
    order.insert(index, key.clone());
    Some(order)
}

fn was_auto_transferred(response: &MoveResponse) -> bool {
    response
        .transfer_info
        .as_ref()
        .is_some_and(|t| t.was_auto_transferred)
}

fn refs(order: &[ItemKey]) -> Vec<ItemRef> {
    order.iter().map(ItemRef::from).collect()
}

impl BoardController {
    pub fn new(api: Arc<dyn KanbanApi>, store: BoardStore, settings: ControllerSettings) -> Self {
        Self {
            api,
            coordinator: Coordinator::new(store, settings.timeout),
            terminal_columns: settings.terminal_columns,
        }
    }

    pub fn store(&self) -> &BoardStore {
        self.coordinator.store()
    }

    pub async fn load(&self, kanban_id: &KanbanId) -> Result<(), MutationError> {
        let board = self
            .coordinator
            .request(self.api.load_kanban(kanban_id))
            .await
            .map_err(|e| self.failed(format_args!("load board {}", kanban_id), e.into()))?;
        info!(
            kanban_id = %kanban_id,
            products = board.products.len(),
            groups = board.product_groups.len(),
            "board loaded"
        );
        self.coordinator.load(board)
    }

    /// Replace the local board without a request (e.g. from a push update).
    pub fn load_from(&self, board: Kanban) -> Result<(), MutationError> {
        self.coordinator.load(board)
    }

    fn notify(&self, notice: Notice) {
        self.store().publish(BoardEvent::Notice(notice));
    }

    fn failed(&self, action: fmt::Arguments<'_>, err: MutationError) -> MutationError {
        if let MutationError::Api(api) = &err {
            self.notify(Notice::error(format!("Could not {}: {}", action, api)));
        }
        err
    }

    // -- drag ------------------------------------------------------------

    /// Run a whole drag gesture against the current board and plan the drop.
    pub fn plan_drag(&self, active_id: &str, over: Option<&str>) -> Result<DropPlan, DragError> {
        let board = self.store().board().map_err(|_| DragError::BoardNotLoaded)?;
        let mut session = DragSession::new();
        session.on_drag_start(&board, active_id)?;
        session.on_drag_end(&board, over)
    }

    pub async fn handle_drop(&self, plan: DropPlan) -> Result<DropOutcome, MutationError> {
        match plan {
            DropPlan::NoOp => Ok(DropOutcome::NoOp),
            DropPlan::Reorder { column, order } => {
                self.reorder_column(column, order).await?;
                Ok(DropOutcome::Reordered { column })
            }
            DropPlan::MoveProduct {
                product_id,
                to,
                placement,
            } => {
                let options = MoveOptions {
                    placement,
                    ..MoveOptions::default()
                };
                let outcome = self.move_product(&product_id, to, options).await?;
                Ok(DropOutcome::Product(outcome))
            }
            DropPlan::MoveGroup {
                group_id,
                to,
                placement,
            } => {
                self.move_group(&group_id, to, placement).await?;
                Ok(DropOutcome::GroupMoved {
                    group_id,
                    column: to,
                })
            }
        }
    }

    // -- products --------------------------------------------------------

    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, MutationError> {
        let api = Arc::clone(&self.api);
        let request_id = id.clone();
        let request_patch = patch.clone();
        self.coordinator
            .with_optimistic_mutation(
                "update_product",
                vec![ItemKey::Product(id.clone())],
                |board| {
                    let product = board
                        .product_mut(id)
                        .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })?;
                    patch.apply_to(product);
                    Ok(())
                },
                move |()| async move { api.update_item(&request_id, &request_patch).await },
                |board, server: &Product| board.replace_product(server.clone()),
            )
            .await
            .map_err(|e| self.failed(format_args!("update product {}", id), e))
    }

    /// Move one product to another column. Entering the board's terminal
    /// column hands the product to its transfer destination.
    ///
    /// The product lands at the end of the column first. A `Before`
    /// placement is then saved as a separate reorder; if only that reorder
    /// fails the move stands and `MoveReport::order_error` says why.
    pub async fn move_product(
        &self,
        id: &ProductId,
        to: ColumnStatus,
        options: MoveOptions,
    ) -> Result<MoveOutcome, MutationError> {
        let (name, board_type) = self.store().read(|board| {
            check_column(board, to)?;
            let product = standalone_product(board, id)?;
            Ok::<_, MutationError>((product.name.clone(), board.board_type))
        })??;

        let MoveOptions {
            location_id,
            skip_validation,
            placement,
        } = options;
        let request = MoveRequest {
            product_id: id.clone(),
            column_status: to,
            location_id: location_id.clone(),
            skip_validation,
        };
        let api = Arc::clone(&self.api);

        let result = self
            .coordinator
            .with_optimistic_mutation(
                "move_product",
                vec![ItemKey::Product(id.clone())],
                |board| {
                    let end = board.next_position(to);
                    let product = board
                        .product_mut(id)
                        .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })?;
                    product.column_status = to;
                    product.column_position = Some(end);
                    if let Some(location) = &location_id {
                        product.location_id = Some(location.clone());
                    }
                    Ok(())
                },
                move |()| async move { api.move_item(&request).await },
                |board, response: &MoveResponse| {
                    if was_auto_transferred(response) {
                        board.remove_product(id);
                    } else {
                        board.replace_product(response.product.clone());
                    }
                },
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(MutationError::Api(ApiError::ValidationRequired {
                product_id,
                column_status,
            })) => {
                info!(product_id = %product_id, column = %column_status, "move needs more data");
                return Ok(MoveOutcome::ValidationRequired {
                    product_id,
                    column_status,
                });
            }
            Err(e) => return Err(self.failed(format_args!("move {} to {}", name, to), e)),
        };

        info!(product_id = %id, column = %to, "product moved");
        self.notify(Notice::success(format!("Moved {} to {}", name, to)));

        let order_error = match &placement {
            Placement::Before(over) if !was_auto_transferred(&response) => self
                .place_before(to, &ItemKey::Product(id.clone()), over)
                .await
                .err()
                .map(|e| e.to_string()),
            _ => None,
        };

        let transfer = if self.terminal_columns.is_terminal(board_type, to) {
            self.hand_off(id, response.transfer_info.as_ref()).await
        } else {
            TransferOutcome::NotTriggered
        };
        if let Some(notice) = transfer.notice(&name, to) {
            self.notify(notice);
        }

        Ok(MoveOutcome::Moved(MoveReport {
            product_id: id.clone(),
            product_name: name,
            column: to,
            transfer,
            order_error,
        }))
    }

    /// Re-issue a move the server flagged as needing a location.
    pub async fn retry_move_with_location(
        &self,
        id: &ProductId,
        to: ColumnStatus,
        location_id: String,
    ) -> Result<MoveOutcome, MutationError> {
        let options = MoveOptions {
            location_id: Some(location_id),
            skip_validation: true,
            placement: Placement::End,
        };
        self.move_product(id, to, options).await
    }

    /// Persist a new order for one column. Returns `false` when the order
    /// is unchanged and nothing was sent.
    pub async fn reorder_column(
        &self,
        column: ColumnStatus,
        order: Vec<ItemKey>,
    ) -> Result<bool, MutationError> {
        let (kanban_id, current) = self.store().read(|board| {
            check_column(board, column)?;
            Ok::<_, MutationError>((board.id.clone(), column_keys(board, column)))
        })??;

        let mut expected = current.clone();
        let mut given = order.clone();
        expected.sort();
        given.sort();
        if expected != given {
            return Err(MutationError::ReorderMismatch { column });
        }
        if current == order {
            return Ok(false);
        }

        let api = Arc::clone(&self.api);
        let items = refs(&order);
        self.coordinator
            .with_optimistic_mutation(
                "reorder_column",
                order.clone(),
                |board| {
                    renumber(board, &order);
                    Ok(())
                },
                move |()| async move { api.reorder_column(&kanban_id, column, &items).await },
                |_, _| {},
            )
            .await
            .map_err(|e| self.failed(format_args!("reorder {}", column), e))?;
        info!(column = %column, items = order.len(), "column reordered");
        Ok(true)
    }

    /// Move several products at once. No transfers are started for bulk
    /// moves; the backend handles those.
    pub async fn bulk_move(
        &self,
        ids: &[ProductId],
        to: ColumnStatus,
        location_id: Option<String>,
    ) -> Result<(), MutationError> {
        let mut seen = HashSet::new();
        let ids: Vec<ProductId> = ids
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        self.store().read(|board| {
            check_column(board, to)?;
            ids.iter()
                .try_for_each(|id| standalone_product(board, id).map(|_| ()))
        })??;

        let api = Arc::clone(&self.api);
        let request_ids = ids.clone();
        let request_location = location_id.clone();
        self.coordinator
            .with_optimistic_mutation(
                "bulk_move",
                ids.iter().cloned().map(ItemKey::Product).collect(),
                |board| {
                    let mut next = board.next_position(to);
                    for id in &ids {
                        let product = board
                            .product_mut(id)
                            .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })?;
                        product.column_status = to;
                        product.column_position = Some(next);
                        if let Some(location) = &location_id {
                            product.location_id = Some(location.clone());
                        }
                        next += 1;
                    }
                    Ok(())
                },
                move |()| async move {
                    api.bulk_move(&request_ids, to, request_location.as_deref())
                        .await
                },
                |_, _| {},
            )
            .await
            .map_err(|e| self.failed(format_args!("move {} products to {}", ids.len(), to), e))?;

        info!(column = %to, count = ids.len(), "bulk move confirmed");
        self.notify(Notice::success(format!(
            "Moved {} products to {}",
            ids.len(),
            to
        )));
        Ok(())
    }

    /// Hand a product to another board explicitly.
    pub async fn transfer_product(
        &self,
        id: &ProductId,
        target: &KanbanId,
    ) -> Result<(), MutationError> {
        let (name, destination) = self.store().read(|board| {
            let product = standalone_product(board, id)?;
            Ok::<_, MutationError>((product.name.clone(), board.linked_kanban_name(target)))
        })??;
        self.transfer_leg(id, target)
            .await
            .map_err(|e| self.failed(format_args!("transfer {} to {}", name, destination), e))?;
        self.notify(Notice::success(format!(
            "{} transferred to {}",
            name, destination
        )));
        Ok(())
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), MutationError> {
        let (name, keys) = self.store().read(|board| {
            let product = board
                .product(id)
                .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })?;
            Ok::<_, MutationError>((product.name.clone(), product_keys(board, id)))
        })??;

        let api = Arc::clone(&self.api);
        let request_id = id.clone();
        self.coordinator
            .with_optimistic_mutation(
                "delete_product",
                keys,
                |board| {
                    board
                        .remove_product(id)
                        .map(|_| ())
                        .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })
                },
                move |()| async move { api.delete_item(&request_id).await },
                |_, _| {},
            )
            .await
            .map_err(|e| self.failed(format_args!("delete {}", name), e))?;
        self.notify(Notice::success(format!("Deleted {}", name)));
        Ok(())
    }

    // -- transfers -------------------------------------------------------

    async fn hand_off(&self, id: &ProductId, info: Option<&TransferInfo>) -> TransferOutcome {
        let resolved = self
            .store()
            .read(|board| board.product(id).map(|p| transfer::resolve(board, p, info)));
        if let Err(e) = &resolved {
            warn!(product_id = %id, error = %e, "board unreadable during hand-off");
        }
        let decision = match resolved {
            Ok(Some(decision)) => decision,
            // Already gone from the board (auto-transferred and reconciled).
            Ok(None) | Err(_) => match info.filter(|i| i.was_auto_transferred) {
                Some(info) => TransferDecision::AlreadyTransferred {
                    destination: info
                        .target_kanban_name
                        .clone()
                        .or_else(|| info.target_kanban_id.as_ref().map(|id| id.to_string()))
                        .unwrap_or_else(|| "another board".to_string()),
                    basis: info.transfer_source,
                },
                None => return TransferOutcome::NotTriggered,
            },
        };

        match decision {
            TransferDecision::AlreadyTransferred { destination, basis } => {
                info!(product_id = %id, destination = %destination, "transferred by server");
                TransferOutcome::AutoTransferred { destination, basis }
            }
            TransferDecision::NoDestination => {
                info!(product_id = %id, "no transfer destination configured");
                TransferOutcome::NoDestination
            }
            TransferDecision::Transfer {
                target,
                destination,
                basis,
            } => match self.transfer_leg(id, &target).await {
                Ok(()) => TransferOutcome::Transferred {
                    target,
                    destination,
                    basis,
                },
                Err(e) => {
                    error!(product_id = %id, target = %target, error = %e, "transfer failed");
                    TransferOutcome::Failed {
                        target,
                        destination,
                        error: e.to_string(),
                    }
                }
            },
        }
    }

    async fn transfer_leg(&self, id: &ProductId, target: &KanbanId) -> Result<(), MutationError> {
        let keys = self.store().read(|board| product_keys(board, id))?;
        let api = Arc::clone(&self.api);
        let request_id = id.clone();
        let request_target = target.clone();
        self.coordinator
            .with_optimistic_mutation(
                "transfer_product",
                keys,
                |board| {
                    board
                        .remove_product(id)
                        .map(|_| ())
                        .ok_or_else(|| MutationError::ProductNotFound { id: id.clone() })
                },
                move |()| async move { api.transfer_item(&request_id, &request_target).await },
                |_, _| {},
            )
            .await?;
        info!(product_id = %id, target = %target, "product transferred");
        Ok(())
    }

    // -- groups ----------------------------------------------------------

    /// Groups move as a unit: the group and every member change column in
    /// one local write and one request. A `Before` placement is saved
    /// afterwards as its own reorder, like `move_product`.
    pub async fn move_group(
        &self,
        id: &GroupId,
        to: ColumnStatus,
        placement: Placement,
    ) -> Result<(), MutationError> {
        let (name, keys) = self.store().read(|board| {
            check_column(board, to)?;
            let group = group_or_err(board, id)?;
            Ok::<_, MutationError>((group.name.clone(), group_keys(group)))
        })??;

        let api = Arc::clone(&self.api);
        let request_id = id.clone();
        self.coordinator
            .with_optimistic_mutation(
                "move_group",
                keys,
                |board| {
                    let end = board.next_position(to);
                    let group = board
                        .group_mut(id)
                        .ok_or_else(|| MutationError::GroupNotFound { id: id.clone() })?;
                    group.column_status = to;
                    group.column_position = Some(end);
                    let members = group.product_ids.clone();
                    for member in &members {
                        if let Some(product) = board.product_mut(member) {
                            product.column_status = to;
                        }
                    }
                    Ok(end)
                },
                move |position: i64| async move {
                    let patch = GroupPatch {
                        column_status: Some(to),
                        column_position: Some(position),
                        ..GroupPatch::default()
                    };
                    api.update_group(&request_id, &patch).await
                },
                |_, _| {},
            )
            .await
            .map_err(|e| self.failed(format_args!("move {} to {}", name, to), e))?;

        info!(group_id = %id, column = %to, "group moved");
        self.notify(Notice::success(format!("Moved {} to {}", name, to)));

        if let Placement::Before(over) = &placement
            && let Err(e) = self.place_before(to, &ItemKey::Group(id.clone()), over).await
        {
            warn!(group_id = %id, column = %to, error = %e, "group moved but not placed");
        }
        Ok(())
    }

    /// Save `key` just before `over` in `column`, once `key` is already
    /// there. Does nothing when either item has left the column.
    async fn place_before(
        &self,
        column: ColumnStatus,
        key: &ItemKey,
        over: &ItemKey,
    ) -> Result<bool, MutationError> {
        match self.store().read(|board| order_before(board, column, key, over))? {
            Some(order) => self.reorder_column(column, order).await,
            None => Ok(false),
        }
    }

    /// Create a group from standalone products. Not optimistic: the server
    /// assigns the id, so the group appears once the server confirms.
    pub async fn create_group(&self, new_group: NewGroup) -> Result<ProductGroup, MutationError> {
        let kanban_id = self.store().read(|board| {
            check_column(board, new_group.column_status)?;
            for member in &new_group.product_ids {
                board
                    .product(member)
                    .ok_or_else(|| MutationError::ProductNotFound { id: member.clone() })?;
                if let Some(group) = board.group_of(member) {
                    return Err(MutationError::AlreadyGrouped {
                        product_id: member.clone(),
                        group_id: group.id.clone(),
                    });
                }
            }
            Ok(board.id.clone())
        })??;

        let created = self
            .coordinator
            .request(self.api.create_group(&kanban_id, &new_group))
            .await
            .map_err(|e| self.failed(format_args!("create group {}", new_group.name), e.into()))?;

        let group = created.clone();
        self.coordinator
            .apply_confirmed(group_keys(&created), move |board| {
                for member in &group.product_ids {
                    if let Some(product) = board.product_mut(member) {
                        product.column_status = group.column_status;
                    }
                }
                board.product_groups.push(group);
                Ok(())
            })
            .await?;
        info!(group_id = %created.id, members = created.product_ids.len(), "group created");
        self.notify(Notice::success(format!("Created group {}", created.name)));
        Ok(created)
    }

    pub async fn update_group(&self, id: &GroupId, patch: GroupPatch) -> Result<(), MutationError> {
        let keys = self.store().read(|board| {
            let group = group_or_err(board, id)?;
            if let Some(column) = patch.column_status {
                check_column(board, column)?;
            }
            let mut keys = group_keys(group);
            if let Some(members) = &patch.product_ids {
                for member in members {
                    board
                        .product(member)
                        .ok_or_else(|| MutationError::ProductNotFound { id: member.clone() })?;
                    if let Some(other) = board.group_of(member).filter(|g| &g.id != id) {
                        return Err(MutationError::AlreadyGrouped {
                            product_id: member.clone(),
                            group_id: other.id.clone(),
                        });
                    }
                    keys.push(ItemKey::Product(member.clone()));
                }
            }
            Ok(keys)
        })??;

        let api = Arc::clone(&self.api);
        let request_id = id.clone();
        let request_patch = patch.clone();
        self.coordinator
            .with_optimistic_mutation(
                "update_group",
                keys,
                |board| {
                    let group = board
                        .group_mut(id)
                        .ok_or_else(|| MutationError::GroupNotFound { id: id.clone() })?;
                    if let Some(name) = &patch.name {
                        group.name = name.clone();
                    }
                    if let Some(column) = patch.column_status {
                        group.column_status = column;
                    }
                    if let Some(position) = patch.column_position {
                        group.column_position = Some(position);
                    }
                    if let Some(members) = &patch.product_ids {
                        group.product_ids = members.clone();
                    }
                    let (column, members) = (group.column_status, group.product_ids.clone());
                    for member in &members {
                        if let Some(product) = board.product_mut(member) {
                            product.column_status = column;
                        }
                    }
                    Ok(())
                },
                move |()| async move { api.update_group(&request_id, &request_patch).await },
                |_, _| {},
            )
            .await
            .map_err(|e| self.failed(format_args!("update group {}", id), e))
    }

    /// Dissolve a group. Members stay in the group's column as standalone
    /// products.
    pub async fn delete_group(&self, id: &GroupId) -> Result<(), MutationError> {
        let (name, keys) = self.store().read(|board| {
            let group = group_or_err(board, id)?;
            Ok::<_, MutationError>((group.name.clone(), group_keys(group)))
        })??;

        let api = Arc::clone(&self.api);
        let request_id = id.clone();
        self.coordinator
            .with_optimistic_mutation(
                "delete_group",
                keys,
                |board| {
                    let before = board.product_groups.len();
                    board.product_groups.retain(|g| &g.id != id);
                    if board.product_groups.len() == before {
                        return Err(MutationError::GroupNotFound { id: id.clone() });
                    }
                    Ok(())
                },
                move |()| async move { api.delete_group(&request_id).await },
                |_, _| {},
            )
            .await
            .map_err(|e| self.failed(format_args!("delete group {}", name), e))?;
        self.notify(Notice::success(format!("Deleted group {}", name)));
        Ok(())
    }
}
