//! Cross-board transfer resolution.
//!
//! When a product enters its board's terminal column it is handed to another
//! board. The destination is picked in this order:
//!
//! 1. the server already transferred it (`wasAutoTransferred`);
//! 2. the product's `preferredReceiveKanbanId`;
//! 3. the board's `defaultLinkedKanbanId`;
//! 4. nowhere: the move stands and the user is told no destination is set.

use std::collections::HashMap;

use crate::api::{TransferBasis, TransferInfo};
use crate::board::models::{BoardType, ColumnStatus, Kanban, KanbanId, Product};
use crate::notice::Notice;

/// Terminal column per board type. Defaults come from `BoardType`; config may
/// override or disable them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalColumns(HashMap<BoardType, Option<ColumnStatus>>);

impl Default for TerminalColumns {
    fn default() -> Self {
        Self(
            BoardType::ALL
                .iter()
                .map(|bt| (*bt, bt.default_terminal_column()))
                .collect(),
        )
    }
}

impl TerminalColumns {
    pub fn get(&self, board_type: BoardType) -> Option<ColumnStatus> {
        self.0.get(&board_type).copied().flatten()
    }

    pub fn with_override(mut self, board_type: BoardType, column: Option<ColumnStatus>) -> Self {
        self.0.insert(board_type, column);
        self
    }

    pub fn is_terminal(&self, board_type: BoardType, column: ColumnStatus) -> bool {
        self.get(board_type) == Some(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferDecision {
    AlreadyTransferred {
        destination: String,
        basis: Option<TransferBasis>,
    },
    Transfer {
        target: KanbanId,
        destination: String,
        basis: TransferBasis,
    },
    NoDestination,
}

pub fn resolve(board: &Kanban, product: &Product, info: Option<&TransferInfo>) -> TransferDecision {
    if let Some(info) = info.filter(|i| i.was_auto_transferred) {
        let destination = match (&info.target_kanban_name, &info.target_kanban_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => board.linked_kanban_name(id),
            (None, None) => "another board".to_string(),
        };
        return TransferDecision::AlreadyTransferred {
            destination,
            basis: info.transfer_source,
        };
    }

    let (target, basis) = match (
        &product.preferred_receive_kanban_id,
        &board.default_linked_kanban_id,
    ) {
        (Some(preferred), _) => (preferred, TransferBasis::ProductPreference),
        (None, Some(default)) => (default, TransferBasis::KanbanDefault),
        (None, None) => return TransferDecision::NoDestination,
    };
    TransferDecision::Transfer {
        target: target.clone(),
        destination: board.linked_kanban_name(target),
        basis,
    }
}

/// What happened to a product after it reached the terminal column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The column is not terminal, or the item was a group or bulk move.
    NotTriggered,
    AutoTransferred {
        destination: String,
        basis: Option<TransferBasis>,
    },
    Transferred {
        target: KanbanId,
        destination: String,
        basis: TransferBasis,
    },
    NoDestination,
    /// The column move stands; only the hand-off failed.
    Failed {
        target: KanbanId,
        destination: String,
        error: String,
    },
}

impl TransferOutcome {
    pub fn left_board(&self) -> bool {
        matches!(self, Self::AutoTransferred { .. } | Self::Transferred { .. })
    }

    pub fn notice(&self, product_name: &str, column: ColumnStatus) -> Option<Notice> {
        match self {
            Self::NotTriggered => None,
            Self::AutoTransferred { destination, basis } => {
                let via = basis
                    .map(|b| format!(" (via {})", b.describe()))
                    .unwrap_or_default();
                Some(Notice::success(format!(
                    "{} transferred to {}{}",
                    product_name, destination, via
                )))
            }
            Self::Transferred {
                destination, basis, ..
            } => Some(Notice::success(format!(
                "{} transferred to {} (via {})",
                product_name,
                destination,
                basis.describe()
            ))),
            Self::NoDestination => Some(Notice::info(format!(
                "{} stays in {}: no receive board is configured",
                product_name, column
            ))),
            Self::Failed {
                destination, error, ..
            } => Some(Notice::error(format!(
                "{} moved to {} but transfer to {} failed: {}",
                product_name, column, destination, error
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixtures::*;
    use crate::board::models::ColumnStatus::*;

    fn info(auto: bool) -> TransferInfo {
        TransferInfo {
            was_auto_transferred: auto,
            target_kanban_id: Some(KanbanId::from("recv-7")),
            target_kanban_name: None,
            transfer_source: Some(TransferBasis::ProductPreference),
        }
    }

    #[test]
    fn test_default_terminal_columns() {
        let terminal = TerminalColumns::default();
        assert_eq!(terminal.get(BoardType::Order), Some(Purchased));
        assert_eq!(terminal.get(BoardType::Receive), None);
        assert!(terminal.is_terminal(BoardType::Order, Purchased));
        assert!(!terminal.is_terminal(BoardType::Order, Ordered));
    }

    #[test]
    fn test_override_terminal_column() {
        let terminal = TerminalColumns::default()
            .with_override(BoardType::Order, Some(Ordered))
            .with_override(BoardType::Receive, Some(Stored));
        assert!(terminal.is_terminal(BoardType::Order, Ordered));
        assert!(!terminal.is_terminal(BoardType::Order, Purchased));
        assert_eq!(terminal.get(BoardType::Receive), Some(Stored));
    }

    #[test]
    fn test_auto_transfer_wins_and_names_destination() {
        let board = order_board(vec![], vec![]);
        let mut p = product("p1", Purchased, None, 1);
        p.preferred_receive_kanban_id = Some(KanbanId::from("recv-42"));
        assert_eq!(
            resolve(&board, &p, Some(&info(true))),
            TransferDecision::AlreadyTransferred {
                destination: "Lab Stores".into(),
                basis: Some(TransferBasis::ProductPreference),
            }
        );
    }

    #[test]
    fn test_preference_beats_board_default() {
        let mut board = order_board(vec![], vec![]);
        board.default_linked_kanban_id = Some(KanbanId::from("recv-7"));
        let mut p = product("p1", Purchased, None, 1);
        p.preferred_receive_kanban_id = Some(KanbanId::from("recv-42"));
        assert_eq!(
            resolve(&board, &p, Some(&info(false))),
            TransferDecision::Transfer {
                target: KanbanId::from("recv-42"),
                destination: "Main Warehouse".into(),
                basis: TransferBasis::ProductPreference,
            }
        );
    }

    #[test]
    fn test_board_default_used_without_preference() {
        let mut board = order_board(vec![], vec![]);
        board.default_linked_kanban_id = Some(KanbanId::from("recv-42"));
        let p = product("p1", Purchased, None, 1);
        assert_eq!(
            resolve(&board, &p, None),
            TransferDecision::Transfer {
                target: KanbanId::from("recv-42"),
                destination: "Main Warehouse".into(),
                basis: TransferBasis::KanbanDefault,
            }
        );
    }

    #[test]
    fn test_no_destination() {
        let board = order_board(vec![], vec![]);
        let p = product("p1", Purchased, None, 1);
        assert_eq!(resolve(&board, &p, None), TransferDecision::NoDestination);
    }

    #[test]
    fn test_unlinked_destination_falls_back_to_id() {
        let board = order_board(vec![], vec![]);
        let mut p = product("p1", Purchased, None, 1);
        p.preferred_receive_kanban_id = Some(KanbanId::from("recv-99"));
        match resolve(&board, &p, None) {
            TransferDecision::Transfer { destination, .. } => assert_eq!(destination, "recv-99"),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_outcome_notices() {
        let ok = TransferOutcome::Transferred {
            target: KanbanId::from("recv-42"),
            destination: "Main Warehouse".into(),
            basis: TransferBasis::KanbanDefault,
        };
        let notice = ok.notice("Cable", Purchased).unwrap();
        assert!(!notice.is_error());
        assert!(notice.message.contains("Main Warehouse"));
        assert!(notice.message.contains("board default"));
        assert!(ok.left_board());

        let none = TransferOutcome::NoDestination.notice("Cable", Purchased).unwrap();
        assert_eq!(none.level, crate::notice::NoticeLevel::Info);

        let failed = TransferOutcome::Failed {
            target: KanbanId::from("recv-42"),
            destination: "Main Warehouse".into(),
            error: "boom".into(),
        };
        assert!(failed.notice("Cable", Purchased).unwrap().is_error());
        assert!(!failed.left_board());
        assert_eq!(TransferOutcome::NotTriggered.notice("Cable", Purchased), None);
    }
}
