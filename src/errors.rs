//! Typed error hierarchy for the board client.
//!
//! Three enums cover the three layers:
//! - `ApiError`: REST boundary failures, including validation-required moves
//! - `MutationError`: optimistic mutations against the local board
//! - `DragError`: a drag gesture that cannot be resolved against the board

use std::time::Duration;

use thiserror::Error;

use crate::board::models::{BoardType, ColumnStatus, GroupId, ProductId};

/// Errors from the REST backend or the transport underneath it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The move needs supplementary input (e.g. a location) before the server
    /// will accept it. Not a hard failure: the caller collects the data and
    /// retries.
    #[error("Product {product_id} needs more information before entering {column_status}")]
    ValidationRequired {
        product_id: ProductId,
        column_status: ColumnStatus,
    },

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_validation_required(&self) -> bool {
        matches!(self, Self::ValidationRequired { .. })
    }
}

/// Errors from applying a mutation to the local board.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("No board is loaded")]
    BoardNotLoaded,

    #[error("Product {id} not found")]
    ProductNotFound { id: ProductId },

    #[error("Group {id} not found")]
    GroupNotFound { id: GroupId },

    #[error("Column '{column}' does not exist on {board_type} boards")]
    InvalidColumn {
        column: ColumnStatus,
        board_type: BoardType,
    },

    #[error("Product {product_id} belongs to group {group_id}; move the group instead")]
    ProductInGroup {
        product_id: ProductId,
        group_id: GroupId,
    },

    #[error("Product {product_id} already belongs to group {group_id}")]
    AlreadyGrouped {
        product_id: ProductId,
        group_id: GroupId,
    },

    #[error("New order for column '{column}' does not match its current items")]
    ReorderMismatch { column: ColumnStatus },

    #[error("Board store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MutationError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors from resolving a drag gesture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragError {
    #[error("No drag in progress")]
    NotDragging,

    #[error("Unknown drag item '{id}'")]
    UnknownItem { id: String },

    #[error("Unknown drop target '{id}'")]
    UnknownTarget { id: String },

    #[error("Column '{column}' does not exist on {board_type} boards")]
    InvalidColumn {
        column: ColumnStatus,
        board_type: BoardType,
    },

    #[error("No board is loaded")]
    BoardNotLoaded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_validation_required_carries_details() {
        let err = ApiError::ValidationRequired {
            product_id: ProductId::from("p1"),
            column_status: ColumnStatus::Purchased,
        };
        assert!(err.is_validation_required());
        assert!(err.to_string().contains("p1"));
        assert!(err.to_string().contains("purchased"));
    }

    #[test]
    fn mutation_error_converts_from_api_error() {
        let err: MutationError = ApiError::Transport("connection refused".into()).into();
        match err.api() {
            Some(ApiError::Transport(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("Expected Transport, got {:?}", other),
        }
    }

    #[test]
    fn mutation_error_invalid_column_names_board_type() {
        let err = MutationError::InvalidColumn {
            column: ColumnStatus::Stored,
            board_type: BoardType::Order,
        };
        assert_eq!(
            err.to_string(),
            "Column 'stored' does not exist on order boards"
        );
    }

    #[test]
    fn timeout_is_not_validation_required() {
        let err = ApiError::Timeout(Duration::from_secs(15));
        assert!(!err.is_validation_required());
        assert!(err.to_string().contains("15s"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ApiError::Decode("x".into()));
        assert_std_error(&MutationError::LockPoisoned);
        assert_std_error(&DragError::NotDragging);
    }
}
