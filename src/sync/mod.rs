//! Optimistic synchronization between the local board and the backend.
//!
//! | Module       | Role                                                     |
//! |--------------|----------------------------------------------------------|
//! | `snapshot`   | exact pre-mutation copies for rollback                   |
//! | `optimistic` | per-item locks, timeout, apply/reconcile/rollback        |
//! | `controller` | board operations, drag drops, terminal-column transfers  |

pub mod controller;
pub mod optimistic;
mod snapshot;

pub use controller::{
    BoardController, ControllerSettings, DropOutcome, MoveOptions, MoveOutcome, MoveReport,
};
pub use optimistic::{Coordinator, DEFAULT_REQUEST_TIMEOUT};
