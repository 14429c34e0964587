//! CLI command implementations.
//!
//! | Module   | Commands handled                                              |
//! |----------|---------------------------------------------------------------|
//! | `board`  | `Board`                                                       |
//! | `mutate` | `Move`, `Drag`, `Reorder`, `Transfer`, `BulkMove`, `Delete`  |
//! | `config` | `Config`                                                      |

pub mod board;
pub mod config;
pub mod mutate;

pub use board::cmd_board;
pub use config::cmd_config;
pub use mutate::{cmd_bulk_move, cmd_delete, cmd_drag, cmd_move, cmd_reorder, cmd_transfer};

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use tokio::sync::broadcast::{self, error::TryRecvError};

use stockboard::api::HttpKanbanApi;
use stockboard::board::models::KanbanId;
use stockboard::board::store::{BoardEvent, BoardStore};
use stockboard::config::StockboardConfig;
use stockboard::notice::{Notice, NoticeLevel};
use stockboard::sync::BoardController;

/// A loaded board plus the event stream its notices arrive on.
pub struct Session {
    pub controller: BoardController,
    events: broadcast::Receiver<BoardEvent>,
}

impl Session {
    pub async fn open(config: &StockboardConfig, kanban: &str) -> Result<Self> {
        let api = HttpKanbanApi::new(&config.base_url(), config.token(), config.timeout())
            .context("Failed to create API client")?;
        let store = BoardStore::new();
        let events = store.subscribe();
        let controller = BoardController::new(Arc::new(api), store, config.controller_settings());
        controller
            .load(&KanbanId::from(kanban))
            .await
            .with_context(|| format!("Failed to load board {}", kanban))?;
        Ok(Self { controller, events })
    }

    /// Print every notice published since the last call.
    pub fn flush_notices(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(BoardEvent::Notice(notice)) => print_notice(&notice),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }
}

pub fn print_notice(notice: &Notice) {
    let marker = match notice.level {
        NoticeLevel::Success => style("✓").green(),
        NoticeLevel::Info => style("i").cyan(),
        NoticeLevel::Error => style("✗").red(),
    };
    println!("{} {}", marker, notice.message);
}
