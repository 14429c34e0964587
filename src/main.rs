use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stockboard::board::models::ColumnStatus;
use stockboard::config::StockboardConfig;
use stockboard::logging::{self, LogFormat};

mod cmd;

#[derive(Parser)]
#[command(name = "stockboard")]
#[command(version, about = "Inventory kanban client - move, reorder and transfer products")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Backend base URL. Overrides stockboard.toml and STOCKBOARD_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds. Overrides stockboard.toml.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a board column by column
    Board {
        kanban: String,
        /// Apply a saved filter from [presets.<name>]
        #[arg(long)]
        preset: Option<String>,
        /// Print the raw board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a product to another column
    Move {
        kanban: String,
        product: String,
        column: ColumnStatus,
        /// Location to record with the move (retried automatically if the
        /// server asks for one)
        #[arg(long)]
        location: Option<String>,
    },
    /// Drop one item onto a column or another item, as a drag would
    Drag {
        kanban: String,
        /// Product id or group-<id>
        active: String,
        /// Column name, product id or group-<id>. Omit to cancel the drag.
        #[arg(long)]
        over: Option<String>,
    },
    /// Set the full order of one column
    Reorder {
        kanban: String,
        column: ColumnStatus,
        /// Every item of the column in the new order (product id or group-<id>)
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Hand a product to a linked board
    Transfer {
        kanban: String,
        product: String,
        target: String,
    },
    /// Move several products to one column
    BulkMove {
        kanban: String,
        column: ColumnStatus,
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete a product
    Delete { kanban: String, product: String },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default stockboard.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if let Commands::Config { command } = &cli.command {
        logging::init(cli.verbose, LogFormat::default());
        return cmd::cmd_config(&project_dir, command.clone());
    }

    let config = StockboardConfig::with_cli_args(
        project_dir,
        cli.verbose,
        cli.api_url.clone(),
        cli.timeout_secs,
    )?;
    logging::init(cli.verbose, config.log_format());

    match &cli.command {
        Commands::Board {
            kanban,
            preset,
            json,
        } => cmd::cmd_board(&config, kanban, preset.as_deref(), *json).await?,
        Commands::Move {
            kanban,
            product,
            column,
            location,
        } => cmd::cmd_move(&config, kanban, product, *column, location.clone()).await?,
        Commands::Drag {
            kanban,
            active,
            over,
        } => cmd::cmd_drag(&config, kanban, active, over.as_deref()).await?,
        Commands::Reorder {
            kanban,
            column,
            ids,
        } => cmd::cmd_reorder(&config, kanban, *column, ids).await?,
        Commands::Transfer {
            kanban,
            product,
            target,
        } => cmd::cmd_transfer(&config, kanban, product, target).await?,
        Commands::BulkMove {
            kanban,
            column,
            ids,
            location,
        } => cmd::cmd_bulk_move(&config, kanban, *column, ids, location.clone()).await?,
        Commands::Delete { kanban, product } => cmd::cmd_delete(&config, kanban, product).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
