//! Board mutations from the command line.

use anyhow::{Result, bail};
use console::style;

use stockboard::board::models::{ColumnStatus, KanbanId, ProductId};
use stockboard::config::StockboardConfig;
use stockboard::drag::parse_drag_id;
use stockboard::sync::{DropOutcome, MoveOptions, MoveOutcome};

use super::Session;

pub async fn cmd_move(
    config: &StockboardConfig,
    kanban: &str,
    product: &str,
    column: ColumnStatus,
    location: Option<String>,
) -> Result<()> {
    let mut session = Session::open(config, kanban).await?;
    let id = ProductId::from(product);
    let options = MoveOptions {
        location_id: location.clone(),
        ..MoveOptions::default()
    };

    let result = session.controller.move_product(&id, column, options).await;
    let outcome = match result {
        Ok(MoveOutcome::ValidationRequired { product_id, column_status }) => match location {
            Some(location) => {
                session
                    .controller
                    .retry_move_with_location(&product_id, column_status, location)
                    .await
            }
            None => Ok(MoveOutcome::ValidationRequired {
                product_id,
                column_status,
            }),
        },
        other => other,
    };
    session.flush_notices();

    report_move(outcome?)
}

fn report_move(outcome: MoveOutcome) -> Result<()> {
    match outcome {
        MoveOutcome::Moved(_) => Ok(()),
        MoveOutcome::ValidationRequired {
            product_id,
            column_status,
        } => {
            println!(
                "{} {} needs a location before it can enter {}",
                style("!").yellow(),
                product_id,
                column_status
            );
            println!("  Re-run with --location <id>");
            bail!("Move of {} to {} needs more information", product_id, column_status)
        }
    }
}

pub async fn cmd_drag(
    config: &StockboardConfig,
    kanban: &str,
    active: &str,
    over: Option<&str>,
) -> Result<()> {
    let mut session = Session::open(config, kanban).await?;
    let plan = session.controller.plan_drag(active, over)?;
    let result = session.controller.handle_drop(plan).await;
    session.flush_notices();

    match result? {
        DropOutcome::NoOp => println!("Nothing to do"),
        DropOutcome::Reordered { column } => {
            println!("{} Reordered {}", style("✓").green(), column)
        }
        DropOutcome::Product(outcome) => report_move(outcome)?,
        DropOutcome::GroupMoved { .. } => {}
    }
    Ok(())
}

pub async fn cmd_reorder(
    config: &StockboardConfig,
    kanban: &str,
    column: ColumnStatus,
    ids: &[String],
) -> Result<()> {
    let mut session = Session::open(config, kanban).await?;
    let board = session.controller.store().board()?;
    let order = ids
        .iter()
        .map(|id| parse_drag_id(&board, id))
        .collect::<Result<Vec<_>, _>>()?;

    let result = session.controller.reorder_column(column, order).await;
    session.flush_notices();
    if result? {
        println!("{} Reordered {}", style("✓").green(), column);
    } else {
        println!("{} is already in that order", column);
    }
    Ok(())
}

pub async fn cmd_transfer(
    config: &StockboardConfig,
    kanban: &str,
    product: &str,
    target: &str,
) -> Result<()> {
    let mut session = Session::open(config, kanban).await?;
    let result = session
        .controller
        .transfer_product(&ProductId::from(product), &KanbanId::from(target))
        .await;
    session.flush_notices();
    result?;
    Ok(())
}

pub async fn cmd_bulk_move(
    config: &StockboardConfig,
    kanban: &str,
    column: ColumnStatus,
    ids: &[String],
    location: Option<String>,
) -> Result<()> {
    let mut session = Session::open(config, kanban).await?;
    let ids: Vec<ProductId> = ids.iter().map(|id| ProductId::from(id.as_str())).collect();
    let result = session.controller.bulk_move(&ids, column, location).await;
    session.flush_notices();
    result?;
    Ok(())
}

pub async fn cmd_delete(config: &StockboardConfig, kanban: &str, product: &str) -> Result<()> {
    let mut session = Session::open(config, kanban).await?;
    let result = session
        .controller
        .delete_product(&ProductId::from(product))
        .await;
    session.flush_notices();
    result?;
    Ok(())
}
