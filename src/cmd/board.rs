//! Board view: `stockboard board`.

use anyhow::{Context, Result};
use console::style;

use stockboard::board::aggregate::column_items_all;
use stockboard::board::filter::ProductFilter;
use stockboard::board::models::{ItemKey, Kanban, Product};
use stockboard::config::StockboardConfig;
use stockboard::drag::drag_id;

use super::Session;

pub async fn cmd_board(
    config: &StockboardConfig,
    kanban: &str,
    preset: Option<&str>,
    json: bool,
) -> Result<()> {
    let filter = match preset {
        Some(name) => config
            .toml
            .preset(name)
            .cloned()
            .with_context(|| format!("No preset named '{}' in stockboard.toml", name))?,
        None => ProductFilter::default(),
    };

    let session = Session::open(config, kanban).await?;
    let board = session.controller.store().board()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    println!();
    println!(
        "{} {}",
        style(&board.name).bold(),
        style(format!("({} board)", board.board_type)).dim()
    );
    if let Some(name) = preset {
        println!("{}", style(format!("preset: {}", name)).dim());
    }

    for (column, entries) in column_items_all(&board) {
        if !filter.includes_column(column) {
            continue;
        }
        let visible = filter.apply(&board, &entries);
        println!();
        println!(
            "{} {}",
            style(column.as_str()).cyan().bold(),
            style(format!("[{}]", visible.len())).dim()
        );
        for entry in &visible {
            print_entry(&board, &entry.key);
        }
    }
    println!();
    Ok(())
}

fn print_entry(board: &Kanban, key: &ItemKey) {
    match key {
        ItemKey::Product(id) => {
            if let Some(product) = board.product(id) {
                println!("  {}", product_line(product, &drag_id(key)));
            }
        }
        ItemKey::Group(id) => {
            let Some(group) = board.group(id) else {
                return;
            };
            println!(
                "  {} {} {}",
                style("▸").yellow(),
                style(&group.name).bold(),
                style(drag_id(key)).dim()
            );
            for member in group.product_ids.iter().filter_map(|m| board.product(m)) {
                println!("      {}", product_line(member, member.id.as_str()));
            }
        }
    }
}

fn product_line(product: &Product, id: &str) -> String {
    let mut line = format!("{} {}", product.name, style(id).dim());
    if let Some(quantity) = product.quantity {
        line.push_str(&format!("  x{}", quantity));
    }
    if let Some(supplier) = &product.supplier {
        line.push_str(&format!("  {}", style(supplier).dim()));
    }
    line
}
