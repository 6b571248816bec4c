//! Customer grid demo.
//!
//! Simulates a user arrowing down through a customer list. Each focus change
//! would normally trigger an expensive "load orders" request; the debouncer
//! collapses the burst into a single load once navigation pauses.
//!
//! Run with: cargo run -p horizon-gridkit --example customer_grid
//! Set RUST_LOG=horizon_gridkit=trace to see every notification.

use std::sync::Arc;
use std::time::Duration;

use horizon_gridkit::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Customer {
    id: &'static str,
    name: &'static str,
    overdue: bool,
}

const CUSTOMERS: &[Customer] = &[
    Customer { id: "ALFKI", name: "Alfreds Futterkiste", overdue: false },
    Customer { id: "ANATR", name: "Ana Trujillo Emparedados", overdue: true },
    Customer { id: "ANTON", name: "Antonio Moreno Taqueria", overdue: false },
    Customer { id: "AROUT", name: "Around the Horn", overdue: false },
    Customer { id: "BERGS", name: "Berglunds snabbkop", overdue: true },
];

async fn load_orders(customer: Customer) -> Result<(), BoxError> {
    tokio::time::sleep(Duration::from_millis(120)).await;
    if customer.id == "BERGS" {
        return Err(format!("orders for {} are archived", customer.name).into());
    }
    println!("loaded orders for {} ({})", customer.name, customer.id);
    Ok(())
}

#[tokio::main]
async fn main() -> horizon_gridkit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("horizon_gridkit=debug")))
        .init();

    let table = Arc::new(TableGrid::with_rows(CUSTOMERS.iter().cloned().map(RowData::new).collect()));
    let grid: Arc<dyn GridView> = table.clone();

    grid.set_row_style_conditionally(
        |row| row.downcast_ref::<Customer>().is_some_and(|c| c.overdue),
        Color::RED,
        Some(Color::from_rgb8(255, 235, 235)),
    );

    let spinner = Arc::new(VisibilityFlag::new());
    spinner
        .visibility_changed
        .connect(|visible| println!("spinner {}", if *visible { "shown" } else { "hidden" }));

    let config = DebounceConfig::from_toml_str("delay_ms = 250")?;
    let debouncer = GridDebouncer::builder(grid.clone(), |row| row.downcast_ref::<Customer>().cloned(), load_orders)
        .config(config)
        .busy_indicator(spinner.clone())
        .build()?;
    debouncer
        .reaction_failed()
        .connect(|error| eprintln!("could not load orders: {error}"));

    // Arrow down through the first three rows quickly, then pause.
    grid.focus_first_row();
    for row in 1..3 {
        tokio::time::sleep(Duration::from_millis(60)).await;
        grid.set_focused_row_handle(RowHandle::new(row));
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Jump to the end, which fails to load.
    grid.focus_last_row();
    grid.scroll_to_focused_row();
    tokio::time::sleep(Duration::from_millis(500)).await;

    for index in 0..grid.row_count() {
        let handle = RowHandle::from_index(index);
        if let Some(appearance) = table.row_appearance(handle) {
            println!("{handle}: {appearance:?}");
        }
    }

    debouncer.dispose();
    Ok(())
}
