use anyhow::Result;
use clap::{Parser, Subcommand};
use forecast_core::{init_tracing, load_config};
use forecast_store::SalesStore;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sales-ingest")]
#[command(about = "Populate the sales record store", long_about = None)]
struct Cli {
    /// Overrides `store_path` from configuration
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the sales table with rows from a CSV file
    Bootstrap {
        /// CSV with `date,product_id,quantity_sold` columns (defaults to `csv_path`)
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Append one synthetic sale for a random product
    AddSale,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config("sales-ingest").await?;
    init_tracing(&cfg.service_name, &cfg.log_level)?;

    let store_path = cli.store.unwrap_or_else(|| cfg.store_path.clone());
    let store = SalesStore::open(&store_path)?;
    match cli.command {
        Commands::Bootstrap { csv } => {
            let csv = csv.unwrap_or_else(|| cfg.csv_path.clone());
            let count = sales_ingest::bootstrap(&store, &csv)?;
            info!(count, store = %store_path.display(), "bootstrap complete");
        }
        Commands::AddSale => {
            sales_ingest::add_sale(&store)?;
        }
    }
    Ok(())
}
