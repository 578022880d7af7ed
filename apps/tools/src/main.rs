use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use url::Url;

use client_core::filter::request_url;
use client_core::{
    CellContent, CellState, ColumnEnrichmentController, FilterState, HttpInventoryApi,
    InventoryApi, MemoryTable, TableHandle, COLUMN_ACTIONS,
};
use shared::domain::NetboxId;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the configured API root.
    #[arg(long)]
    api_root: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Device id filter; repeat to accumulate.
    #[arg(long = "netbox")]
    netbox: Vec<i64>,
    #[arg(long)]
    ifclass: Option<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    ifoperstatus: Option<String>,
}

impl FilterArgs {
    fn into_state(self) -> FilterState {
        FilterState {
            netbox: self.netbox.into_iter().map(NetboxId).collect(),
            ifclass: self.ifclass.filter(|v| !v.is_empty()),
            search: self.search.filter(|v| !v.is_empty()),
            ifoperstatus: self.ifoperstatus.filter(|v| !v.is_empty()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the interface-list request URL for the given filters.
    Query {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Fetch one page of interfaces and print it.
    Fetch {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Fetch one page, run a dynamic-column pass and print the cells.
    Enrich {
        #[command(flatten)]
        filters: FilterArgs,
        /// Dynamic column to enrich; repeat for more. Defaults to all.
        #[arg(long = "column")]
        columns: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let settings = load_settings();
    let api_root = cli.api_root.unwrap_or(settings.api_root);
    let api_root =
        Url::parse(&api_root).with_context(|| format!("invalid api root {api_root:?}"))?;

    match cli.command {
        Command::Query { filters } => {
            let url = request_url(&api_root, &filters.into_state())?;
            println!("{url}");
        }
        Command::Fetch { filters } => {
            let api = HttpInventoryApi::new(api_root.clone());
            let url = request_url(&api_root, &filters.into_state())?;
            let page = api.fetch_interfaces(&url).await?;
            println!("{} interfaces total", page.count);
            for row in &page.results {
                println!(
                    "{:>6}  {:<24} oper={:<4} alias={}",
                    row.id.0,
                    row.ifname,
                    if row.ifoperstatus.is_up() { "up" } else { "down" },
                    row.ifalias.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Enrich { filters, columns } => {
            let api: Arc<dyn InventoryApi> = Arc::new(HttpInventoryApi::new(api_root.clone()));
            let table = MemoryTable::new(Arc::clone(&api));
            let columns = if columns.is_empty() {
                COLUMN_ACTIONS
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect()
            } else {
                columns
            };
            for column in &columns {
                table.set_column_visible(column, true).await;
            }
            let url = request_url(&api_root, &filters.into_state())?;
            table.reload(url).await?;

            let enrichment = ColumnEnrichmentController::new(table.clone(), Arc::clone(&api));
            enrichment.run_draw_to_completion().await;

            for row in table.current_page().await {
                print!("{:>6}  {:<24}", row.id.0, row.ifname);
                for column in &columns {
                    match table.cell_state(row.id, column).await {
                        CellState::Pending => print!("  {column}: -"),
                        CellState::Loaded(CellContent::Text(text)) => {
                            print!("  {column}: {text}")
                        }
                        CellState::Loaded(CellContent::Sparklines(charts)) => {
                            print!("  {column}: {}", charts.join(" "))
                        }
                        CellState::Unavailable(reason) => {
                            print!("  {column}: unavailable ({reason})")
                        }
                    }
                }
                println!();
            }
        }
    }

    Ok(())
}
