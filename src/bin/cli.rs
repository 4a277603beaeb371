//! Assayer CLI
//!
//! Command-line interface for Assayer operations:
//! - Value an item sheet offline
//! - Check item weights
//! - Inspect the route table and proxy map
//! - Check a running backend
//! - Generate a config file

use anyhow::{bail, Context};
use assayer::proxy::{ProxyMap, DEFAULT_BACKEND_ORIGIN};
use assayer::routing::RouteTable;
use assayer::table::Table;
use assayer::valuation;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "assayer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jewellery metal valuation tools")]
#[command(long_about = "Assayer values jewellery item sheets against metal price lists.\nRun calculations offline or inspect how the client routes and proxies requests.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Value an item sheet against a price sheet
    Calculate {
        /// Item sheet (CSV with weight, misc, material)
        #[arg(long)]
        items: PathBuf,
        /// Price sheet (CSV with material, price)
        #[arg(long)]
        prices: PathBuf,
        /// Output file (default: calculated_result.csv)
        #[arg(short, long, default_value = "calculated_result.csv")]
        output: PathBuf,
        /// Treat blank weights as missing and sort by box_no, box_id
        #[arg(long)]
        fixed: bool,
    },

    /// List rows whose weight cannot be read
    CheckWeights {
        /// Item sheet
        #[arg(long)]
        items: PathBuf,
    },

    /// Show the route table, or resolve a path against it
    Routes {
        /// Path to resolve
        path: Option<String>,
    },

    /// Show where the development proxy sends a path
    Proxy {
        /// Request path (with optional query)
        path: String,
        /// Backend origin
        #[arg(long, default_value = DEFAULT_BACKEND_ORIGIN)]
        origin: String,
    },

    /// Check that a backend is reachable
    Ping {
        /// API server URL
        #[arg(long, default_value = DEFAULT_BACKEND_ORIGIN)]
        api_url: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            items,
            prices,
            output,
            fixed,
        } => {
            let mut item_table = read_table(&items)?;
            let price_table = read_table(&prices)?;

            if fixed {
                valuation::calculate_fixed(&mut item_table, &price_table)?;
            } else {
                valuation::calculate(&mut item_table, &price_table)?;
            }

            let bytes = item_table.to_csv_bytes(true)?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Valued {} items -> {:?}", item_table.len(), output);
        }

        Commands::CheckWeights { items } => {
            let table = read_table(&items)?;
            let invalid = valuation::find_invalid_weights(&table);

            if cli.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "invalid_weights": invalid }))?
                );
            } else if invalid.is_empty() {
                println!("All {} weights are readable.", table.len());
            } else {
                println!("{:<6} {:<10} {:<10} {}", "Row", "Box No", "Box ID", "Weight");
                println!("{}", "-".repeat(44));
                for row in &invalid {
                    println!(
                        "{:<6} {:<10} {:<10} {}",
                        row.index, row.box_no, row.box_id, row.weight
                    );
                }
                println!();
                println!("{} of {} weights need fixing", invalid.len(), table.len());
            }
        }

        Commands::Routes { path } => {
            let routes = RouteTable::standard();

            match path {
                Some(path) => match routes.resolve(&path) {
                    Some(matched) => {
                        println!("{} -> {} ({})", path, matched.name, matched.page.title());
                        for (name, value) in &matched.params {
                            println!("  {} = {}", name, value);
                        }
                    }
                    None => {
                        println!("{} -> NotFound", path);
                    }
                },
                None => {
                    println!("{:<16} {:<20} {}", "Path", "Name", "Page");
                    println!("{}", "-".repeat(56));
                    for entry in routes.entries() {
                        println!(
                            "{:<16} {:<20} {}",
                            entry.path(),
                            entry.name(),
                            entry.page().title()
                        );
                    }
                }
            }
        }

        Commands::Proxy { path, origin } => {
            let map = ProxyMap::development(&origin)?;

            match map.rewrite(&path) {
                Some(target) => println!("{} -> {}", path, target),
                None => println!("{} -> (served by the client shell)", path),
            }
        }

        Commands::Ping { api_url } => {
            let url = format!("{}/ping", api_url.trim_end_matches('/'));
            let response = reqwest::get(&url)
                .await
                .with_context(|| format!("Cannot connect to Assayer API at {}", api_url))?;

            if !response.status().is_success() {
                bail!("API returned error: {}", response.status());
            }

            let body: serde_json::Value = response.json().await?;
            println!(
                "{}: {}",
                api_url,
                body["message"].as_str().unwrap_or("unknown")
            );
        }

        Commands::Config { output } => {
            let config = assayer::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn read_table(path: &Path) -> anyhow::Result<Table> {
    let bytes = std::fs::read(path).with_context(|| format!("File not found: {:?}", path))?;
    Table::from_csv_bytes(&bytes).with_context(|| format!("Failed to read CSV {:?}", path))
}
