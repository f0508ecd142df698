//! CraftCart CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! craftcart migrate
//!
//! # Replace the product catalog with the bundled seed data
//! craftcart seed
//!
//! # Seed from another catalog file
//! craftcart seed --file path/to/catalog.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `CRAFTCART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "craftcart")]
#[command(author, version, about = "CraftCart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Clear the products and seed artisans, categories and products
    Seed {
        /// YAML catalog to load
        #[arg(short, long, default_value = commands::seed::DEFAULT_CATALOG)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            let summary = commands::seed::run(&file).await?;
            tracing::info!(
                artisans_created = summary.artisans_created,
                categories_created = summary.categories_created,
                products = summary.products,
                "Seeding complete"
            );
        }
    }
    Ok(())
}
