//! Shop Persona CLI - seeding and ad-hoc lookups against a store.
//!
//! # Usage
//!
//! ```bash
//! # Seed the built-in sample catalogue
//! persona-cli seed
//!
//! # Seed from a YAML plan, validating only
//! persona-cli seed --file seed.yaml --dry-run
//!
//! # Print the personalization payload for a customer
//! persona-cli personalize 123
//!
//! # Target a different store than SHOPIFY_SHOP
//! persona-cli --shop other.myshopify.com --access-token shpat_... personalize 123
//! ```
//!
//! # Commands
//!
//! - `seed` - Create sample products and customers
//! - `personalize` - Run the personalization chain for one customer

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "persona-cli")]
#[command(author, version, about = "Shop Persona CLI tools")]
struct Cli {
    /// Shop domain or origin (overrides `SHOPIFY_SHOP`)
    #[arg(long, global = true)]
    shop: Option<String>,

    /// Admin API access token (overrides `SHOPIFY_ACCESS_TOKEN`)
    #[arg(long, global = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create sample products and customers
    Seed {
        /// YAML seed plan (defaults to the built-in sample)
        #[arg(short, long)]
        file: Option<String>,

        /// Validate the plan without creating anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the personalization payload for a customer
    Personalize {
        /// Numeric customer id or `gid://shopify/Customer/<id>`
        user_id: String,
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
    let target = commands::Target {
        shop: cli.shop,
        access_token: cli.access_token,
    };

    match cli.command {
        Commands::Seed { file, dry_run } => {
            commands::seed::run(&target, file.as_deref(), dry_run).await?;
        }
        Commands::Personalize { user_id } => {
            commands::personalize::run(&target, &user_id).await?;
        }
    }
    Ok(())
}
