//! Meme Shop CLI - browse the catalog and place orders from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # First page of the default category
//! meme-shop products
//!
//! # Page 2 of category 3, five per page
//! meme-shop products --category 3 --name Cats --page 2 --page-size 5
//!
//! # Keyword search
//! meme-shop search doge
//!
//! # Reference data
//! meme-shop countries
//! meme-shop states CA
//! meme-shop card-months --year 2027
//!
//! # Scripted checkout
//! meme-shop checkout --order order.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_API_URL` - Catalog/order API base URL (required)
//! - `STOREFRONT_API_TOKEN` - Bearer token for the API
//! - `SENTRY_DSN` - Enables error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meme_shop_storefront::error::report_error;
use meme_shop_storefront::{ApiClient, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "meme-shop")]
#[command(author, version, about = "Meme Shop storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products of a category, one page at a time
    Products {
        /// Category ID (defaults to the Meme category)
        #[arg(short, long)]
        category: Option<String>,

        /// Category display name
        #[arg(short, long)]
        name: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Products per page (defaults to `STOREFRONT_PAGE_SIZE`)
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Search products by name
    Search {
        /// Text the product name must contain
        keyword: String,
    },
    /// List product categories
    Categories,
    /// Show one product
    Product {
        /// Product ID
        id: i64,
    },
    /// List countries
    Countries,
    /// List states of a country
    States {
        /// Country code, e.g. `CA`
        code: String,
    },
    /// Selectable card expiration months
    CardMonths {
        /// Expiration year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Selectable card expiration years
    CardYears,
    /// Fill a cart and checkout form from a YAML file and submit the order
    Checkout {
        /// Order file
        #[arg(short, long)]
        order: PathBuf,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meme_shop_storefront=info,meme_shop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry first, so the tracing layer has a client to forward to
    let sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        report_error(e.as_ref(), "Command failed");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(&config.api)?;

    match cli.command {
        Commands::Products {
            category,
            name,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(config.page_size);
            commands::catalog::products(client, category, name, page, page_size).await?;
        }
        Commands::Search { keyword } => commands::catalog::search(client, keyword).await?,
        Commands::Categories => commands::catalog::categories(&client).await?,
        Commands::Product { id } => commands::catalog::product(&client, id).await?,
        Commands::Countries => commands::reference::countries(&client).await?,
        Commands::States { code } => commands::reference::states(&client, &code).await?,
        Commands::CardMonths { year } => commands::reference::card_months(client, year).await,
        Commands::CardYears => commands::reference::card_years(&client).await?,
        Commands::Checkout { order } => commands::checkout::run(client, &order).await?,
    }
    Ok(())
}
