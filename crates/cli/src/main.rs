//! ROOICELL CLI - catalog, cart and likes from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog with the saved filter applied
//! rooicell catalog list
//!
//! # Filter by category and favorites
//! rooicell filter category toners
//! rooicell filter favorites on
//!
//! # Fill the cart and send the order
//! rooicell cart add prod-1 --quantity 2
//! rooicell collections add col-1
//! rooicell cart order
//!
//! # Follow changes made from other terminals
//! rooicell watch
//! ```
//!
//! # Commands
//!
//! - `catalog` - List and show products
//! - `collections` - List, show and add curated collections
//! - `cart` - Show and edit the cart, build the WhatsApp order
//! - `like` - Toggle and list liked products
//! - `filter` - Edit the saved catalog filter
//! - `watch` - Print cart and like changes as they happen

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rooicell_core::{CollectionId, ProductId};
use rooicell_storefront::notify::{ChangeEvent, EventKind};
use rooicell_storefront::{AppState, StorefrontConfig};

mod commands;
mod view;

#[derive(Parser)]
#[command(name = "rooicell")]
#[command(author, version, about = "ROOICELL catalog, cart and likes")]
struct Cli {
    /// Directory holding saved state (overrides `ROOICELL_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Curated product collections
    Collections {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Liked products
    Like {
        #[command(subcommand)]
        action: LikeAction,
    },
    /// Saved catalog filter
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Print cart and like changes until Ctrl-C
    Watch,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products passing the saved filter
    List {
        /// Ignore the saved filter
        #[arg(long)]
        all: bool,
    },
    /// Show one product
    Show { product_id: String },
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List collections
    List,
    /// Show a collection's products
    Show { collection_id: String },
    /// Add every product of a collection to the cart
    Add { collection_id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and total
    Show,
    /// Add a product volume
    Add {
        product_id: String,
        /// Volume index, as listed by `catalog show`
        #[arg(short, long, default_value_t = 0)]
        volume: usize,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        #[arg(short, long, default_value_t = 0)]
        volume: usize,
    },
    /// Remove a line
    Remove {
        product_id: String,
        #[arg(short, long, default_value_t = 0)]
        volume: usize,
    },
    /// Remove every line
    Clear,
    /// Print the order message and WhatsApp link
    Order,
}

#[derive(Subcommand)]
enum LikeAction {
    /// Like or unlike a product
    Toggle { product_id: String },
    /// List liked products
    List,
}

#[derive(Subcommand)]
enum FilterAction {
    /// Show the saved filter
    Show,
    /// Select or deselect a category (id or slug)
    Category { category: String },
    /// Show only liked products
    Favorites { state: Switch },
    /// Drop every filter
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rooicell_storefront=info,rooicell_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let state = AppState::new(config);
    let toasts = state
        .store()
        .subscribe(EventKind::ToastRequested, print_toast);

    let outcome = dispatch(&state, cli.command).await;
    toasts.unsubscribe();
    outcome
}

async fn dispatch(state: &AppState, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Catalog { action } => match action {
            CatalogAction::List { all } => commands::catalog::list(state, all).await,
            CatalogAction::Show { product_id } => {
                commands::catalog::show(state, &ProductId::new(product_id)).await?;
            }
        },
        Commands::Collections { action } => match action {
            CollectionAction::List => commands::collections::list(state).await,
            CollectionAction::Show { collection_id } => {
                commands::collections::show(state, &CollectionId::new(collection_id)).await?;
            }
            CollectionAction::Add { collection_id } => {
                commands::collections::add(state, &CollectionId::new(collection_id)).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state).await,
            CartAction::Add {
                product_id,
                volume,
                quantity,
            } => commands::cart::add(state, &ProductId::new(product_id), volume, quantity).await?,
            CartAction::Set {
                product_id,
                quantity,
                volume,
            } => commands::cart::set(state, &ProductId::new(product_id), volume, quantity)?,
            CartAction::Remove { product_id, volume } => {
                commands::cart::remove(state, &ProductId::new(product_id), volume)?;
            }
            CartAction::Clear => commands::cart::clear(state)?,
            CartAction::Order => commands::cart::order(state).await?,
        },
        Commands::Like { action } => match action {
            LikeAction::Toggle { product_id } => {
                commands::likes::toggle(state, &ProductId::new(product_id)).await?;
            }
            LikeAction::List => commands::likes::list(state).await,
        },
        Commands::Filter { action } => match action {
            FilterAction::Show => commands::filter::show(state).await,
            FilterAction::Category { category } => {
                commands::filter::toggle_category(state, &category).await?;
            }
            FilterAction::Favorites { state: switch } => {
                commands::filter::favorites(state, matches!(switch, Switch::On))?;
            }
            FilterAction::Clear => commands::filter::clear(state)?,
        },
        Commands::Watch => commands::watch::run(state).await?,
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_toast(event: &ChangeEvent) {
    if let ChangeEvent::ToastRequested { message } = event {
        println!("{message}");
    }
}
