//! Shop Sync CLI - run store-to-store syncs without the dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Show what a products sync would do
//! shop-sync preview products
//!
//! # Sync collections from production back to staging
//! shop-sync sync collections --direction prod-to-stage
//!
//! # Back up staging theme settings, then push them to production
//! shop-sync themes backup
//! shop-sync themes push --backup-id 6f1c2a0e-5b0d-4e7a-9d51-2f5f7f0b9a11
//! ```
//!
//! # Commands
//!
//! - `kinds` - List resource kinds and what each can write
//! - `preview` - Diff one kind without writing
//! - `sync` - Reconcile one kind
//! - `themes` - List themes, back up and push theme settings
//!
//! Credentials come from the same environment as the dashboard
//! (`STAGE_SHOP`, `STAGE_ACCESS_TOKEN`, `PROD_SHOP`, `PROD_ACCESS_TOKEN`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use shop_sync_core::{ResourceKind, StoreRole, SyncDirection};
use shop_sync_dashboard::{AppState, SyncConfig};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "shop-sync")]
#[command(author, version, about = "Store-to-store Shopify sync")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resource kinds and their capabilities
    Kinds,
    /// Diff one resource kind without writing
    Preview {
        /// Resource kind (e.g. products, shipping-zones)
        kind: ResourceKind,

        /// `stage-to-prod` or `prod-to-stage`
        #[arg(short, long, default_value = "stage-to-prod")]
        direction: SyncDirection,
    },
    /// Reconcile one resource kind
    Sync {
        /// Resource kind (e.g. products, shipping-zones)
        kind: ResourceKind,

        /// `stage-to-prod` or `prod-to-stage`
        #[arg(short, long, default_value = "stage-to-prod")]
        direction: SyncDirection,
    },
    /// Theme settings backups
    Themes {
        #[command(subcommand)]
        action: ThemesAction,
    },
}

#[derive(Subcommand)]
enum ThemesAction {
    /// List themes of one store
    List {
        /// `stage` or `prod`
        #[arg(short, long)]
        role: StoreRole,
    },
    /// List stored backups, newest first
    Backups,
    /// Back up the source theme's settings
    Backup {
        #[arg(short, long, default_value = "stage-to-prod")]
        direction: SyncDirection,
    },
    /// Push a stored backup to the target theme
    Push {
        /// Backup ID printed by `themes backup`
        #[arg(long)]
        backup_id: Uuid,

        #[arg(short, long, default_value = "stage-to-prod")]
        direction: SyncDirection,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_sync_dashboard=info,shop_sync_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SyncConfig::from_env()?;
    let state = AppState::new(&config)?;
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Kinds => commands::sync::kinds(&state, output)?,
        Commands::Preview { kind, direction } => {
            commands::sync::preview(&state, kind, direction, output).await?;
        }
        Commands::Sync { kind, direction } => {
            commands::sync::sync(&state, kind, direction, output).await?;
        }
        Commands::Themes { action } => match action {
            ThemesAction::List { role } => commands::themes::list(&state, role, output).await?,
            ThemesAction::Backups => commands::themes::backups(&state, output).await?,
            ThemesAction::Backup { direction } => {
                commands::themes::backup(&state, direction, output).await?;
            }
            ThemesAction::Push {
                backup_id,
                direction,
            } => commands::themes::push(&state, backup_id, direction, output).await?,
        },
    }
    Ok(())
}
