//! Holiday registration CLI
//!
//! Administration commands for the registration database and a console
//! chat that drives the conversation engine like a chat front end would.

#![allow(clippy::print_stdout)]

mod console;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use application::{ApplicantRepository, ConversationEngine, SlotCatalog};
use clap::{Parser, Subcommand};
use domain::{Identity, Slot, SlotKey};
use infrastructure::{
    AppConfig, ChannelOutbox, SqliteApplicantRepository, SqliteSlotCatalog, connect_with_retry,
    init_logging, persistence::migrations::SCHEMA_VERSION, session_store,
};

/// Holiday registration CLI
#[derive(Parser)]
#[command(name = "registration-cli")]
#[command(author, version, about = "Holiday event registration CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, env = "REGISTRATION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Add a bookable slot, or change the limit of an existing one
    ///
    /// Example: registration-cli seed-slot --date 2024-12-25 --time 10:00 --limit 10
    SeedSlot {
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Start time (HH:MM)
        #[arg(long)]
        time: String,

        /// Maximum number of registrations
        #[arg(long)]
        limit: u32,
    },

    /// List slots with their occupancy
    Slots {
        /// Only list slots that still accept registrations
        #[arg(long)]
        open: bool,
    },

    /// List all registrations ordered by slot
    Registrations {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the registration of one identity
    Show {
        /// Chat identity
        identity: String,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Chat with the registration flow from the console
    Chat {
        /// Chat identity to register as
        identity: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => AppConfig::load().context("Failed to load configuration"),
    }
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    config.logging.filter = log_filter_from_verbosity(cli.verbose).to_string();
    init_logging(&config.logging)?;

    if matches!(cli.command, Commands::Config) {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }
    if matches!(cli.command, Commands::Migrate) {
        config.database.run_migrations = true;
    }

    let pool = Arc::new(
        connect_with_retry(&config.database, &config.connect_retry)
            .await
            .with_context(|| format!("Failed to open database {}", config.database.path))?,
    );
    let applicants = Arc::new(SqliteApplicantRepository::new(Arc::clone(&pool)));
    let catalog = Arc::new(SqliteSlotCatalog::new(pool));

    match cli.command {
        Commands::Config => {},

        Commands::Migrate => {
            println!(
                "✅ Database {} is at schema version {SCHEMA_VERSION}",
                config.database.path
            );
        },

        Commands::SeedSlot { date, time, limit } => {
            let key = SlotKey::parse(&date, &time)?;
            catalog.seed(Slot::new(key, limit)).await?;
            println!("✅ Slot {key} accepts {limit} registration(s)");
        },

        Commands::Slots { open } => {
            let slots = catalog.list_slots().await?;
            let occupancy = applicants.occupancy().await?;

            if slots.is_empty() {
                println!("No slots configured");
            }
            for slot in slots {
                let taken = occupancy.get(&slot.key).copied().unwrap_or(0);
                if open && !slot.has_room_for(taken) {
                    continue;
                }
                let marker = if slot.has_room_for(taken) { " " } else { "✗" };
                println!("{marker} {}  {taken}/{}", slot.key, slot.limit);
            }
        },

        Commands::Registrations { json } => {
            let registrations = applicants.list_all().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&registrations)?);
            } else {
                for registration in &registrations {
                    println!(
                        "{}  {:>12}  {}  {}  {} child(ren)  [{}]",
                        registration.selected_slot,
                        registration.identity,
                        registration.full_name,
                        registration.phone_number.as_str(),
                        registration.children.len(),
                        registration.language.code(),
                    );
                }
                println!("{} registration(s)", registrations.len());
            }
        },

        Commands::Show { identity } => {
            let identity = Identity::new(identity)?;
            match applicants.find_by_identity(&identity).await? {
                Some(registration) => {
                    println!("{}", serde_json::to_string_pretty(&registration)?);
                },
                None => {
                    println!("No registration for {identity}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Chat { identity } => {
            let identity = Identity::new(identity)?;
            let (outbox, mut replies) = ChannelOutbox::channel();
            let engine = ConversationEngine::new(
                applicants,
                catalog,
                session_store(&config.conversation),
                Arc::new(outbox),
            );

            console::run_chat(&engine, &identity, &mut replies).await?;
        },
    }

    Ok(())
}
