//! Lechare CLI - Store management without the admin panel.
//!
//! # Usage
//!
//! ```bash
//! # Seed an empty data directory from seed/
//! lechare seed
//!
//! # Append questions to the disciplines named in a file
//! lechare import questoes.csv
//!
//! # Replace one discipline's questions
//! lechare import poo.csv --discipline 3
//!
//! # Export everything (or one discipline) as CSV
//! lechare export
//! lechare export --discipline 3 --out poo.csv
//!
//! # Manage disciplines
//! lechare discipline add "Banco de Dados" bd2024
//! lechare discipline rename 3 "Programação Orientada a Objetos"
//!
//! # Publish a file to the GitHub repository
//! lechare sync public/disciplinas.json data/quiz_disciplines.json
//! ```
//!
//! # Commands
//!
//! - `seed` - Load seed files into an empty store
//! - `import` / `export` - CSV in and out
//! - `discipline list|add|rename|remove` - Manage disciplines
//! - `users list` - List registered students
//! - `sync` - Commit a file through the GitHub contents API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lechare_core::DisciplineId;

mod commands;

#[derive(Parser)]
#[command(name = "lechare")]
#[command(author, version, about = "Lechare Educacional CLI tools")]
struct Cli {
    /// Directory holding the JSON store
    #[arg(long, global = true, env = "LECHARE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding POO.json, GP.json and usuarios.json
    #[arg(long, global = true, env = "LECHARE_SEED_DIR", default_value = "seed")]
    seed_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed an empty store from the seed directory
    Seed,
    /// Import questions from a CSV file
    Import {
        /// CSV file to read
        file: PathBuf,

        /// Replace this discipline's questions instead of appending by name
        #[arg(short, long)]
        discipline: Option<DisciplineId>,
    },
    /// Export questions as CSV
    Export {
        /// Export only this discipline
        #[arg(short, long)]
        discipline: Option<DisciplineId>,

        /// Output file (default: the generated file name in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Manage disciplines
    Discipline {
        #[command(subcommand)]
        action: DisciplineAction,
    },
    /// Manage registered students
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Commit a local file to the GitHub repository (needs `GITHUB_*` variables)
    Sync {
        /// Path inside the repository
        repo_path: String,

        /// Local file whose content is committed
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum DisciplineAction {
    /// List disciplines
    List,
    /// Create an empty discipline
    Add {
        /// Display name (unique, case-insensitive)
        name: String,

        /// Access password students must enter
        password: String,
    },
    /// Rename a discipline, optionally changing its password
    Rename {
        id: DisciplineId,

        /// New display name
        name: String,

        /// New access password (default: keep the current one)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Delete a discipline and its questions
    Remove { id: DisciplineId },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List registered students
    List,
}

#[tokio::main]
async fn main() {
    // Load .env file if present, before clap reads env defaults
    dotenvy::dotenv().ok();

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
    let store = commands::open_store(&cli.data_dir);

    match cli.command {
        Commands::Seed => commands::seed::run(&store, &cli.seed_dir)?,
        Commands::Import { file, discipline } => {
            commands::transfer::import(&store, &file, discipline.as_ref()).await?;
        }
        Commands::Export { discipline, out } => {
            commands::transfer::export(&store, discipline.as_ref(), out).await?;
        }
        Commands::Discipline { action } => match action {
            DisciplineAction::List => commands::discipline::list(&store)?,
            DisciplineAction::Add { name, password } => {
                commands::discipline::add(&store, &name, &password)?;
            }
            DisciplineAction::Rename { id, name, password } => {
                commands::discipline::rename(&store, &id, &name, password.as_deref())?;
            }
            DisciplineAction::Remove { id } => commands::discipline::remove(&store, &id)?,
        },
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&store)?,
        },
        Commands::Sync { repo_path, file } => commands::sync::run(&repo_path, &file).await?,
    }
    Ok(())
}
