//! Pitchside CLI - command-line interface for the cricket data sync.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::Term;
use pitchside::{Collection, SyncKind};
use tracing_subscriber::EnvFilter;

use crate::commands::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pitchside")]
#[command(version)]
#[command(about = "Cricket data ingestion and normalization")]
#[command(
    long_about = "Pitchside fetches match, team, series and news data from a cricket data \
provider, normalizes the provider's loosely-typed payloads into canonical records, and \
keeps them in a local document store keyed by each record's natural id."
)]
#[command(after_long_help = r#"EXAMPLES
    Run a full sync pass:
        $ pitchside sync all

    Sync recent matches, retrying timeouts up to 3 times:
        $ pitchside sync matches-recent --retries 3

    Load a saved provider response:
        $ pitchside ingest matches ./recent.json

    Show a stored match with its raw payload:
        $ pitchside show matches 89654 --raw

    Generate shell completions:
        $ pitchside completions bash > ~/.local/share/bash-completion/completions/pitchside

CONFIGURATION
    Pitchside reads configuration from:
      1. ~/.config/pitchside/config.toml (or $XDG_CONFIG_HOME/pitchside/config.toml)
      2. ./pitchside.toml
      3. Environment variables (PITCHSIDE_* prefix, e.g., PITCHSIDE_PROVIDER__ENDPOINTS__NEWS)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    PITCHSIDE_DATABASE_URL    Database connection string (default: ~/.local/state/pitchside/pitchside.db)
    PITCHSIDE_API_KEY         Provider API key
    PITCHSIDE_HOST            Provider host identifier
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, normalize and store provider data
    Sync {
        /// Job to run
        #[arg(value_enum)]
        job: JobArg,

        /// Output format for the sync report
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// Retry timeouts and network errors this many times (default from config or 0)
        #[arg(short, long)]
        retries: Option<u32>,

        /// Disable proactive rate limiting
        #[arg(short = 'R', long)]
        no_rate_limit: bool,
    },
    /// Normalize and store a raw provider payload read from a file
    Ingest {
        /// Record kind of the payload
        #[arg(value_enum)]
        kind: KindArg,

        /// JSON file holding a listing or a single entity ("-" for stdin)
        file: PathBuf,

        /// Output format for the summary
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Print a stored document as JSON
    Show {
        #[arg(value_enum)]
        kind: KindArg,

        /// Natural key (match id, team id, ...)
        key: String,

        /// Print only the raw provider payload
        #[arg(long)]
        raw: bool,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Sync job selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum JobArg {
    Teams,
    News,
    MatchesRecent,
    MatchesUpcoming,
    Series,
    All,
}

impl JobArg {
    fn kinds(self) -> Vec<SyncKind> {
        match self {
            JobArg::Teams => vec![SyncKind::Teams],
            JobArg::News => vec![SyncKind::News],
            JobArg::MatchesRecent => vec![SyncKind::MatchesRecent],
            JobArg::MatchesUpcoming => vec![SyncKind::MatchesUpcoming],
            JobArg::Series => vec![SyncKind::Series],
            JobArg::All => SyncKind::ALL.to_vec(),
        }
    }
}

/// Record kind selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Matches,
    Teams,
    Players,
    Series,
    News,
    Photos,
}

impl From<KindArg> for Collection {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Matches => Collection::Matches,
            KindArg::Teams => Collection::Teams,
            KindArg::Players => Collection::Players,
            KindArg::Series => Collection::Series,
            KindArg::News => Collection::News,
            KindArg::Photos => Collection::Photos,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging for non-TTY mode; the console reporter covers TTYs
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("pitchside=info,pitchside_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        commands::meta::handle_completions(*shell)?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set PITCHSIDE_DATABASE_URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Sync {
            job,
            output,
            retries,
            no_rate_limit,
        } => {
            let options = config.sync_options(retries);
            let provider = config.provider_config(no_rate_limit);
            commands::sync::handle_sync(&job.kinds(), provider, options, output, &database_url)
                .await?;
        }
        Commands::Ingest { kind, file, output } => {
            let options = config.sync_options(None);
            commands::ingest::handle_ingest(kind.into(), &file, &options, output, &database_url)
                .await?;
        }
        Commands::Show { kind, key, raw } => {
            commands::show::handle_show(kind.into(), &key, raw, &database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
