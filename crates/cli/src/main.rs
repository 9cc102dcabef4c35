// brandmap CLI - product → manufacturer mapping

mod exit_codes;
mod manufacturer;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use brandmap_io::StoreError;
use exit_codes::{store_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "brandmap")]
#[command(about = "Map catalog products to their manufacturers")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// SQLite record store (default: manufacturer.db, or the run config's `database`)
    #[arg(long, global = true, env = "BRANDMAP_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest source catalogs, apply the crosswalk and store new records
    #[command(after_help = "\
Examples:
  brandmap map run.toml
  brandmap map run.toml --json
  brandmap map --source shop_a.csv --source shop_b.csv --match matches.csv
  brandmap map run.toml --output mapping.json")]
    Map {
        /// TOML run config listing other_sources, match_source and database
        config: Option<PathBuf>,

        /// Source catalog, repeatable; ingested in the order given (overrides config)
        #[arg(long = "source", value_name = "FILE")]
        sources: Vec<PathBuf>,

        /// Crosswalk file (overrides config)
        #[arg(long = "match", value_name = "FILE")]
        match_source: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Find or create the record for a product title
    #[command(after_help = "\
Examples:
  brandmap assign 'Acme Corp Widget 500ml'
  brandmap assign 'Acme,Acme Corp' --json")]
    Assign {
        /// Product title (or an exact comma-joined manufacturer list)
        title: String,

        #[arg(long)]
        json: bool,
    },

    /// List records flagged for manual investigation
    Investigate {
        #[arg(long)]
        json: bool,
    },

    /// Report stored records whose name is too generic to be a manufacturer
    Validate {
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\nstore:   sqlite (bundled)",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\nstore:   sqlite (bundled)",
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Map { config, sources, match_source, json, output } => manufacturer::cmd_map(
            manufacturer::MapArgs { config, sources, match_source, db: cli.db },
            json,
            output,
        ),
        Commands::Assign { title, json } => manufacturer::cmd_assign(cli.db, &title, json),
        Commands::Investigate { json } => manufacturer::cmd_investigate(cli.db, json),
        Commands::Validate { json } => manufacturer::cmd_validate(cli.db, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Create error from a store/pipeline error with the matching exit code.
    pub fn store(err: StoreError) -> Self {
        let code = store_exit_code(&err);
        let hint = if err.is_file_access() {
            Some("relative paths in a run config resolve against the config's directory".to_string())
        } else {
            None
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::store(err)
    }
}
