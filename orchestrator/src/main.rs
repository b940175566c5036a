use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use sentimen_inference::SentimentConfig;

mod history;
mod output;
mod pipeline;
mod table;

use history::{HistoryStore, DEFAULT_HISTORY_PATH};
use output::ResultFormatter;
use pipeline::SentimentDashboard;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with model and vocabulary paths (defaults plus SENTIMEN_* env vars otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict the sentiment of a single text
    Predict {
        text: String,

        /// Do not append the result to the history
        #[arg(long)]
        no_history: bool,
    },

    /// Predict every row of a CSV file
    Batch {
        input: PathBuf,

        /// Column holding the text (auto-detected when omitted)
        #[arg(long)]
        column: Option<String>,

        /// Where to write the augmented table
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Inspect or edit the analysis history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// Show entries, newest first
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Delete entries by timestamp
    Delete {
        #[arg(required = true)]
        timestamps: Vec<String>,
    },
    /// Delete every entry
    Clear,
    /// Write the history as CSV
    Export { path: PathBuf },
}

fn load_config(path: Option<&PathBuf>) -> Result<SentimentConfig> {
    let config = match path {
        Some(path) => SentimentConfig::from_file(path)?.with_env_overrides(),
        None => SentimentConfig::from_env_or_default(),
    };
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::History { action } => run_history(action, args.history),
        Command::Predict { text, no_history } => {
            let mut dashboard = open_dashboard(args.config.as_ref(), args.history)?;
            dashboard.analyze_text(&text, !no_history)?;
            info!("History holds {} entries", dashboard.history().len());
            Ok(())
        }
        Command::Batch { input, column, output } => {
            let mut dashboard = open_dashboard(args.config.as_ref(), args.history)?;
            dashboard.analyze_file(&input, column.as_deref(), output.as_deref())?;
            Ok(())
        }
    }
}

fn open_dashboard(config_path: Option<&PathBuf>, history_path: PathBuf) -> Result<SentimentDashboard> {
    let config = load_config(config_path)?;
    info!("Model: {:?}", config.model_path);
    info!("Vocabulary: {:?}", config.vocabulary_path);
    Ok(SentimentDashboard::new(&config, history_path))
}

// history commands never load the model
fn run_history(action: HistoryAction, history_path: PathBuf) -> Result<()> {
    let mut store = HistoryStore::load(history_path);
    let formatter = ResultFormatter::new();

    match action {
        HistoryAction::List { search } => {
            formatter.display_history(&store.search(search.as_deref().unwrap_or("")));
        }
        HistoryAction::Delete { timestamps } => {
            let removed = store.remove(&timestamps)?;
            if removed == 0 {
                warn!("No history entries matched {:?}", timestamps);
            }
            println!("🗑️  {} entri dihapus", removed);
        }
        HistoryAction::Clear => {
            store.clear()?;
            println!("🚨 Semua riwayat dihapus");
        }
        HistoryAction::Export { path } => {
            store.export_csv(&path)?;
            println!("📥 Riwayat diekspor ke {}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    info!("Starting sentimen {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        ResultFormatter::new().display_error(&e);
        std::process::exit(1);
    }
    Ok(())
}
