mod replay;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use floorplan::config::EditorConfig;
use floorplan::draft::Drafts;
use floorplan::editor::EditorError;
use floorplan::gateway::{GatewayError, LayoutPayload};
use floorplan::geometry::snap_to_right_angles;
use floorplan::store::{FileStore, StoreError};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no draft stored for hall {0}")]
    NoDraft(Uuid),
    #[error("script step {step}: no object at index {index}")]
    NoSuchObject { step: usize, index: usize },
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("draft store error: {0}")]
    Store(#[from] StoreError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("editor error: {0}")]
    Editor(#[from] EditorError),
}

#[derive(Parser, Debug)]
#[command(name = "floorplan", about = "Floor-plan draft store and editor replay tool")]
struct Cli {
    #[arg(long, env = "FLOORPLAN_DRAFT_DIR", default_value = ".floorplan/drafts")]
    draft_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Drafts(DraftsCommand),
    /// Show where the rotation snap engine puts an angle.
    Snap {
        #[arg(allow_negative_numbers = true)]
        degrees: f64,
    },
    /// Run a JSON script of editor steps and print the resulting layout.
    Replay {
        script: PathBuf,
        /// Stored server layout to start from.
        #[arg(long)]
        layout: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct DraftsCommand {
    #[command(subcommand)]
    command: DraftsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DraftsSubcommand {
    List,
    Show { hall_id: Uuid },
    Clear { hall_id: Uuid },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EditorConfig::from_env();

    match cli.command {
        Command::Drafts(drafts) => run_drafts(&cli.draft_dir, &config, drafts),
        Command::Snap { degrees } => run_snap(degrees),
        Command::Replay { script, layout } => {
            let script: replay::Script = read_json(&script)?;
            let layout: Option<LayoutPayload> = match layout {
                Some(path) => Some(read_json(&path)?),
                None => None,
            };
            let store = FileStore::open(&cli.draft_dir)?;
            let outcome = replay::run(store, config, &script, layout).await?;
            print_json(&serde_json::to_value(&outcome)?)
        }
    }
}

fn run_drafts(dir: &Path, config: &EditorConfig, drafts: DraftsCommand) -> Result<(), CliError> {
    let mut store = Drafts::new(FileStore::open(dir)?, config.draft_key_prefix.clone());
    match drafts.command {
        DraftsSubcommand::List => {
            for hall_id in store.hall_ids()? {
                match store.read(&hall_id)? {
                    Some(draft) => println!("{hall_id}\t{} objects\tsaved_at={}", draft.objects.len(), draft.saved_at),
                    None => println!("{hall_id}\t(corrupt, removed)"),
                }
            }
            Ok(())
        }
        DraftsSubcommand::Show { hall_id } => {
            let draft = store.read(&hall_id)?.ok_or(CliError::NoDraft(hall_id))?;
            print_json(&serde_json::to_value(&draft)?)
        }
        DraftsSubcommand::Clear { hall_id } => {
            if !store.exists(&hall_id)? {
                return Err(CliError::NoDraft(hall_id));
            }
            store.clear(&hall_id)?;
            println!("cleared {hall_id}");
            Ok(())
        }
    }
}

fn run_snap(degrees: f64) -> Result<(), CliError> {
    let snap = snap_to_right_angles(degrees);
    print_json(&serde_json::json!({
        "input": degrees,
        "angle": snap.angle,
        "snapped": snap.snapped,
    }))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
