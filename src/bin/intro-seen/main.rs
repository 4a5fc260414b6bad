//! CLI tool to inspect and edit a saved intro seen-state document.
//!
//! Usage:
//!   intro-seen --file seen.automerge list
//!   intro-seen --file seen.automerge mark search toolbar
//!   intro-seen --file seen.automerge reset search
//!   intro-seen --file seen.automerge merge other-device.automerge

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use introseq::{DocumentSeenStore, SeenStore};

#[derive(Parser, Debug)]
#[command(
    name = "intro-seen",
    about = "Inspect and edit intro seen-state documents",
    version
)]
struct Args {
    /// Seen-state document path
    #[arg(short, long, env = "INTRO_SEEN_FILE")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every identifier recorded as displayed
    List,
    /// Exit with status 1 if the identifier was not displayed
    Check { id: String },
    /// Record identifiers as displayed
    Mark {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Forget identifiers so their intros show again
    Reset {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Forget every identifier
    ResetAll,
    /// Merge another device's document into this one
    Merge { other: PathBuf },
}

fn load(path: &Path) -> Result<DocumentSeenStore> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    DocumentSeenStore::from_bytes(&bytes)
        .with_context(|| format!("Failed to load seen-state from {}", path.display()))
}

fn load_or_create(path: &Path) -> Result<DocumentSeenStore> {
    if path.exists() {
        load(path)
    } else {
        tracing::info!(path = %path.display(), "creating new seen-state document");
        Ok(DocumentSeenStore::new())
    }
}

fn save(store: &mut DocumentSeenStore, path: &Path) -> Result<()> {
    let bytes = store.save();
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved seen-state");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let path = args.file.as_path();

    match args.command {
        Command::List => {
            let store = load(path)?;
            for id in store.displayed_ids().context("Failed to read seen-state")? {
                println!("{}", id);
            }
        }
        Command::Check { id } => {
            let store = load(path)?;
            let displayed = store
                .try_is_displayed(&id)
                .context("Failed to read seen-state")?;
            println!("{}: {}", id, if displayed { "displayed" } else { "not displayed" });
            if !displayed {
                std::process::exit(1);
            }
        }
        Command::Mark { ids } => {
            let mut store = load_or_create(path)?;
            for id in &ids {
                store
                    .try_set_displayed(id)
                    .with_context(|| format!("Failed to mark {}", id))?;
            }
            save(&mut store, path)?;
            println!("Marked {} intro(s) as displayed", ids.len());
        }
        Command::Reset { ids } => {
            let mut store = load(path)?;
            for id in &ids {
                store
                    .try_reset(id)
                    .with_context(|| format!("Failed to reset {}", id))?;
            }
            save(&mut store, path)?;
            println!("Reset {} intro(s)", ids.len());
        }
        Command::ResetAll => {
            let mut store = load(path)?;
            let count = store.displayed_ids()?.len();
            store.reset_all();
            save(&mut store, path)?;
            println!("Reset {} intro(s)", count);
        }
        Command::Merge { other } => {
            let mut other_store = load(&other)?;
            let mut store = load_or_create(path)?;
            store
                .merge(&mut other_store)
                .context("Failed to merge seen-state documents")?;
            save(&mut store, path)?;
            println!(
                "Merged {} → {} ({} displayed)",
                other.display(),
                path.display(),
                store.displayed_ids()?.len()
            );
        }
    }

    Ok(())
}
