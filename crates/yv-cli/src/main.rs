//! `yv-render`: turn a saved editor state into prompt YAML.
//!
//! ```text
//! yv-render <state.json|state.msgpack> [--out-dir DIR]
//! ```
//!
//! Without `--out-dir` the YAML goes to stdout. With it, the YAML is written
//! to `DIR/prompt-<unix-ms>.yaml`, the same name the browser download uses.
//! Log verbosity follows `RUST_LOG`.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use yv_core::layout::Container;
use yv_core::persist::{PersistError, PersistedState};
use yv_editor::session::EditorSession;

#[derive(Debug, Parser)]
#[command(name = "yv-render", version, about = "Render a saved YAML Visualizer state as prompt YAML")]
struct Cli {
    /// Saved state: JSON, or MessagePack when the file ends in `.msgpack`.
    input: PathBuf,
    /// Write `prompt-<unix-ms>.yaml` into this directory instead of stdout.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not a saved editor state: {source}", path.display())]
    State { path: PathBuf, source: PersistError },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load a saved state. `.msgpack` files are binary snapshots; anything else
/// is read as JSON.
fn load_state(path: &Path) -> Result<PersistedState, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let state = if path.extension().is_some_and(|ext| ext == "msgpack") {
        PersistedState::from_msgpack(&bytes)
    } else {
        PersistedState::from_json(&String::from_utf8_lossy(&bytes))
    };
    state.map_err(|source| CliError::State {
        path: path.to_path_buf(),
        source,
    })
}

/// YAML for a saved state, laid out exactly as the editor shows it in the
/// reference viewport.
fn render(state: PersistedState) -> String {
    let mut session = EditorSession::from_persisted(state, Container::default());
    session.yaml().to_string()
}

fn output_file_name(timestamp_ms: u128) -> String {
    format!("prompt-{timestamp_ms}.yaml")
}

fn run(cli: Cli) -> Result<(), CliError> {
    let state = load_state(&cli.input)?;
    log::info!(
        "loaded {} notes from {}",
        state.notes.len(),
        cli.input.display()
    );
    let yaml = render(state);

    let Some(dir) = cli.out_dir else {
        print!("{yaml}");
        return Ok(());
    };
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = dir.join(output_file_name(ts));
    std::fs::write(&path, yaml).map_err(|source| CliError::Write {
        path: path.clone(),
        source,
    })?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("yv-render: {e}");
            ExitCode::FAILURE
        }
    }
}
