//! Headless session runner for NeonForge projects.
//!
//! Opens (or creates) a project, replays a scripted editing session
//! through the canvas controller, and writes the result back out as JSON
//! or MessagePack.

mod args;
pub mod config;
pub mod script;

pub use args::Args;
pub use script::{ElementRef, ScriptError, SessionReport, Step};

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::info;
use thiserror::Error;

use nf_core::geometry::Size;
use nf_core::model::Project;
use nf_core::persist::{self, PersistError};
use nf_editor::{CanvasController, KeywordGenerator};

use config::ConfigError;

/// Canvas size assumed for viewport operations such as zoom-to-fit.
pub const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 800.0);

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("Session ended without an open project")]
    NoProject,
}

/// Run the `nf` CLI.
///
/// # Errors
///
/// Returns `CliError` for:
/// - Configuration loading errors
/// - Unreadable or invalid project and script files
/// - Script steps naming elements that do not exist
/// - Output write failures
pub fn run(args: &Args) -> Result<(), CliError> {
    let (project, report) = run_session(args)?;
    info!(
        "Replayed {} steps ({} no-op, {} AI edits, {} AI failures)",
        report.steps, report.no_ops, report.ai_edits, report.ai_failures
    );

    let bytes = if args.binary {
        persist::to_msgpack(&project)?
    } else {
        let mut json = persist::to_json_pretty(&project)?;
        json.push('\n');
        json.into_bytes()
    };
    match &args.output {
        Some(path) => {
            fs::write(path, bytes)?;
            info!("Project written to {}", path.display());
        }
        None => io::stdout().lock().write_all(&bytes)?,
    }
    Ok(())
}

/// Open the project, replay the script and return the edited project.
pub fn run_session(args: &Args) -> Result<(Project, SessionReport), CliError> {
    let editor_config = config::load_config(args.config.as_deref())?;
    let mut canvas = CanvasController::new(&editor_config, DEFAULT_VIEWPORT);

    match &args.input {
        Some(path) => {
            let project = load_project(path)?;
            info!("Opened project {:?} from {}", project.name, path.display());
            canvas.store_mut().load_project(project);
        }
        None => {
            info!("Creating project {:?}", args.name);
            canvas.store_mut().create_project(&args.name);
        }
    }

    let steps = match &args.script {
        Some(path) => script::parse_script(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(script::run_script(&mut canvas, &steps, &KeywordGenerator))?;

    let project = canvas
        .into_store()
        .close_project()
        .ok_or(CliError::NoProject)?;
    Ok((project, report))
}

/// Read a project file, telling JSON from MessagePack by its first byte.
pub fn load_project(path: &Path) -> Result<Project, CliError> {
    let bytes = fs::read(path)?;
    let is_json = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{');
    let project = if is_json {
        let text = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        persist::from_json(&text)?
    } else {
        persist::from_msgpack(&bytes)?
    };
    Ok(project)
}
