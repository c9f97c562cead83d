//! Terminal front end for the meshview programs.
//!
//! Wires [`meshview_core`] to a crossterm-backed device and event source.
//! Each binary picks a [`ProgramSpec`] and hands it to [`main_for`].

use std::process::ExitCode;

use anyhow::Context;
use log::{error, info, warn};
use meshview_core::{ProgramSpec, RunStats};

pub mod config;
pub mod device;
pub mod input;
pub mod logging;
pub mod renderer;

pub use config::ViewerConfig;
pub use device::TerminalDevice;
pub use input::TerminalEvents;
pub use logging::{init_logging, LoggingConfig};
pub use renderer::AsciiRenderer;

/// Create the device, load every mesh, then run until closed.
///
/// Meshes are loaded before the terminal is taken over, so a missing model
/// fails with the normal screen still in place.
pub fn run_program(program: ProgramSpec, config: &ViewerConfig) -> anyhow::Result<RunStats> {
    let device = TerminalDevice::create(program.viewport).context("no terminal available")?;
    let mut context = meshview_core::startup(device, program, &config.search_path())?;
    let mut events = TerminalEvents;
    let stats = meshview_core::run(&mut context, &mut events, config.frame_interval())?;
    Ok(stats)
}

/// Shared `main` for the viewer binaries.
pub fn main_for(program: ProgramSpec) -> ExitCode {
    let config = ViewerConfig::from_env();
    init_logging(config.logging.clone());
    for setting in &config.ignored {
        warn!("ignoring {}", setting);
    }

    let title = program.title.clone();
    match run_program(program, &config) {
        Ok(stats) => {
            info!(
                "{} closed after {} frames ({} dropped, {} events)",
                title, stats.frames, stats.dropped_frames, stats.events
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {:#}", title, e);
            eprintln!("{}: {:#}", title, e);
            ExitCode::FAILURE
        }
    }
}
