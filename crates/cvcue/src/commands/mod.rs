//! Command dispatch: bridges CLI args -> core executor -> output formatting.

pub mod devices;
pub mod session;

use clap::ValueEnum;
use tokio_util::sync::CancellationToken;

use crate::cli::{ColorMode, Command, GlobalOpts};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

/// Dispatch a settings-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    settings: &Settings,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::ListAps(args) => devices::list_aps(args, settings, global, cancel).await,
        Command::GetAllAps(args) => devices::get_all_aps(args, settings, global, cancel).await,
        Command::Session(args) => session::handle(args, settings, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}

/// `--color`, else the config default, else auto-detect.
pub fn color_enabled(settings: &Settings, global: &GlobalOpts) -> bool {
    let mode = global
        .color
        .or_else(|| ColorMode::from_str(&settings.config.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto);
    output::should_color(mode)
}
