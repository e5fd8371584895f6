//! Command dispatch: bridges CLI args -> panel operations -> output formatting.

pub mod config_cmd;
pub mod layout;
pub mod nodes;
pub mod settings;
pub mod sources;
pub mod theme;
pub mod util;
pub mod watch;

use dtdesk_core::Panel;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to its handler.
pub async fn dispatch(cmd: Command, panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Settings => settings::handle(panel, global),
        Command::Sources(args) => sources::handle(panel, args, global).await,
        Command::Nodes(args) => nodes::handle(panel, args, global).await,
        Command::Layout(args) => layout::handle(panel, args, global).await,
        Command::Watch(args) => watch::handle(panel, args, global).await,
        Command::Config(_) | Command::Theme(_) | Command::Completions(_) => Err(
            CliError::Internal("local command routed to the server dispatcher".into()),
        ),
    }
}
