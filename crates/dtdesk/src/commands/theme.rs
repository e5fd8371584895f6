//! Theme preference handlers. Local only; no server involved.

use dtdesk_config::{Theme, load_theme, preferences_path, save_theme};

use crate::cli::{GlobalOpts, ThemeArgs, ThemeCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: ThemeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = preferences_path();
    match args.command {
        ThemeCommand::Get => {
            let theme = load_theme(&path)?;
            output::print_output(&theme.to_string(), global.quiet);
            Ok(())
        }
        ThemeCommand::Set { theme } => {
            let theme = Theme::from(theme);
            save_theme(&path, theme)?;
            util::print_notice(&format!("Theme set to {theme}"), global.quiet);
            Ok(())
        }
    }
}
