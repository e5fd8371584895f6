//! CLI configuration: thin wrapper around `dtdesk_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--server,
//! --timeout, --profile).

use dtdesk_core::PanelConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use dtdesk_config::{Config, Profile, config_path, load_config, save_config};

/// Translate the active profile plus global flags into a `PanelConfig`.
///
/// `--server` works without any config file. `push` is the caller's
/// request; the profile can still veto it.
pub fn resolve_panel_config(
    global: &GlobalOpts,
    cfg: &Config,
    push: bool,
) -> Result<PanelConfig, CliError> {
    let name = cfg.active_profile_name(global.profile.as_deref());

    let mut profile = match (cfg.profiles.get(&name), global.server.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(server)) if global.profile.is_none() => Profile::new(server),
        (None, _) if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, _) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(server) = &global.server {
        profile.server.clone_from(server);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile.push = profile.push && push;

    tracing::debug!(profile = %name, server = %profile.server, "resolved profile");
    Ok(dtdesk_config::profile_to_panel_config(
        &profile,
        cfg.defaults.timeout,
    )?)
}
