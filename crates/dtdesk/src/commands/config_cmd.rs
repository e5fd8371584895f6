//! Config subcommand handlers.

use std::fmt::Write;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Render the config as TOML with profiles in name order.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(default) = &cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for name in profile_names(cfg) {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        let _ = writeln!(out, "push = {}", p.push);
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(size) = p.page_size {
            let _ = writeln!(out, "page_size = {size}");
        }
    }

    out.trim_end().to_owned()
}

fn profile_names(cfg: &Config) -> Vec<String> {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort();
    names
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(global.output, &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::AddProfile {
            name,
            server,
            timeout,
            no_push,
            page_size,
        } => {
            let mut cfg = config::load_config()?;
            let profile = Profile {
                server,
                timeout,
                push: !no_push,
                page_size,
            };
            // Reject unusable URLs before they reach the file.
            dtdesk_config::profile_to_panel_config(&profile, cfg.defaults.timeout)?;

            let replaced = cfg.profiles.insert(name.clone(), profile).is_some();
            let default_missing = cfg
                .default_profile
                .as_ref()
                .is_none_or(|d| !cfg.profiles.contains_key(d));
            if default_missing {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;

            let verb = if replaced { "updated" } else { "added" };
            util::print_notice(&format!("Profile '{name}' {verb}"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                let available = profile_names(&cfg);
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            util::print_notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_render_in_name_order() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("zeta".into(), Profile::new("http://zeta:5000"));
        let mut lab = Profile::new("http://lab:5000");
        lab.page_size = Some(50);
        cfg.profiles.insert("lab".into(), lab);

        let text = format_config(&cfg);
        let lab_at = text.find("[profiles.lab]");
        let zeta_at = text.find("[profiles.zeta]");
        assert!(lab_at.is_some() && lab_at < zeta_at, "{text}");
        assert!(text.contains("page_size = 50"));
        assert!(text.starts_with("default_profile = \"default\""));
    }
}
