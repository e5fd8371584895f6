//! Settings command handler.

use std::fmt::Write;

use dtdesk_core::{Panel, Settings};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &Settings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "App title:         {}", s.app_title.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Header:            {}", s.header.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Add sources:       {}", on_off(!s.disable_add_sources));
    let _ = writeln!(out, "Edit sources:      {}", on_off(!s.disable_edit_sources));
    let _ = writeln!(out, "Edit layout:       {}", on_off(!s.disable_edit_layout));
    let _ = writeln!(out, "Profile reports:   {}", on_off(!s.disable_profile_reports));
    let _ = write!(out, "Push channel:      {}", on_off(s.enable_push_channel));
    for (key, value) in &s.extra {
        let _ = write!(out, "\n{key}: {value}");
    }
    out
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

pub fn handle(panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    let settings = util::settings(panel);
    let out = output::render_single(global.output, settings.as_ref(), detail, |s| {
        s.app_title.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
