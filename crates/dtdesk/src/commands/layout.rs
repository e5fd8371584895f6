//! Layout command handlers.

use tabled::Tabled;

use dtdesk_core::{LayoutDraft, LayoutEntry, Panel, selectors};

use crate::cli::{GlobalOpts, LayoutArgs, LayoutCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Visible")]
    visible: &'static str,
    #[tabled(rename = "Sort")]
    sort_value: i64,
}

fn current_layout(panel: &Panel) -> LayoutDraft {
    LayoutDraft::from_sources(selectors::sources(&panel.snapshot()))
}

fn print_layout(draft: &LayoutDraft, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = draft.entries();
    let out = output::render_list(
        global.output,
        entries,
        |e: &LayoutEntry| LayoutRow {
            position: draft.position(&e.id).unwrap_or_default(),
            id: e.id.clone(),
            name: e.name.clone(),
            visible: if e.visible { "yes" } else { "hidden" },
            sort_value: e.sort_value,
        },
        |e| e.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Send the draft's changes and show the resulting catalog order.
async fn save(panel: &Panel, draft: &LayoutDraft, global: &GlobalOpts) -> Result<(), CliError> {
    if !panel.gateway().update_layout(draft.changes()).await? {
        util::print_notice("Layout unchanged", global.quiet);
    }
    print_layout(&current_layout(panel), global)
}

pub async fn handle(panel: &Panel, args: LayoutArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LayoutCommand::Show => print_layout(&current_layout(panel), global),

        LayoutCommand::Move { id, position } => {
            util::ensure_enabled(util::settings(panel).disable_edit_layout, "edit layout")?;
            let mut layout = current_layout(panel);
            let from = layout
                .position(&id)
                .ok_or_else(|| CliError::source_not_found(&id))?;
            if !layout.move_entry(from, position) {
                return Err(CliError::Validation {
                    field: "position".into(),
                    reason: format!(
                        "{position} is out of range (0..{})",
                        layout.entries().len()
                    ),
                });
            }
            save(panel, &layout, global).await
        }

        LayoutCommand::Toggle { id } => {
            util::ensure_enabled(util::settings(panel).disable_edit_layout, "edit layout")?;
            let mut layout = current_layout(panel);
            if layout.toggle_visible(&id).is_none() {
                return Err(CliError::source_not_found(&id));
            }
            save(panel, &layout, global).await
        }
    }
}
