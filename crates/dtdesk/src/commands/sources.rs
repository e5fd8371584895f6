//! Source command handlers.

use std::fmt::Write;
use std::sync::Arc;

use tabled::Tabled;

use dtdesk_core::{Panel, Source, selectors};

use crate::cli::{GlobalOpts, SourceDraftArgs, SourcesArgs, SourcesCommand};
use crate::error::CliError;
use crate::output;

use super::{nodes, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Nodes")]
    nodes: String,
    #[tabled(rename = "Active")]
    active: usize,
    #[tabled(rename = "Visible")]
    visible: &'static str,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&Arc<Source>> for SourceRow {
    fn from(s: &Arc<Source>) -> Self {
        let more = if s.nodes_fully_loaded { "" } else { "+" };
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            nodes: format!("{}{more}", s.nodes.len()),
            active: selectors::active_node_count(s),
            visible: if s.visible { "yes" } else { "no" },
            error: s.error.clone().unwrap_or_default(),
        }
    }
}

fn detail(s: &Arc<Source>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", s.id);
    let _ = writeln!(out, "Name:        {}", s.name);
    let _ = writeln!(out, "Package:     {} ({})", s.package_name, s.package_path);
    let _ = writeln!(out, "Visible:     {}", s.visible);
    let _ = writeln!(out, "Editable:    {}", s.editable);
    let _ = writeln!(
        out,
        "Nodes:       {}{}",
        s.nodes.len(),
        if s.nodes_fully_loaded { "" } else { " (more available)" }
    );
    if let Some(err) = &s.error {
        let _ = writeln!(out, "Error:       {err}");
    }
    let _ = writeln!(out, "\n── list_paths.py ──\n{}", s.code.list_paths.trim_end());
    let _ = write!(out, "\n── get_data.py ──\n{}", s.code.get_data.trim_end());
    if !s.code.save_data.trim().is_empty() {
        let _ = write!(out, "\n\n── save_data.py ──\n{}", s.code.save_data.trim_end());
    }
    out
}

/// Apply CLI draft flags on top of `base`.
fn apply_draft(mut base: Source, args: &SourceDraftArgs) -> Result<Source, CliError> {
    if let Some(name) = &args.name {
        base.name.clone_from(name);
    }
    if let Some(path) = &args.list_paths {
        base.code.list_paths = util::read_script(path, "list-paths")?;
    }
    if let Some(path) = &args.get_data {
        base.code.get_data = util::read_script(path, "get-data")?;
    }
    if let Some(path) = &args.save_data {
        base.code.save_data = util::read_script(path, "save-data")?;
    }
    Ok(base)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: SourcesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SourcesCommand::List { all } => {
            let state = panel.snapshot();
            let list: Vec<Arc<Source>> = if all {
                selectors::sources(&state).to_vec()
            } else {
                selectors::visible_sources(&state)
                    .into_iter()
                    .cloned()
                    .collect()
            };
            let out = output::render_list(
                global.output,
                &list,
                |s| SourceRow::from(s),
                |s| s.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SourcesCommand::Show { id } => {
            let source = util::resolve_source(&panel.snapshot(), &id)?;
            let out = output::render_single(global.output, &source, detail, |s| s.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SourcesCommand::LoadNodes { id, limit } => {
            let source = util::resolve_source(&panel.snapshot(), &id)?;
            if selectors::can_load_more(&source) {
                let limit = limit.or(panel.config().node_page_size);
                panel.gateway().load_nodes(&id, limit).await?;
            } else {
                util::print_notice(&format!("All nodes of '{id}' are already loaded"), global.quiet);
            }
            let source = util::resolve_source(&panel.snapshot(), &id)?;
            nodes::print_nodes(&source, None, false, global)
        }

        SourcesCommand::Create(draft_args) => {
            util::ensure_enabled(util::settings(panel).disable_add_sources, "add sources")?;
            let draft = apply_draft(Source::template(), &draft_args)?;
            let name = draft.name.clone();
            panel
                .gateway()
                .create_source(draft, None)
                .await?;
            util::print_notice(&format!("Source '{name}' created"), global.quiet);
            Ok(())
        }

        SourcesCommand::Update { id, draft } => {
            util::ensure_enabled(util::settings(panel).disable_edit_sources, "edit sources")?;
            let current = util::resolve_source(&panel.snapshot(), &id)?;
            if !current.editable {
                return Err(CliError::Validation {
                    field: "source".into(),
                    reason: format!("'{id}' is not editable"),
                });
            }
            let updated = apply_draft(Source::clone(&current), &draft)?;
            panel
                .gateway()
                .update_source(updated, None)
                .await?;
            util::print_notice(&format!("Source '{id}' updated"), global.quiet);
            Ok(())
        }
    }
}
