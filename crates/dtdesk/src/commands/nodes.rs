//! Node command handlers.

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use dtdesk_core::{Node, Panel, Source, ViewPage, selectors};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Data ID")]
    data_id: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Cached")]
    cached: String,
}

impl NodeRow {
    fn new(node: &Node, color: bool) -> Self {
        Self {
            data_id: node.data_id.clone(),
            path: node.path.clone(),
            status: output::node_status(
                node.is_active(),
                node.error.is_some(),
                node.updating,
                color,
            ),
            cached: cached_at(node),
        }
    }
}

fn cached_at(node: &Node) -> String {
    node.last_cached_at
        .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn detail(node: &Arc<Node>, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Data ID:     {}", node.data_id);
    let _ = writeln!(out, "Source:      {}", node.source_id);
    let _ = writeln!(out, "Path:        {}", node.path);
    let _ = writeln!(
        out,
        "Status:      {}",
        output::node_status(node.is_active(), node.error.is_some(), node.updating, color)
    );
    let cached = cached_at(node);
    if !cached.is_empty() {
        let _ = writeln!(out, "Cached at:   {cached}");
    }
    for page in [
        ViewPage::Table,
        ViewPage::Charts,
        ViewPage::Describe,
        ViewPage::Correlations,
    ] {
        if let Some(url) = node.url_for(page) {
            let _ = writeln!(out, "{:<13}{url}", format!("{page}:"));
        }
    }
    if let Some(err) = &node.error {
        let _ = writeln!(out, "Error:       {err}");
    }
    out.trim_end().to_owned()
}

// ── Shared printers ─────────────────────────────────────────────────

/// Print a source's visible nodes, optionally narrowed by path and activity.
pub fn print_nodes(
    source: &Source,
    filter: Option<&str>,
    active_only: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let nodes: Vec<Arc<Node>> = selectors::filter_nodes(source, filter.unwrap_or_default())
        .into_iter()
        .filter(|n| !active_only || n.is_active())
        .cloned()
        .collect();

    let out = output::render_list(
        global.output,
        &nodes,
        |n| NodeRow::new(n, color),
        |n| n.data_id.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if !source.nodes_fully_loaded {
        util::print_notice(
            &format!("More nodes available: dtdesk sources load-nodes {}", source.id),
            global.quiet,
        );
    }
    Ok(())
}

fn print_node(panel: &Panel, data_id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let node = util::resolve_node(&panel.snapshot(), data_id)?;
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &node,
        |n| detail(n, color),
        |n| n.data_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: NodesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        NodesCommand::List {
            source,
            filter,
            active,
        } => {
            let source = util::resolve_source(&panel.snapshot(), &source)?;
            print_nodes(&source, filter.as_deref(), active, global)
        }

        NodesCommand::View { data_id, page } => {
            util::resolve_node(&panel.snapshot(), &data_id)?;
            let page = ViewPage::from(page);
            let Some(url) = panel.gateway().view_node(&data_id, page).await? else {
                return Err(CliError::ApiError {
                    message: format!("Server returned no {page} URL for node '{data_id}'"),
                });
            };
            output::print_output(&url, global.quiet);
            Ok(())
        }

        NodesCommand::Kill { data_id } => {
            util::resolve_node(&panel.snapshot(), &data_id)?;
            panel.gateway().kill_node(&data_id).await?;
            print_node(panel, &data_id, global)
        }

        NodesCommand::ClearCache { data_id } => {
            util::resolve_node(&panel.snapshot(), &data_id)?;
            panel.gateway().clear_node_cache(&data_id).await?;
            print_node(panel, &data_id, global)
        }

        NodesCommand::Profile { data_id } => {
            util::ensure_enabled(
                util::settings(panel).disable_profile_reports,
                "profile reports",
            )?;
            util::resolve_node(&panel.snapshot(), &data_id)?;

            let bar = spinner(format!("Building profile report for {data_id}"), global.quiet);
            let result = panel
                .gateway()
                .open_profile_report(&data_id, |url| {
                    bar.suspend(|| output::print_output(url.as_str(), global.quiet));
                })
                .await;
            bar.finish_and_clear();
            result?;

            print_node(panel, &data_id, global)
        }
    }
}
