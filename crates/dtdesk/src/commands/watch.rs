//! Live update follower.
//!
//! Prints every action the store applies, plus display-only push
//! notifications, until Ctrl-C or `--duration` elapses.

use std::time::Duration;

use owo_colors::OwoColorize;
use tokio::sync::broadcast::error::RecvError;

use dtdesk_core::{Action, Panel};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// One-line summary of an applied action.
fn describe(action: &Action) -> String {
    let kind = action.kind();
    match action {
        Action::AddSources(sources) => format!("{kind} ({} sources)", sources.len()),
        Action::UpdateSource(source) => format!("{kind} {}", source.id),
        Action::SetSourceUpdating { id, updating } => format!("{kind} {id} {updating}"),
        Action::UpdateNode(node) => format!("{kind} {}", node.data_id),
        Action::SetNodeUpdating { data_id, updating } => format!("{kind} {data_id} {updating}"),
        Action::SetSelectedSource(Some(source)) => format!("{kind} {}", source.id),
        Action::SetOpenModal(Some(modal)) => format!("{kind} {modal}"),
        Action::SetSelectedSource(None) | Action::SetOpenModal(None) => format!("{kind} none"),
        Action::SetError(Some(message)) => format!("{kind} {message}"),
        Action::SetSourcesLoading(loading) => format!("{kind} {loading}"),
        Action::UpdateSettings(_) | Action::SetError(None) | Action::Unknown => kind.to_owned(),
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

pub async fn handle(panel: &Panel, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !panel.push().is_subscribed().await {
        return Err(CliError::Disabled {
            feature: "push channel".into(),
        });
    }

    let color = output::should_color(global.color);
    let mut applied = panel.store().applied();
    let mut notifications = panel.notifications();

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    util::print_notice("Watching for updates (Ctrl-C to stop)", global.quiet);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = &mut deadline => break,
            received = applied.recv() => match received {
                Ok(action) => {
                    output::print_output(&format!("{} {}", timestamp(), describe(&action)), global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "watch output fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            received = notifications.recv() => match received {
                Ok(text) => {
                    let line = if color {
                        format!("{} {}", timestamp(), text.cyan())
                    } else {
                        format!("{} {text}", timestamp())
                    };
                    output::print_output(&line, global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notifications fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dtdesk_core::{Modal, Node, ViewUrls};

    use super::*;

    #[test]
    fn describes_entity_actions() {
        let node = Node {
            data_id: "a".into(),
            source_id: "s1".into(),
            path: "/data/a.csv".into(),
            urls: ViewUrls::default(),
            visible: true,
            last_cached_at: None,
            error: None,
            updating: false,
            sort_value: 0,
        };
        assert_eq!(describe(&Action::UpdateNode(Arc::new(node))), "UPDATE_NODE a");
        assert_eq!(
            describe(&Action::SetOpenModal(Some(Modal::LayoutEditor))),
            "SET_OPEN_MODAL layoutEditor"
        );
        assert_eq!(describe(&Action::SetError(None)), "SET_ERROR");
    }
}
