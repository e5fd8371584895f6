// ── Domain model ──
//
// Canonical client-side representation of the server's catalog.
// Entities are immutable once built: every change produces a new value
// through the reducer, and unchanged entities are shared by `Arc`.

pub mod node;
pub mod settings;
pub mod source;
pub mod state;

pub use node::{Node, ViewPage, ViewUrls};
pub use settings::Settings;
pub use source::{Source, SourceCode};
pub use state::{LoadState, Modal, RootState};
