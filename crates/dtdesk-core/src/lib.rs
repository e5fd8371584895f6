// dtdesk-core: State synchronization engine between dtdesk-api and consumers (CLI).

pub mod action;
pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod model;
pub mod panel;
pub mod push;
pub mod reducer;
pub mod selectors;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::Action;
pub use config::PanelConfig;
pub use error::CoreError;
pub use gateway::{BusyTarget, ErrorHandler, Request, RequestGateway, RequestOptions};
pub use layout::{LayoutChange, LayoutDraft, LayoutEntry};
pub use panel::{ConnectionState, Panel};
pub use push::PushListener;
pub use reducer::reduce;
pub use store::{StateStream, Store};

// Re-export model types at the crate root for ergonomics.
pub use model::{LoadState, Modal, Node, RootState, Settings, Source, SourceCode, ViewPage, ViewUrls};

// Transport knobs consumers need to build a `PanelConfig`.
pub use dtdesk_api::ReconnectConfig;
