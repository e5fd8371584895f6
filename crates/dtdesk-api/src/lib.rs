// dtdesk-api: Async client for the dtale-desktop server (HTTP endpoints + push channel)

pub mod client;
pub mod error;
pub mod models;
pub mod push;
pub mod transport;

mod decode;
mod nodes;
mod settings;
mod sources;

pub use client::ApiClient;
pub use error::Error;
pub use nodes::PROFILE_REPORT_WATCH_TIMEOUT;
pub use models::{
    ActionBatch, ApiAction, ApiLayoutChange, ApiNode, ApiSettings, ApiSource, ProfileReportStatus,
    PushMessage,
};
pub use push::{PushHandle, ReconnectConfig, push_url};
pub use transport::TransportConfig;
