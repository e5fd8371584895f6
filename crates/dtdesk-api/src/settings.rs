// Settings endpoint

use tracing::debug;

use crate::client::ApiClient;
use crate::decode::decode_actions;
use crate::error::Error;
use crate::models::{ApiAction, ApiSettings};

impl ApiClient {
    /// Fetch the server-wide feature toggles.
    ///
    /// `GET /settings/`
    pub async fn get_settings(&self) -> Result<Vec<ApiAction>, Error> {
        let url = self.api_url("settings/")?;
        debug!("fetching settings");
        let body = self.get(url, None).await?;
        decode_actions(&body, |settings: ApiSettings| {
            vec![ApiAction::UpdateSettings { settings }]
        })
    }
}
