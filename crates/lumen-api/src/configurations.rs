// Configuration endpoints
//
// Saved lighting presets and the apply action.

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{ApplyConfigRequest, ApplyResponse, Configuration};

impl BridgeClient {
    /// List saved configurations.
    ///
    /// `GET /configurations`
    pub async fn list_configurations(&self) -> Result<Vec<Configuration>, Error> {
        self.get("configurations").await
    }

    /// Apply a configuration by name.
    ///
    /// `POST /apply` with `{config_name, transition_time_secs, duration_minutes}`.
    /// An unknown name comes back as `Error::Api { status: 404, .. }`.
    pub async fn apply_configuration(
        &self,
        request: &ApplyConfigRequest,
    ) -> Result<ApplyResponse, Error> {
        debug!(config = %request.config_name, "applying configuration");
        self.post("apply", request).await
    }
}
