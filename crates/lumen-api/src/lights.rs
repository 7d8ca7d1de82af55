// Light and bridge status endpoints

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{BridgeStatus, LightStatus, LightsStatusResponse};

impl BridgeClient {
    /// Fetch the status of every light known to the bridge.
    ///
    /// `GET /api/lights/status`
    pub async fn light_status(&self) -> Result<Vec<LightStatus>, Error> {
        let resp: LightsStatusResponse = self.get("api/lights/status").await?;
        Ok(resp.lights)
    }

    /// Fetch the bridge connection status.
    ///
    /// `GET /api/bridge/status`
    pub async fn bridge_status(&self) -> Result<BridgeStatus, Error> {
        self.get("api/bridge/status").await
    }
}
