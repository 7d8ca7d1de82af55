// Light position endpoints
//
// Positions map each light to a screen region for the mirror feature.
// The server owns persistence; these calls load, replace, or reset the
// whole mapping at once.

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{LightPosition, MessageResponse, PositionsResponse, SavePositionsRequest};

impl BridgeClient {
    /// Load light assignments and the slot catalogue.
    ///
    /// `GET /positions`
    pub async fn positions(&self) -> Result<PositionsResponse, Error> {
        self.get("positions").await
    }

    /// Replace every light assignment in one request.
    ///
    /// `POST /positions` with `{lights}`
    pub async fn save_positions(&self, lights: &[LightPosition]) -> Result<MessageResponse, Error> {
        let body = SavePositionsRequest {
            lights: lights.to_vec(),
        };
        self.post("positions", &body).await
    }

    /// Reset assignments to the server defaults.
    ///
    /// `POST /positions/reset`
    pub async fn reset_positions(&self) -> Result<PositionsResponse, Error> {
        self.post_empty("positions/reset").await
    }
}
