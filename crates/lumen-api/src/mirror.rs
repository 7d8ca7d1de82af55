// Screen mirror endpoints
//
// One-shot HTTP equivalents of the mirror socket commands. Used when the
// socket is not open.

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{MirrorAck, MirrorSettings, MirrorStartRequest, MirrorStatus};

impl BridgeClient {
    /// Current mirror status.
    ///
    /// `GET /mirror/status`
    pub async fn mirror_status(&self) -> Result<MirrorStatus, Error> {
        self.get("mirror/status").await
    }

    /// Start mirroring.
    ///
    /// `POST /mirror/start` with `{fps, brightness}`. Fails with HTTP 400 if
    /// mirroring is already running.
    pub async fn start_mirror(&self, request: &MirrorStartRequest) -> Result<MirrorAck, Error> {
        self.post("mirror/start", request).await
    }

    /// Stop mirroring.
    ///
    /// `POST /mirror/stop`. Fails with HTTP 400 if mirroring is not running.
    pub async fn stop_mirror(&self) -> Result<MirrorAck, Error> {
        self.post_empty("mirror/stop").await
    }

    /// Update mirror settings while running.
    ///
    /// `POST /mirror/settings`. Only the fields that are set are sent.
    pub async fn update_mirror_settings(
        &self,
        settings: &MirrorSettings,
    ) -> Result<MirrorAck, Error> {
        self.post("mirror/settings", settings).await
    }
}
