// ── Screen mirror snapshot ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::light::Rgb;

pub use lumen_api::models::{MirrorSettings, MirrorStartRequest};

/// Latest mirror status, from a poll or a socket frame.
///
/// `colors` keeps frame order. When `running` is false the colors are
/// left over from the last session and are not live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSnapshot {
    pub running: bool,
    pub fps: u32,
    pub brightness: Option<u32>,
    pub colors: IndexMap<String, Rgb>,
}

impl MirrorSnapshot {
    /// Colors only while running; `None` means nothing live to show.
    pub fn live_colors(&self) -> Option<&IndexMap<String, Rgb>> {
        self.running.then_some(&self.colors)
    }
}
