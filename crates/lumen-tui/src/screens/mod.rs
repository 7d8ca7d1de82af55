//! Screen implementations. Each screen is a top-level Component.

pub mod configs;
pub mod lights;
pub mod mirror;
pub mod positions;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Lights, Box::new(lights::LightsScreen::new())),
        (
            ScreenId::Configurations,
            Box::new(configs::ConfigsScreen::new()),
        ),
        (ScreenId::Mirror, Box::new(mirror::MirrorScreen::new())),
        (
            ScreenId::Positions,
            Box::new(positions::PositionsScreen::new()),
        ),
    ]
}
