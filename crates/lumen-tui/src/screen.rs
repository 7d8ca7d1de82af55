//! Screen identifiers.

use std::fmt;

/// Primary screens, navigable by number keys 1-4 and Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Lights, // 1
    Configurations, // 2
    Mirror,         // 3
    Positions,      // 4
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 4] = [
        Self::Lights,
        Self::Configurations,
        Self::Mirror,
        Self::Positions,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::Lights => 1,
            Self::Configurations => 2,
            Self::Mirror => 3,
            Self::Positions => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Lights),
            2 => Some(Self::Configurations),
            3 => Some(Self::Mirror),
            4 => Some(Self::Positions),
            _ => None,
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lights => "Lights",
            Self::Configurations => "Configurations",
            Self::Mirror => "Mirror",
            Self::Positions => "Positions",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
