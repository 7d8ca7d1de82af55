// ── Lighting configurations ──

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum description length shown in pickers and tables.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// A saved lighting preset. Opaque beyond its name and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub description: String,
}

impl Configuration {
    /// Trimmed description cut to [`DESCRIPTION_PREVIEW_CHARS`] characters.
    pub fn short_description(&self) -> &str {
        let trimmed = self.description.trim();
        match trimmed.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
            Some((idx, _)) => &trimmed[..idx],
            None => trimmed,
        }
    }
}

/// A validated apply request.
///
/// Only constructible through [`ApplyRequest::new`] or
/// [`ApplyRequest::from_form`], so a request with no configuration
/// selected can never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyRequest {
    config_name: String,
    transition_secs: u32,
    duration_minutes: Option<u32>,
}

impl ApplyRequest {
    pub fn new(
        config_name: impl Into<String>,
        transition_secs: u32,
        duration_minutes: Option<u32>,
    ) -> Result<Self, CoreError> {
        let config_name = config_name.into();
        if config_name.trim().is_empty() {
            return Err(CoreError::NoConfigurationSelected);
        }
        Ok(Self {
            config_name,
            transition_secs,
            duration_minutes,
        })
    }

    /// Build a request from raw text inputs.
    ///
    /// An empty transition means 0 seconds; an empty duration means the
    /// preset stays applied indefinitely. Anything that is not a
    /// non-negative whole number is rejected.
    pub fn from_form(name: &str, transition: &str, duration: &str) -> Result<Self, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::NoConfigurationSelected);
        }
        let transition_secs = parse_optional_number(transition, "transition time")?.unwrap_or(0);
        let duration_minutes = parse_optional_number(duration, "duration")?;
        Self::new(name, transition_secs, duration_minutes)
    }

    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn transition_secs(&self) -> u32 {
        self.transition_secs
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }
}

fn parse_optional_number(input: &str, field: &str) -> Result<Option<u32>, CoreError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse::<u32>()
        .map(Some)
        .map_err(|_| CoreError::ValidationFailed {
            message: format!("{field} must be a whole number, got {input:?}"),
        })
}

/// Result of a successful apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub config_name: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected_before_anything_else() {
        for name in ["", "   "] {
            assert!(matches!(
                ApplyRequest::from_form(name, "abc", "xyz"),
                Err(CoreError::NoConfigurationSelected)
            ));
        }
        assert!(matches!(
            ApplyRequest::new("", 0, None),
            Err(CoreError::NoConfigurationSelected)
        ));
    }

    #[test]
    fn empty_fields_take_defaults() {
        let req = ApplyRequest::from_form("Relax", "", " ").unwrap();
        assert_eq!(req.transition_secs(), 0);
        assert_eq!(req.duration_minutes(), None);
    }

    #[test]
    fn numeric_fields_parse() {
        let req = ApplyRequest::from_form("Movie Night", "5", "30").unwrap();
        assert_eq!(req.config_name(), "Movie Night");
        assert_eq!(req.transition_secs(), 5);
        assert_eq!(req.duration_minutes(), Some(30));
    }

    #[test]
    fn non_numeric_input_is_a_validation_error() {
        for (t, d) in [("five", ""), ("", "1.5"), ("-3", "")] {
            assert!(matches!(
                ApplyRequest::from_form("Relax", t, d),
                Err(CoreError::ValidationFailed { .. })
            ));
        }
    }

    #[test]
    fn description_is_trimmed_and_capped() {
        let config = Configuration {
            name: "Long".into(),
            description: format!("  {}  ", "é".repeat(150)),
        };
        assert_eq!(config.short_description().chars().count(), 100);

        let short = Configuration {
            name: "Short".into(),
            description: " cozy ".into(),
        };
        assert_eq!(short.short_description(), "cozy");
    }
}
