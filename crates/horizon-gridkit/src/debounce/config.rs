//! Serializable debouncer settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for a [`GridDebouncer`](crate::GridDebouncer).
///
/// Missing fields take their defaults, so an empty document is valid.
///
/// ```
/// use std::time::Duration;
/// use horizon_gridkit::DebounceConfig;
///
/// let config = DebounceConfig::from_toml_str("delay_ms = -10").unwrap();
/// assert_eq!(config.delay(), Duration::ZERO);
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Debounce window in milliseconds. Negative values mean zero.
    pub delay_ms: i64,
    /// Whether notifications are acted on at all.
    pub enabled: bool,
}

impl DebounceConfig {
    /// Default debounce window.
    pub const DEFAULT_DELAY_MS: i64 = 250;

    /// Sets the window in milliseconds.
    pub fn with_delay_ms(mut self, delay_ms: i64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Sets the window, saturating at `i64::MAX` milliseconds.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// Sets whether the debouncer reacts to notifications.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The window as a duration, with negatives clamped to zero.
    pub fn delay(&self) -> Duration {
        clamp_delay_ms(self.delay_ms)
    }

    /// Parses settings from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Parses settings from JSON.
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Writes the settings as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: Self::DEFAULT_DELAY_MS,
            enabled: true,
        }
    }
}

pub(crate) fn clamp_delay_ms(delay_ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(delay_ms).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridKitError;

    #[test]
    fn test_defaults() {
        let config = DebounceConfig::default();
        assert_eq!(config.delay(), Duration::from_millis(250));
        assert!(config.enabled);
        assert_eq!(DebounceConfig::from_toml_str("").unwrap(), config);
        assert_eq!(DebounceConfig::from_json_str("{}").unwrap(), config);
    }

    #[test]
    fn test_negative_delay_clamps() {
        assert_eq!(clamp_delay_ms(-10), Duration::ZERO);
        assert_eq!(clamp_delay_ms(i64::MIN), Duration::ZERO);
        assert_eq!(clamp_delay_ms(40), Duration::from_millis(40));
    }

    #[test]
    fn test_builder_methods() {
        let config = DebounceConfig::default()
            .with_delay(Duration::from_millis(75))
            .with_enabled(false);
        assert_eq!(config, DebounceConfig { delay_ms: 75, enabled: false });
        assert_eq!(config.with_delay_ms(-1).delay(), Duration::ZERO);
    }

    #[test]
    fn test_parse_json() {
        let config = DebounceConfig::from_json_str(r#"{"delay_ms": 500, "enabled": false}"#).unwrap();
        assert_eq!(config, DebounceConfig { delay_ms: 500, enabled: false });
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DebounceConfig::default().with_delay_ms(120);
        let text = config.to_toml_string().unwrap();
        assert_eq!(DebounceConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            DebounceConfig::from_toml_str("delay_ms = \"soon\""),
            Err(GridKitError::ConfigToml(_))
        ));
        assert!(matches!(
            DebounceConfig::from_json_str("[1, 2]"),
            Err(GridKitError::ConfigJson(_))
        ));
    }
}
