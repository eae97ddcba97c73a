//! Automation configuration snapshot.
//!
//! Read once at startup by the host and passed explicitly to the wait engine,
//! the built-in actions and the object container. Durations are written in
//! milliseconds:
//!
//! ```yaml
//! wait_for_still_element_before_clicking: true
//! highlight_elements: false
//! default_element_timeout_ms: 5000
//! poll_interval_ms: 50
//! ```

use crate::result::{AutomationError, AutomationResult};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

/// Options consumed by the action pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Wait for the target to stop moving and become enabled before clicking
    pub wait_for_still_element_before_clicking: bool,
    /// Highlight each action's target before the action runs
    pub highlight_elements: bool,
    /// Timeout applied to element waits that do not override it
    #[serde(rename = "default_element_timeout_ms", with = "millis")]
    pub default_element_timeout: Duration,
    /// Interval between wait polls
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            wait_for_still_element_before_clicking: false,
            highlight_elements: false,
            default_element_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl AutomationConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stillness wait before clicks
    #[must_use]
    pub const fn with_wait_for_still_element(mut self, enabled: bool) -> Self {
        self.wait_for_still_element_before_clicking = enabled;
        self
    }

    /// Set target highlighting
    #[must_use]
    pub const fn with_highlight_elements(mut self, enabled: bool) -> Self {
        self.highlight_elements = enabled;
        self
    }

    /// Set the default element timeout
    #[must_use]
    pub const fn with_default_element_timeout(mut self, timeout: Duration) -> Self {
        self.default_element_timeout = timeout;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Parse from JSON
    pub fn from_json_str(json: &str) -> AutomationResult<Self> {
        serde_json::from_str::<Self>(json)?.validated()
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> AutomationResult<Self> {
        serde_yaml_ng::from_str::<Self>(yaml)?.validated()
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> AutomationResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AutomationError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Err(AutomationError::config(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    fn validated(self) -> AutomationResult<Self> {
        if self.poll_interval.is_zero() {
            return Err(AutomationError::config("poll_interval_ms must be positive"));
        }
        Ok(self)
    }
}

mod millis {
    use super::{Deserialize, Deserializer, Duration, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AutomationConfig::default();
        assert!(!config.wait_for_still_element_before_clicking);
        assert!(!config.highlight_elements);
        assert_eq!(config.default_element_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_builder() {
        let config = AutomationConfig::new()
            .with_wait_for_still_element(true)
            .with_default_element_timeout(Duration::from_secs(2));
        assert!(config.wait_for_still_element_before_clicking);
        assert_eq!(config.default_element_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            AutomationConfig::from_json_str(r#"{"wait_for_still_element_before_clicking": true}"#)
                .unwrap();
        assert!(config.wait_for_still_element_before_clicking);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_from_yaml() {
        let config = AutomationConfig::from_yaml_str(
            "default_element_timeout_ms: 2500\npoll_interval_ms: 25\nhighlight_elements: true\n",
        )
        .unwrap();
        assert!(config.highlight_elements);
        assert_eq!(config.default_element_timeout, Duration::from_millis(2500));
        assert_eq!(config.poll_interval, Duration::from_millis(25));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = AutomationConfig::from_json_str(r#"{"poll_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, AutomationError::Config { .. }));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AutomationConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, AutomationError::Config { .. }));
    }

    #[test]
    fn test_round_trip_uses_millis() {
        let json = serde_json::to_value(AutomationConfig::default()).unwrap();
        assert_eq!(json["default_element_timeout_ms"].as_u64(), Some(10_000));
        assert_eq!(json["poll_interval_ms"].as_u64(), Some(100));
    }

    #[test]
    fn test_from_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagebind.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "wait_for_still_element_before_clicking: true").unwrap();

        let config = AutomationConfig::from_path(&path).unwrap();
        assert!(config.wait_for_still_element_before_clicking);

        let other = dir.path().join("pagebind.toml");
        std::fs::write(&other, "").unwrap();
        assert!(AutomationConfig::from_path(&other).is_err());
    }
}
