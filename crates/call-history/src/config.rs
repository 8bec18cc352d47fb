//! Call-history configuration
//!
//! ```rust
//! use dialer_call_history::config::{HistoryConfig, NumberKeyConfig};
//!
//! let config = HistoryConfig::new()
//!     .with_window(Some(200))
//!     .with_number_key(NumberKeyConfig::new("44", 10));
//!
//! assert_eq!(config.window, Some(200));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, HistoryResult};

/// Rules for turning a raw phone number into a canonical matching key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberKeyConfig {
    /// Country calling code stripped from over-long numbers (digits only)
    pub country_code: String,
    /// Number of trailing digits kept for matching
    pub significant_digits: usize,
}

impl NumberKeyConfig {
    pub fn new(country_code: impl Into<String>, significant_digits: usize) -> Self {
        Self {
            country_code: country_code.into(),
            significant_digits,
        }
    }

    pub fn validate(&self) -> HistoryResult<()> {
        if self.significant_digits == 0 {
            return Err(HistoryError::invalid_configuration(
                "number_key.significant_digits",
                "must be greater than zero",
            ));
        }
        if !self.country_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(HistoryError::invalid_configuration(
                "number_key.country_code",
                "must contain digits only",
            ));
        }
        Ok(())
    }
}

impl Default for NumberKeyConfig {
    fn default() -> Self {
        Self::new("91", 10)
    }
}

/// Configuration for one sync pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of raw call-log records read per sync (`None` reads everything)
    pub window: Option<usize>,
    /// Upper bound for a single provider read, in milliseconds
    pub provider_timeout_ms: u64,
    /// Number normalization rules shared by call records and contacts
    pub number_key: NumberKeyConfig,
}

impl HistoryConfig {
    pub fn new() -> Self {
        Self {
            window: Some(500),
            provider_timeout_ms: 10_000,
            number_key: NumberKeyConfig::default(),
        }
    }

    /// Set the raw record window
    pub fn with_window(mut self, window: Option<usize>) -> Self {
        self.window = window;
        self
    }

    /// Set the provider read timeout
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set number normalization rules
    pub fn with_number_key(mut self, number_key: NumberKeyConfig) -> Self {
        self.number_key = number_key;
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> HistoryResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| HistoryError::invalid_configuration("history", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn validate(&self) -> HistoryResult<()> {
        if self.window == Some(0) {
            return Err(HistoryError::invalid_configuration(
                "history.window",
                "a zero window would never read any record; use None for unbounded",
            ));
        }
        if self.provider_timeout_ms == 0 {
            return Err(HistoryError::invalid_configuration(
                "history.provider_timeout_ms",
                "must be greater than zero",
            ));
        }
        self.number_key.validate()
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new()
    }
}
