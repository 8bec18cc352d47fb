//! Canonical phone-number keys
//!
//! Call-log entries and contacts spell the same number in many ways
//! (`+91 98450 12345`, `098450-12345`, `9845012345`). Matching happens on a
//! key built from the digits only: the country code and leading trunk zeros
//! are dropped from over-long numbers and the result is cut to the last
//! `significant_digits` digits.
//!
//! ```rust
//! use dialer_call_history::number::NumberNormalizer;
//!
//! let normalizer = NumberNormalizer::default();
//! assert_eq!(normalizer.normalize("+91 98450-12345"), "9845012345");
//! assert_eq!(normalizer.normalize("098450 12345"), "9845012345");
//! assert_eq!(normalizer.normalize("5551234"), "5551234");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::NumberKeyConfig;

/// Normalized number used as merge and lookup identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumberKey(String);

impl PhoneNumberKey {
    /// Wrap an already-canonical key (e.g. read back from the store)
    pub fn from_canonical(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumberKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds [`PhoneNumberKey`]s from raw number strings
#[derive(Debug, Clone, Default)]
pub struct NumberNormalizer {
    config: NumberKeyConfig,
}

impl NumberNormalizer {
    pub fn new(config: NumberKeyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NumberKeyConfig {
        &self.config
    }

    /// Digits-only canonical form; empty when the input has no digits
    pub fn normalize(&self, raw: &str) -> String {
        let limit = self.config.significant_digits;
        let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        let country_code = self.config.country_code.as_str();
        if !country_code.is_empty() && digits.starts_with(country_code) && digits.len() > limit {
            digits.drain(..country_code.len());
        }
        while digits.starts_with('0') && digits.len() > limit {
            digits.remove(0);
        }
        if digits.len() > limit {
            digits.drain(..digits.len() - limit);
        }
        digits
    }

    /// Key for a raw number.
    ///
    /// Returns `None` for blank input. Input without any digit (a network
    /// label such as "Private") keeps its trimmed text as key.
    pub fn key(&self, raw: &str) -> Option<PhoneNumberKey> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = self.normalize(trimmed);
        if normalized.is_empty() {
            Some(PhoneNumberKey(trimmed.to_string()))
        } else {
            Some(PhoneNumberKey(normalized))
        }
    }
}
