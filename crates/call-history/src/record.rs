//! Call record model
//!
//! [`RawCallRecord`] is what the platform call log hands out: one row per
//! call, numbers as dialled. [`CallRecord`] is the canonical form kept in the
//! store: one row per [`PhoneNumberKey`], describing the most recent call to
//! or from that number.

use serde::{Deserialize, Serialize};

use crate::number::PhoneNumberKey;

/// Call direction / outcome as reported by the platform call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallType {
    Incoming,
    Outgoing,
    Missed,
    Voicemail,
    Rejected,
    Blocked,
    AnsweredElsewhere,
    /// Code this crate does not know about, kept as-is
    Other(i32),
}

impl CallType {
    /// Map a platform call-log type code
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => CallType::Incoming,
            2 => CallType::Outgoing,
            3 => CallType::Missed,
            4 => CallType::Voicemail,
            5 => CallType::Rejected,
            6 => CallType::Blocked,
            7 => CallType::AnsweredElsewhere,
            other => CallType::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            CallType::Incoming => 1,
            CallType::Outgoing => 2,
            CallType::Missed => 3,
            CallType::Voicemail => 4,
            CallType::Rejected => 5,
            CallType::Blocked => 6,
            CallType::AnsweredElsewhere => 7,
            CallType::Other(code) => *code,
        }
    }

    /// Human readable label for list rows
    pub fn label(&self) -> &'static str {
        match self {
            CallType::Incoming => "Incoming",
            CallType::Outgoing => "Outgoing",
            CallType::Missed => "Missed",
            CallType::Voicemail => "Voicemail",
            CallType::Rejected => "Rejected",
            CallType::Blocked => "Blocked",
            CallType::AnsweredElsewhere => "Answered elsewhere",
            CallType::Other(_) => "Unknown",
        }
    }
}

/// One call-log row as read from the platform provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCallRecord {
    /// Number exactly as logged by the platform
    pub number: String,
    pub call_type: CallType,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    pub duration_secs: u64,
}

impl RawCallRecord {
    pub fn new(number: impl Into<String>, call_type: CallType, timestamp_ms: i64) -> Self {
        Self {
            number: number.into(),
            call_type,
            timestamp_ms,
            duration_secs: 0,
        }
    }

    pub fn with_duration(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }
}

/// One contact row as read from the contact provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub number: String,
    pub display_name: Option<String>,
    pub photo: Option<String>,
}

impl ContactEntry {
    pub fn new(number: impl Into<String>, display_name: Option<String>, photo: Option<String>) -> Self {
        Self {
            number: number.into(),
            display_name,
            photo,
        }
    }
}

/// Name and photo resolved for one number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub display_name: Option<String>,
    pub photo: Option<String>,
}

/// Canonical, deduplicated history entry (one per number)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub number: PhoneNumberKey,
    pub display_name: Option<String>,
    pub call_type: CallType,
    /// Timestamp of the most recent call for this number (ms since epoch)
    pub timestamp_ms: i64,
    pub duration_secs: u64,
    pub photo: Option<String>,
}

impl CallRecord {
    /// Timestamp as a UTC date-time, `None` if out of range
    pub fn timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    pub fn has_name(&self) -> bool {
        self.display_name.is_some()
    }
}

/// Call-log row for a stored record; name and photo are resolved again on merge
impl From<CallRecord> for RawCallRecord {
    fn from(record: CallRecord) -> Self {
        RawCallRecord {
            number: record.number.into_string(),
            call_type: record.call_type,
            timestamp_ms: record.timestamp_ms,
            duration_secs: record.duration_secs,
        }
    }
}

/// `Some` only for values that carry visible text
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
