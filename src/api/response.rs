//! JSON envelope shared by every response body.
//!
//! ```json
//! {"timestamp":"2026-01-01T12:00:00.000","status":"success","data":{}}
//! {"timestamp":"2026-01-01T12:00:00.000","status":"error","message":"..."}
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            timestamp: Utc::now(),
            status: Status::Success,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: Status::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// `2026-01-01T12:00:00.000` (UTC, millisecond precision).
pub mod timestamp_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }
}
