//! Shared error type across homeprom crates.

use thiserror::Error;

/// Stable error classification, used as the `outcome` label of refresh
/// counters and in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid configuration.
    Config,
    /// Upstream did not answer within the client timeout.
    Timeout,
    /// Connection or transport failure.
    Network,
    /// Upstream answered with a non-success status code.
    Status,
    /// Response body could not be decoded into a reading.
    Decode,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// String representation used in metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::Status => "status",
            ErrorKind::Decode => "decode",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HomepromError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum HomepromError {
    #[error("config: {0}")]
    Config(String),
    #[error("upstream {source_name} timed out")]
    Timeout { source_name: &'static str },
    #[error("upstream {source_name} unreachable: {msg}")]
    Network { source_name: &'static str, msg: String },
    #[error("upstream {source_name} returned status {status}")]
    Status { source_name: &'static str, status: u16 },
    #[error("upstream {source_name} sent an undecodable body: {msg}")]
    Decode { source_name: &'static str, msg: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl HomepromError {
    /// Map the error onto its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HomepromError::Config(_) => ErrorKind::Config,
            HomepromError::Timeout { .. } => ErrorKind::Timeout,
            HomepromError::Network { .. } => ErrorKind::Network,
            HomepromError::Status { .. } => ErrorKind::Status,
            HomepromError::Decode { .. } => ErrorKind::Decode,
            HomepromError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for a decode failure.
    pub fn decode(source_name: &'static str, msg: impl Into<String>) -> Self {
        HomepromError::Decode {
            source_name,
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable_label_values() {
        let e = HomepromError::Status {
            source_name: "hue",
            status: 503,
        };
        assert_eq!(e.kind().as_str(), "status");
        assert_eq!(e.to_string(), "upstream hue returned status 503");
        assert_eq!(HomepromError::decode("quote", "no match").kind(), ErrorKind::Decode);
    }
}
