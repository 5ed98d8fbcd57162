use std::io;
use thiserror::Error;

/// Reasons a probe produced no dimensions.
///
/// Callers of the `probe_*` functions only ever see `None`; the `try_*`
/// variants hand this back for diagnostics.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid signature: expected FF D8, found {:02X} {:02X}", .found[0], .found[1])]
    InvalidSignature { found: [u8; 2] },

    #[error("Malformed marker: {prefix:#04X} {code:#04X}")]
    MalformedMarker { prefix: u8, code: u8 },

    #[error("Inconsistent length {declared} for marker {code:#04X}")]
    InconsistentLength { code: u8, declared: u16 },

    #[error("Marker {code:#04X} reached before any frame header")]
    NoFrameHeader { code: u8 },

    #[error("Frame header for marker {code:#04X} is {len} bytes, need at least 5")]
    ShortFrameHeader { code: u8, len: usize },

    #[error("Stream ended before the scan completed")]
    Truncated,

    #[error("Input budget of {limit} bytes exhausted")]
    LimitExceeded { limit: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ProbeError {
    /// Short, stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::InvalidSignature { .. } => "invalid-signature",
            ProbeError::MalformedMarker { .. } => "malformed-marker",
            ProbeError::InconsistentLength { .. } => "inconsistent-length",
            ProbeError::NoFrameHeader { .. } => "no-frame-header",
            ProbeError::ShortFrameHeader { .. } => "short-frame-header",
            ProbeError::Truncated => "truncated",
            ProbeError::LimitExceeded { .. } => "limit-exceeded",
            ProbeError::Io(_) => "io",
        }
    }
}

/// Errors raised by a byte source while serving a request.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<SourceError> for ProbeError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Disconnected => ProbeError::Truncated,
            SourceError::Io(e) => ProbeError::Io(e),
        }
    }
}
