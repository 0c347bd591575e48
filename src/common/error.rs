// src/common/error.rs

/// Crate error type, generic over the transport's own error.
///
/// Protocol outcomes (missing header, checksum mismatch, signal sentinels)
/// are reported as [`Status`](super::Status) values and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum TfmpError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Io error
{
    /// Underlying I/O error from the transport (device removed, read fault, closed).
    #[error("I/O error: {0:?}")] // Format string requires Debug on E
    Io(E),

    /// A frame handed to the standalone decoder was malformed.
    #[error("Invalid frame: {0}")]
    InvalidFrame(InvalidFrame),

    /// Session configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(ConfigError),
}

/// Why a frame from an external source could not be decoded.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InvalidFrame {
    #[error("wrong length: expected {expected} bytes, got {got}")]
    Length { expected: usize, got: usize },

    #[error("wrong header: expected {expected:02x?}, got {got:02x?}")]
    Header { expected: [u8; 2], got: [u8; 2] },

    /// `expected` is the checksum byte carried by the frame.
    #[error("checksum mismatch: expected {expected:#04x}, calculated {calculated:#04x}")]
    Checksum { expected: u8, calculated: u8 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("frame size {got} outside {min}..={max}")]
    FrameSize { got: usize, min: usize, max: usize },

    #[error("timeout must be non-zero")]
    ZeroTimeout,

    #[error("timeout longer than {max:?}")]
    TimeoutTooLong { max: core::time::Duration },
}

impl<E: core::fmt::Debug> From<InvalidFrame> for TfmpError<E> {
    fn from(e: InvalidFrame) -> Self {
        TfmpError::InvalidFrame(e)
    }
}

impl<E: core::fmt::Debug> From<ConfigError> for TfmpError<E> {
    fn from(e: ConfigError) -> Self {
        TfmpError::InvalidConfig(e)
    }
}
