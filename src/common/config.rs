// src/common/config.rs

use super::error::{ConfigError, TfmpError};
use super::frame::{FRAME_SIZE, HEADER, MAX_FRAME_SIZE};
use super::reading::Sentinels;
use super::timing;
use core::time::Duration;

/// Immutable per-session settings, fixed when the session is created.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    header: [u8; 2],
    frame_size: usize,
    timeout: Duration,
    sentinels: Sentinels,
}

impl SessionConfig {
    /// Smallest frame that still holds the three 16-bit fields and a checksum.
    pub const MIN_FRAME_SIZE: usize = FRAME_SIZE;

    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder { config: SessionConfig::default() }
    }

    #[inline]
    pub const fn header(&self) -> [u8; 2] {
        self.header
    }

    #[inline]
    pub const fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Hard budget for one read cycle.
    #[inline]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[inline]
    pub const fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }
}

impl Default for SessionConfig {
    /// `59 59` header, 9-byte frames, 10 ms timeout, default sentinels.
    fn default() -> Self {
        SessionConfig {
            header: HEADER,
            frame_size: FRAME_SIZE,
            timeout: timing::DEFAULT_TIMEOUT,
            sentinels: Sentinels::default(),
        }
    }
}

/// Builder for [`SessionConfig`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn header(mut self, header: [u8; 2]) -> Self {
        self.config.header = header;
        self
    }

    pub fn frame_size(mut self, frame_size: usize) -> Self {
        self.config.frame_size = frame_size;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn sentinels(mut self, sentinels: Sentinels) -> Self {
        self.config.sentinels = sentinels;
        self
    }

    pub fn build(self) -> Result<SessionConfig, TfmpError> {
        let size = self.config.frame_size;
        if !(SessionConfig::MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&size) {
            return Err(ConfigError::FrameSize {
                got: size,
                min: SessionConfig::MIN_FRAME_SIZE,
                max: MAX_FRAME_SIZE,
            }
            .into());
        }
        if self.config.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout.into());
        }
        if self.config.timeout > timing::MAX_TIMEOUT {
            return Err(ConfigError::TimeoutTooLong { max: timing::MAX_TIMEOUT }.into());
        }
        Ok(self.config)
    }
}
