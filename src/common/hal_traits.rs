// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// Point in time as understood by a [`TfmpClock`].
///
/// `std::time::Instant` satisfies this out of the box; tests use a virtual
/// microsecond counter.
pub trait TfmpInstant: Copy + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration> {}

impl<T> TfmpInstant for T where T: Copy + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration> {}

/// Monotonic time source used for the per-cycle deadline.
///
/// Waiting itself goes through `embedded_hal::delay::DelayNs` (blocking
/// sessions) or `embedded_hal_async::delay::DelayNs` (cooperative sessions).
pub trait TfmpClock {
    type Instant: TfmpInstant;

    fn now(&self) -> Self::Instant;
}

/// Byte source a session reads frames from.
///
/// The same trait backs both the blocking and the cooperative session: reads
/// never block, and waiting for more bytes is the session's job.
pub trait TfmpSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Number of bytes that can be read right now without waiting.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Attempts to read a single byte.
    ///
    /// Returns `Ok(byte)` if a byte was read, or `Err(nb::Error::WouldBlock)`
    /// if no byte is available yet. Other errors are returned as `Err(nb::Error::Other(Self::Error))`.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Drops up to `count` already-buffered bytes, oldest first.
    fn discard(&mut self, count: usize) -> Result<(), Self::Error> {
        for _ in 0..count {
            match self.read_byte() {
                Ok(_) => {}
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Ok(())
    }
}
