// src/common/timing.rs

use core::time::Duration;

/// Default hard budget for a single read cycle.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10);

/// Upper bound accepted for a cycle timeout. Keeps `now + timeout` clear of
/// instant overflow on every clock.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Longest wait between two polls of the transport when no byte is buffered.
/// Blocking sessions sleep for this long, cooperative sessions suspend.
pub const POLL_QUANTUM: Duration = Duration::from_millis(1);

/// Baud rate the sensor links are run at unless configured otherwise.
/// The sensor ships at 115200; the reader deployments use 9600.
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

// === Byte Timing (8N1) ===
// 1 start bit + 8 data bits + 1 stop bit = 10 bits per byte.
// At 9600 baud a byte takes ~1.04 ms and a 9-byte frame ~9.4 ms, just inside
// the default budget. At 115200 a frame takes ~0.78 ms.

/// Nominal duration of one byte on the wire at `baud_rate`. A zero baud
/// rate never completes a byte and yields `Duration::MAX`.
pub const fn byte_duration(baud_rate: u32) -> Duration {
    match (10 * 1_000_000_000u64).checked_div(baud_rate as u64) {
        Some(ns) => Duration::from_nanos(ns),
        None => Duration::MAX,
    }
}

/// How long to wait before polling again, given the time left until the
/// deadline. Never more than [`POLL_QUANTUM`], never zero, so a virtual
/// clock driven by the delay always makes progress.
#[inline]
pub fn poll_wait_us(remaining: Duration) -> u32 {
    let quantum = POLL_QUANTUM.as_micros() as u32;
    let remaining_us = remaining.as_micros().min(u128::from(quantum)) as u32;
    remaining_us.max(1)
}
