// src/session/mock.rs

// Virtual-time interface shared by the read-cycle and session tests.

use crate::common::hal_traits::{TfmpClock, TfmpSerial};
use core::time::Duration;
use std::collections::VecDeque;

pub(crate) const GOOD: [u8; 9] = [0x59, 0x59, 0x12, 0x03, 0x00, 0x00, 0x00, 0x00, 0xC7];

/// Builds a checksummed default-header frame for the given distance.
pub(crate) fn frame_with_distance(distance: u16) -> [u8; 9] {
    let [lo, hi] = distance.to_le_bytes();
    let mut frame = [0x59, 0x59, lo, hi, 0x00, 0x00, 0x00, 0x00, 0x00];
    frame[8] = crate::common::checksum(&frame[..8]);
    frame
}

// --- Mock Instant (nanoseconds) ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(pub u64);
impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_nanos() as u64))
    }
}
impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Comm Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockCommError;

// --- Mock Interface ---
#[derive(Debug, Clone, Default)]
pub(crate) struct MockInterface {
    pub now_ns: u64,
    /// Bytes with the virtual time (ns) at which they arrive.
    pub queue: VecDeque<(u64, u8)>,
    /// Once the queue is empty, keep producing this byte forever.
    pub endless_noise: Option<u8>,
    /// Virtual time each successful read takes.
    pub read_cost_ns: u64,
    /// Reads and availability checks fail from this time on.
    pub fail_at_ns: Option<u64>,
    pub reads: usize,
    pub discarded: usize,
    pub delays: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes available immediately.
    pub fn stage(&mut self, data: &[u8]) {
        let now = self.now_ns;
        self.stage_at_us(now / 1_000, data);
    }

    /// Bytes that arrive at `at_us` on the virtual clock.
    pub fn stage_at_us(&mut self, at_us: u64, data: &[u8]) {
        for byte in data {
            self.queue.push_back((at_us * 1_000, *byte));
        }
    }

    pub fn remaining(&self) -> Vec<u8> {
        self.queue.iter().map(|(_, b)| *b).collect()
    }

    pub fn elapsed(&self, since: MockInstant) -> Duration {
        MockInstant(self.now_ns) - since
    }

    fn failed(&self) -> bool {
        matches!(self.fail_at_ns, Some(t) if self.now_ns >= t)
    }

    fn front_ready(&self) -> bool {
        matches!(self.queue.front(), Some((t, _)) if *t <= self.now_ns)
    }

    fn advance(&mut self, ns: u64) {
        self.now_ns = self.now_ns.saturating_add(ns);
    }
}

impl TfmpClock for MockInterface {
    type Instant = MockInstant;
    fn now(&self) -> Self::Instant {
        MockInstant(self.now_ns)
    }
}

impl TfmpSerial for MockInterface {
    type Error = MockCommError;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if self.failed() {
            return Err(MockCommError);
        }
        let now = self.now_ns;
        let ready = self.queue.iter().take_while(|(t, _)| *t <= now).count();
        Ok(ready)
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if self.failed() {
            return Err(nb::Error::Other(MockCommError));
        }
        let byte = if self.front_ready() {
            self.queue.pop_front().map(|(_, b)| b)
        } else if self.queue.is_empty() {
            self.endless_noise
        } else {
            None
        };
        match byte {
            Some(b) => {
                self.reads += 1;
                self.advance(self.read_cost_ns);
                Ok(b)
            }
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn discard(&mut self, count: usize) -> Result<(), Self::Error> {
        for _ in 0..count {
            if !self.front_ready() {
                break;
            }
            self.queue.pop_front();
            self.discarded += 1;
        }
        Ok(())
    }
}

impl embedded_hal::delay::DelayNs for MockInterface {
    fn delay_ns(&mut self, ns: u32) {
        self.delays += 1;
        self.advance(u64::from(ns));
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for MockInterface {
    async fn delay_ns(&mut self, ns: u32) {
        self.delays += 1;
        self.advance(u64::from(ns));
    }
}
