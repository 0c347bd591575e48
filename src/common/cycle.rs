// src/common/cycle.rs

use super::checksum::verify_checksum;
use super::config::SessionConfig;
use super::frame::RawFrame;
use super::hal_traits::{TfmpClock, TfmpInstant, TfmpSerial};
use super::reading::decode_validated;
use super::status::{Measurement, Status};
use super::synchronizer::Synchronizer;
use super::timing;

/// What a driver does after one [`ReadCycle::step`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CycleStep {
    /// The cycle is over.
    Done(Measurement),
    /// A byte was consumed; step again right away.
    Continue,
    /// Nothing buffered; wait this many microseconds, then step again.
    Idle(u32),
}

/// One synchronize-validate-decode attempt bounded by a single deadline.
///
/// Holds every decision of the read cycle so that the blocking and the
/// cooperative session only differ in how they wait. A driver calls
/// [`trim_backlog`](Self::trim_backlog) once, then [`step`](Self::step)
/// until it yields [`CycleStep::Done`], sleeping or suspending on
/// [`CycleStep::Idle`].
#[derive(Debug, Clone)]
pub struct ReadCycle<'c, I: TfmpInstant> {
    config: &'c SessionConfig,
    deadline: I,
    sync: Synchronizer,
}

impl<'c, I: TfmpInstant> ReadCycle<'c, I> {
    pub fn start(config: &'c SessionConfig, now: I) -> Self {
        ReadCycle {
            config,
            deadline: now + config.timeout(),
            sync: Synchronizer::new(config),
        }
    }

    #[inline]
    pub fn deadline(&self) -> I {
        self.deadline
    }

    #[inline]
    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    /// Bytes to drop before searching so that at most one frame of backlog
    /// is left in the transport buffer.
    #[inline]
    pub fn backlog_to_discard(&self, available: usize) -> usize {
        available.saturating_sub(self.config.frame_size())
    }

    /// `true` once `now` is past the deadline. A cycle may still read at the
    /// deadline instant itself.
    #[inline]
    pub fn expired(&self, now: I) -> bool {
        now > self.deadline
    }

    /// Drops stale bytes so that at most one frame of backlog is searched.
    pub fn trim_backlog<S: TfmpSerial>(&self, serial: &mut S) -> Result<(), S::Error> {
        let available = serial.bytes_available()?;
        let stale = self.backlog_to_discard(available);
        if stale > 0 {
            log::trace!("discarding {} stale bytes of {} buffered", stale, available);
            serial.discard(stale)?;
        }
        Ok(())
    }

    /// Checks the deadline, then tries to read and feed one byte.
    pub fn step<S>(&mut self, serial: &mut S) -> Result<CycleStep, S::Error>
    where
        S: TfmpSerial + TfmpClock<Instant = I>,
    {
        let now = serial.now();
        if self.expired(now) {
            return Ok(CycleStep::Done(self.expire()));
        }

        match serial.read_byte() {
            Ok(byte) => Ok(self.push(byte).map_or(CycleStep::Continue, CycleStep::Done)),
            Err(nb::Error::WouldBlock) => Ok(CycleStep::Idle(self.idle_wait_us(now))),
            Err(nb::Error::Other(e)) => {
                log::warn!("transport failed mid-cycle: {:?}", e);
                Err(e)
            }
        }
    }

    /// Microseconds to wait when the transport is empty.
    #[inline]
    pub fn idle_wait_us(&self, now: I) -> u32 {
        timing::poll_wait_us(self.deadline - now)
    }

    /// Feeds one byte. Returns the cycle's terminal outcome once a full
    /// frame has been collected.
    pub fn push(&mut self, byte: u8) -> Option<Measurement> {
        self.sync.push(byte).map(|frame| self.evaluate(&frame))
    }

    /// Terminal outcome when the deadline passed without a full frame.
    pub fn expire(&self) -> Measurement {
        log::debug!(
            "no frame before deadline ({} bytes discarded, {} pending)",
            self.sync.discarded(),
            self.sync.pending()
        );
        Measurement::failed(Status::HeaderNotFound)
    }

    fn evaluate(&self, frame: &RawFrame) -> Measurement {
        if self.sync.discarded() > 0 {
            log::trace!("resynchronized after {} noise bytes", self.sync.discarded());
        }
        if !verify_checksum(frame) {
            log::debug!("checksum mismatch in frame {:02x?}", frame.as_bytes());
            return Measurement::failed(Status::ChecksumError);
        }
        decode_validated(frame, self.config.sentinels())
    }
}
