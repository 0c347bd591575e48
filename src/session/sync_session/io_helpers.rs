// src/session/sync_session/io_helpers.rs

use super::SyncSession; // Access SyncSession definition
use crate::common::{
    cycle::{CycleStep, ReadCycle},
    error::TfmpError,
    hal_traits::{TfmpClock, TfmpSerial},
    status::Measurement,
};
use embedded_hal::delay::DelayNs;

// Implementation block for the blocking read cycle
impl<IF> SyncSession<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    /// Runs one complete cycle against the transport, blocking the calling
    /// thread for at most the configured timeout plus one poll tick.
    pub(super) fn read_cycle(&mut self) -> Result<Measurement, TfmpError<IF::Error>> {
        let mut cycle = ReadCycle::start(&self.config, self.interface.now());
        cycle.trim_backlog(&mut self.interface).map_err(TfmpError::Io)?;

        loop {
            match cycle.step(&mut self.interface).map_err(TfmpError::Io)? {
                CycleStep::Done(measurement) => return Ok(measurement),
                CycleStep::Continue => {}
                CycleStep::Idle(us) => self.interface.delay_us(us),
            }
        }
    }
}
