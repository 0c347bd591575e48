// src/session/sync_session/mod.rs

use crate::common::{
    config::SessionConfig,
    error::TfmpError,
    hal_traits::{TfmpClock, TfmpSerial},
    reading::Reading,
    status::{Measurement, Status},
};
use embedded_hal::delay::DelayNs;

mod io_helpers;

/// A sensor connection read with blocking waits.
///
/// Owns its interface exclusively. Each call to [`update`](Self::update) or
/// [`get_data`](Self::get_data) runs one cycle that re-synchronizes from
/// scratch; nothing but the cached result survives between cycles.
#[derive(Debug)]
pub struct SyncSession<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    interface: IF,
    config: SessionConfig,
    last: Option<Measurement>,
}

impl<IF> SyncSession<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    /// Session with the default `59 59` header, 9-byte frames and 10 ms timeout.
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, SessionConfig::default())
    }

    pub fn with_config(interface: IF, config: SessionConfig) -> Self {
        SyncSession {
            interface,
            config,
            last: None,
        }
    }

    // --- Public Blocking Methods ---

    /// Runs one cycle and overwrites the cached result with it.
    ///
    /// Protocol outcomes come back as `Ok(status)`. A transport failure is
    /// returned as `Err(TfmpError::Io)` and cached as
    /// [`Status::TransportError`].
    pub fn update(&mut self) -> Result<Status, TfmpError<IF::Error>> {
        match self.read_cycle() {
            Ok(measurement) => {
                self.last = Some(measurement);
                Ok(measurement.status)
            }
            Err(e) => {
                self.last = Some(Measurement::failed(Status::TransportError));
                Err(e)
            }
        }
    }

    /// Runs one cycle and returns its result without touching the cache.
    pub fn get_data(&mut self) -> Result<Measurement, TfmpError<IF::Error>> {
        self.read_cycle()
    }

    /// Result of the last [`update`](Self::update), `None` before the first.
    #[inline]
    pub fn last(&self) -> Option<Measurement> {
        self.last
    }

    #[inline]
    pub fn status(&self) -> Option<Status> {
        self.last.map(|m| m.status)
    }

    #[inline]
    pub fn reading(&self) -> Option<Reading> {
        self.last.and_then(|m| m.reading)
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Tears the session down and hands the interface back.
    pub fn into_inner(self) -> IF {
        self.interface
    }
}
