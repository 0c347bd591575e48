// src/session/async_session.rs

use crate::common::{
    config::SessionConfig,
    cycle::{CycleStep, ReadCycle},
    error::TfmpError,
    hal_traits::{TfmpClock, TfmpSerial},
    reading::Reading,
    status::{Measurement, Status},
};
use embedded_hal_async::delay::DelayNs;

/// A sensor connection read from a cooperative task.
///
/// Same cycle as [`SyncSession`](super::SyncSession); the only difference is
/// that waiting for bytes suspends the task through the interface's async
/// delay instead of putting the thread to sleep.
#[derive(Debug)]
pub struct AsyncSession<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    interface: IF,
    config: SessionConfig,
    last: Option<Measurement>,
}

impl<IF> AsyncSession<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    pub fn new(interface: IF) -> Self {
        Self::with_config(interface, SessionConfig::default())
    }

    pub fn with_config(interface: IF, config: SessionConfig) -> Self {
        AsyncSession {
            interface,
            config,
            last: None,
        }
    }

    /// Runs one cycle and overwrites the cached result with it.
    pub async fn update(&mut self) -> Result<Status, TfmpError<IF::Error>> {
        match self.read_cycle().await {
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
    pub async fn get_data(&mut self) -> Result<Measurement, TfmpError<IF::Error>> {
        self.read_cycle().await
    }

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

    pub fn into_inner(self) -> IF {
        self.interface
    }

    async fn read_cycle(&mut self) -> Result<Measurement, TfmpError<IF::Error>> {
        let mut cycle = ReadCycle::start(&self.config, self.interface.now());
        cycle.trim_backlog(&mut self.interface).map_err(TfmpError::Io)?;

        loop {
            match cycle.step(&mut self.interface).map_err(TfmpError::Io)? {
                CycleStep::Done(measurement) => return Ok(measurement),
                CycleStep::Continue => {}
                CycleStep::Idle(us) => self.interface.delay_us(us).await,
            }
        }
    }
}
