// src/port/cooperative.rs

use super::{ByteIo, CloseHandle, PortCore, PortError, PortSettings};
use crate::common::hal_traits::{TfmpClock, TfmpSerial};
use std::time::Duration;
use tokio::time::Instant;

/// Task-friendly serial interface: waiting suspends the task on a tokio
/// timer, leaving the thread free for other sessions.
///
/// Pair with [`AsyncSession`](crate::session::AsyncSession). Needs a tokio
/// runtime with the time driver enabled.
#[derive(Debug)]
pub struct CooperativeSerial<P = Box<dyn serialport::SerialPort>> {
    core: PortCore<P>,
}

impl CooperativeSerial {
    /// Opens an OS serial port.
    pub fn open(settings: &PortSettings) -> Result<Self, PortError> {
        Ok(Self::new(settings.open()?))
    }
}

impl<P: ByteIo> CooperativeSerial<P> {
    pub fn new(port: P) -> Self {
        CooperativeSerial { core: PortCore::new(port) }
    }

    /// Handle that closes this port from another task or thread.
    pub fn close_handle(&self) -> CloseHandle {
        self.core.close_handle()
    }

    pub fn get_ref(&self) -> &P {
        self.core.port()
    }

    pub fn into_inner(self) -> P {
        self.core.into_port()
    }
}

impl<P: ByteIo> TfmpSerial for CooperativeSerial<P> {
    type Error = PortError;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.core.bytes_available()
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.core.read_byte()
    }

    fn discard(&mut self, count: usize) -> Result<(), Self::Error> {
        self.core.discard(count)
    }
}

// tokio's clock, so paused-time tests see the same time the timers do.
impl<P> TfmpClock for CooperativeSerial<P> {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<P> embedded_hal_async::delay::DelayNs for CooperativeSerial<P> {
    async fn delay_ns(&mut self, ns: u32) {
        tokio::time::sleep(Duration::from_nanos(u64::from(ns))).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{SessionConfig, Status, TfmpError};
    use crate::port::memory_pipe;
    use crate::session::AsyncSession;

    const GOOD: [u8; 9] = [0x59, 0x59, 0x12, 0x03, 0x00, 0x00, 0x00, 0x00, 0xC7];

    #[tokio::test]
    async fn test_reads_frame_from_pipe() {
        let (writer, port) = memory_pipe();
        writer.send(&[0x59, 0x00]);
        writer.send(&GOOD);
        let mut session = AsyncSession::new(CooperativeSerial::new(port));

        assert_eq!(session.update().await.unwrap(), Status::Ok);
        assert_eq!(session.reading().map(|r| r.distance), Some(786));
    }

    #[tokio::test]
    async fn test_starved_cycle_takes_the_timeout() {
        let (_writer, port) = memory_pipe();
        let mut session = AsyncSession::new(CooperativeSerial::new(port));

        let start = std::time::Instant::now();
        assert_eq!(session.update().await.unwrap(), Status::HeaderNotFound);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(60), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_sessions_share_one_thread() {
        let (writer_a, port_a) = memory_pipe();
        let (writer_b, port_b) = memory_pipe();
        let config = SessionConfig::builder().timeout(Duration::from_millis(100)).build().unwrap();
        let mut a = AsyncSession::with_config(CooperativeSerial::new(port_a), config);
        let mut b = AsyncSession::with_config(CooperativeSerial::new(port_b), config);

        let feed = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            writer_b.send(&GOOD);
            tokio::time::sleep(Duration::from_millis(5)).await;
            writer_a.send(&GOOD);
        };

        let (ra, rb, ()) = tokio::join!(a.get_data(), b.get_data(), feed);
        assert_eq!(ra.unwrap().status, Status::Ok);
        assert_eq!(rb.unwrap().status, Status::Ok);
    }

    #[tokio::test]
    async fn test_close_stops_cycle_promptly() {
        let (_writer, port) = memory_pipe();
        let config = SessionConfig::builder().timeout(Duration::from_secs(5)).build().unwrap();
        let serial = CooperativeSerial::new(port);
        let handle = serial.close_handle();
        let mut session = AsyncSession::with_config(serial, config);

        let close = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.close();
        };

        let start = std::time::Instant::now();
        let (result, ()) = tokio::join!(session.update(), close);
        assert!(matches!(result, Err(TfmpError::Io(PortError::Closed))));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(session.status(), Some(Status::TransportError));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_follows_tokio_clock() {
        let (_writer, port) = memory_pipe();
        let mut session = AsyncSession::new(CooperativeSerial::new(port));

        let start = Instant::now();
        assert_eq!(session.get_data().await.unwrap(), crate::common::Measurement::failed(Status::HeaderNotFound));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10));
        assert!(elapsed <= Duration::from_millis(12));
    }
}
