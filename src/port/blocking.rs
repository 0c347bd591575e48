// src/port/blocking.rs

use super::{ByteIo, CloseHandle, PortCore, PortError, PortSettings};
use crate::common::hal_traits::{TfmpClock, TfmpSerial};
use std::thread;
use std::time::{Duration, Instant};

/// OS-thread serial interface: waiting puts the calling thread to sleep.
///
/// Pair with [`SyncSession`](crate::session::SyncSession); one session per
/// thread.
#[derive(Debug)]
pub struct BlockingSerial<P = Box<dyn serialport::SerialPort>> {
    core: PortCore<P>,
}

impl BlockingSerial {
    /// Opens an OS serial port.
    pub fn open(settings: &PortSettings) -> Result<Self, PortError> {
        Ok(Self::new(settings.open()?))
    }
}

impl<P: ByteIo> BlockingSerial<P> {
    pub fn new(port: P) -> Self {
        BlockingSerial { core: PortCore::new(port) }
    }

    /// Handle that closes this port from another thread.
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

impl<P: ByteIo> TfmpSerial for BlockingSerial<P> {
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

impl<P> TfmpClock for BlockingSerial<P> {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<P> embedded_hal::delay::DelayNs for BlockingSerial<P> {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{SessionConfig, Status, TfmpError};
    use crate::port::memory_pipe;
    use crate::session::SyncSession;

    const GOOD: [u8; 9] = [0x59, 0x59, 0x12, 0x03, 0x00, 0x00, 0x00, 0x00, 0xC7];

    #[test]
    fn test_reads_frame_from_pipe() {
        let (writer, port) = memory_pipe();
        writer.send(&[0x00]);
        writer.send(&GOOD);
        let mut session = SyncSession::new(BlockingSerial::new(port));

        assert_eq!(session.update().unwrap(), Status::Ok);
        assert_eq!(session.reading().map(|r| r.distance), Some(786));
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn test_starved_cycle_takes_the_timeout() {
        let (_writer, port) = memory_pipe();
        let mut session = SyncSession::new(BlockingSerial::new(port));

        let start = Instant::now();
        assert_eq!(session.update().unwrap(), Status::HeaderNotFound);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10), "{elapsed:?}");
        // Generous slack for loaded CI machines.
        assert!(elapsed < Duration::from_millis(60), "{elapsed:?}");
    }

    #[test]
    fn test_frame_written_by_another_thread() {
        let (writer, port) = memory_pipe();
        let config = SessionConfig::builder().timeout(Duration::from_millis(200)).build().unwrap();
        let mut session = SyncSession::with_config(BlockingSerial::new(port), config);

        let feeder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            for byte in GOOD {
                writer.send(&[byte]);
                thread::sleep(Duration::from_micros(200));
            }
        });

        let m = session.get_data().unwrap();
        assert_eq!(m.status, Status::Ok);
        feeder.join().unwrap();
    }

    #[test]
    fn test_close_stops_cycle_promptly() {
        let (_writer, port) = memory_pipe();
        let config = SessionConfig::builder().timeout(Duration::from_secs(5)).build().unwrap();
        let serial = BlockingSerial::new(port);
        let handle = serial.close_handle();
        let mut session = SyncSession::with_config(serial, config);

        let closer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.close();
        });

        let start = Instant::now();
        let result = session.update();
        assert!(matches!(result, Err(TfmpError::Io(PortError::Closed))));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(session.status(), Some(Status::TransportError));
        closer.join().unwrap();
    }

    #[test]
    fn test_longest_accepted_timeout_runs_a_cycle() {
        let (writer, port) = memory_pipe();
        writer.send(&GOOD);
        let config = SessionConfig::builder()
            .timeout(crate::common::timing::MAX_TIMEOUT)
            .build()
            .unwrap();
        let mut session = SyncSession::with_config(BlockingSerial::new(port), config);
        assert_eq!(session.get_data().unwrap().status, Status::Ok);
    }

    #[test]
    fn test_disconnect_is_transport_error() {
        let (writer, port) = memory_pipe();
        writer.disconnect();
        let mut session = SyncSession::new(BlockingSerial::new(port));
        assert!(matches!(session.get_data(), Err(TfmpError::Io(PortError::Io(_)))));
    }
}
