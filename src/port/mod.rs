// src/port/mod.rs

//! Host-side transports (requires the `std` feature).
//!
//! [`BlockingSerial`] and, with the `tokio` feature, [`CooperativeSerial`]
//! put any [`ByteIo`] byte source behind the crate's interface traits. Two
//! byte sources ship with the crate: an OS serial port opened through
//! `serialport`, and the in-memory [`memory_pipe`] used by tests.

use crate::common::timing;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod blocking;
#[cfg(feature = "tokio")]
mod cooperative;
mod memory;

pub use blocking::BlockingSerial;
#[cfg(feature = "tokio")]
pub use cooperative::CooperativeSerial;
pub use memory::{memory_pipe, MemoryPort, MemoryWriter};

pub use crate::common::timing::DEFAULT_BAUD_RATE;

/// Transport error of the std ports.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The port was closed through its [`CloseHandle`].
    #[error("port closed")]
    Closed,
}

/// Minimal byte source the std ports are built on.
pub trait ByteIo {
    /// Bytes that can be read without blocking.
    fn available(&mut self) -> io::Result<usize>;

    /// Reads up to `buf.len()` bytes. Only called when bytes are available.
    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl ByteIo for Box<dyn serialport::SerialPort> {
    fn available(&mut self) -> io::Result<usize> {
        let waiting = serialport::SerialPort::bytes_to_read(&**self).map_err(io::Error::from)?;
        Ok(waiting as usize)
    }

    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

/// Where and how fast to open an OS serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub path: String,
    pub baud_rate: u32,
}

impl PortSettings {
    pub fn new(path: impl Into<String>) -> Self {
        PortSettings {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn open(&self) -> Result<Box<dyn serialport::SerialPort>, PortError> {
        let port = serialport::new(&self.path, self.baud_rate)
            .timeout(timing::DEFAULT_TIMEOUT)
            .open()?;
        log::debug!("opened {} at {} baud", self.path, self.baud_rate);
        Ok(port)
    }
}

/// Closes a port from outside the session that owns it.
///
/// Cloneable and `Send`, so another thread or task can stop a cycle that is
/// in flight. The cycle fails with [`PortError::Closed`] at its next poll.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle(Arc<AtomicBool>);

impl CloseHandle {
    pub fn close(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Byte-level plumbing shared by both port flavours.
#[derive(Debug)]
pub(crate) struct PortCore<P> {
    port: P,
    closed: CloseHandle,
}

impl<P: ByteIo> PortCore<P> {
    pub(crate) fn new(port: P) -> Self {
        PortCore {
            port,
            closed: CloseHandle::default(),
        }
    }

    pub(crate) fn close_handle(&self) -> CloseHandle {
        self.closed.clone()
    }

    pub(crate) fn port(&self) -> &P {
        &self.port
    }

    pub(crate) fn into_port(self) -> P {
        self.port
    }

    fn check_open(&self) -> Result<(), PortError> {
        if self.closed.is_closed() {
            Err(PortError::Closed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn bytes_available(&mut self) -> Result<usize, PortError> {
        self.check_open()?;
        Ok(self.port.available()?)
    }

    pub(crate) fn read_byte(&mut self) -> nb::Result<u8, PortError> {
        if self.bytes_available()? == 0 {
            return Err(nb::Error::WouldBlock);
        }
        let mut buf = [0u8; 1];
        match self.port.read_some(&mut buf) {
            Ok(1) => Ok(buf[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Err(nb::Error::WouldBlock)
            }
            Err(e) => Err(nb::Error::Other(e.into())),
        }
    }

    pub(crate) fn discard(&mut self, count: usize) -> Result<(), PortError> {
        let mut scratch = [0u8; 64];
        let mut left = count.min(self.bytes_available()?);
        while left > 0 {
            let chunk = left.min(scratch.len());
            let n = self.port.read_some(&mut scratch[..chunk])?;
            if n == 0 {
                break;
            }
            left -= n;
        }
        Ok(())
    }
}
