// src/port/memory.rs

use super::ByteIo;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Shared {
    buffer: Mutex<VecDeque<u8>>,
    disconnected: AtomicBool,
}

impl Shared {
    fn buffer(&self) -> MutexGuard<'_, VecDeque<u8>> {
        // A panicking writer cannot leave the queue half-updated.
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_connected(&self) -> io::Result<()> {
        if self.disconnected.load(Ordering::Acquire) {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected"))
        } else {
            Ok(())
        }
    }
}

/// Creates an in-memory byte pipe: whatever the writer sends, the port reads.
///
/// Stands in for a virtual serial port pair when exercising sessions
/// against real time.
pub fn memory_pipe() -> (MemoryWriter, MemoryPort) {
    let shared = Arc::new(Shared::default());
    (MemoryWriter(shared.clone()), MemoryPort(shared))
}

/// Sending end of a [`memory_pipe`]. Cloneable and `Send`.
#[derive(Debug, Clone)]
pub struct MemoryWriter(Arc<Shared>);

impl MemoryWriter {
    pub fn send(&self, bytes: &[u8]) {
        self.0.buffer().extend(bytes.iter().copied());
    }

    /// Simulates unplugging the device: every further read on the port fails.
    pub fn disconnect(&self) {
        self.0.disconnected.store(true, Ordering::Release);
    }

    /// Bytes sent but not yet read.
    pub fn pending(&self) -> usize {
        self.0.buffer().len()
    }
}

impl io::Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.check_connected()?;
        self.send(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Receiving end of a [`memory_pipe`].
#[derive(Debug)]
pub struct MemoryPort(Arc<Shared>);

impl ByteIo for MemoryPort {
    fn available(&mut self) -> io::Result<usize> {
        self.0.check_connected()?;
        Ok(self.0.buffer().len())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.check_connected()?;
        let mut queue = self.0.buffer();
        let n = buf.len().min(queue.len());
        for (slot, byte) in buf.iter_mut().zip(queue.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
