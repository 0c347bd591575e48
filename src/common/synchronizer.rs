// src/common/synchronizer.rs

use super::config::SessionConfig;
use super::frame::{RawFrame, HEADER_LEN};
use core::mem;

/// Where the synchronizer is inside the current cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SyncState {
    /// Nothing consumed yet.
    Idle,
    /// Scanning for the 2-byte header, possibly with the first byte matched.
    SearchingHeader,
    /// Header matched, collecting the rest of the frame.
    ReadingBody,
}

/// Byte-at-a-time frame synchronizer.
///
/// Fed one byte per call, it slides the search window forward by exactly one
/// byte on every mismatch. A byte that breaks a half-matched header is
/// itself re-examined as a possible header start before being dropped.
///
/// The synchronizer does no I/O and has no notion of time; the session
/// drivers own the deadline and decide when to stop feeding it.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    header: [u8; 2],
    frame_size: usize,
    state: SyncState,
    frame: RawFrame,
    discarded: usize,
}

impl Synchronizer {
    pub fn new(config: &SessionConfig) -> Self {
        Synchronizer {
            header: config.header(),
            frame_size: config.frame_size(),
            state: SyncState::Idle,
            frame: RawFrame::new(),
            discarded: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Noise bytes dropped since construction.
    #[inline]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Bytes consumed towards the frame in progress.
    #[inline]
    pub fn pending(&self) -> usize {
        self.frame.len()
    }

    /// Feeds one byte. Returns the candidate frame once `frame_size` bytes
    /// starting with the header have been collected, and goes back to `Idle`.
    pub fn push(&mut self, byte: u8) -> Option<RawFrame> {
        match self.state {
            SyncState::Idle | SyncState::SearchingHeader => {
                self.state = SyncState::SearchingHeader;
                self.scan(byte);
                None
            }
            SyncState::ReadingBody => {
                self.frame.0.push(byte);
                if self.frame.len() < self.frame_size {
                    return None;
                }
                self.state = SyncState::Idle;
                Some(mem::replace(&mut self.frame, RawFrame::new()))
            }
        }
    }

    fn scan(&mut self, byte: u8) {
        if self.frame.len() == 1 {
            if byte == self.header[1] {
                self.frame.0.push(byte);
                self.state = SyncState::ReadingBody;
                return;
            }
            // The lone first header byte was noise after all.
            self.frame.0.clear();
            self.discarded += 1;
        }

        debug_assert!(self.frame.is_empty());
        if byte == self.header[0] {
            self.frame.0.push(byte);
        } else {
            self.discarded += 1;
        }
    }
}

// Header matching relies on exactly two header bytes.
const _: () = assert!(HEADER_LEN == 2);
