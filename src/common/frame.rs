// src/common/frame.rs

use arrayvec::ArrayVec;
use core::ops::Deref;

/// Default 2-byte header marking the start of a TF-Mini Plus data frame.
pub const HEADER: [u8; 2] = [0x59, 0x59];
/// Number of header bytes. The synchronizer always matches exactly two.
pub const HEADER_LEN: usize = 2;
/// Size of a standard data frame: header, three 16-bit fields, checksum.
pub const FRAME_SIZE: usize = 9;
/// Largest frame size a session may be configured for.
pub const MAX_FRAME_SIZE: usize = 32;

// Byte offsets of the little-endian fields inside a frame.
pub(crate) const DISTANCE_OFFSET: usize = 2;
pub(crate) const SIGNAL_OFFSET: usize = 4;
pub(crate) const TEMPERATURE_OFFSET: usize = 6;

/// One candidate frame as pulled off the wire, header included.
///
/// The synchronizer only hands out complete frames, so the length always
/// equals the configured frame size. The checksum has not been checked yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(pub(crate) ArrayVec<u8, MAX_FRAME_SIZE>);

impl RawFrame {
    pub(crate) fn new() -> Self {
        RawFrame(ArrayVec::new())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The trailing checksum byte.
    #[inline]
    pub fn checksum_byte(&self) -> Option<u8> {
        self.0.last().copied()
    }
}

impl Deref for RawFrame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reads a little-endian `u16` starting at `offset`.
#[inline]
pub(crate) fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from(bytes[offset]) | (u16::from(bytes[offset + 1]) << 8)
}
