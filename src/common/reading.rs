// src/common/reading.rs

use super::checksum::{checksum, verify_checksum};
use super::config::SessionConfig;
use super::error::{InvalidFrame, TfmpError};
use super::frame::{le_u16, DISTANCE_OFFSET, FRAME_SIZE, HEADER_LEN, SIGNAL_OFFSET, TEMPERATURE_OFFSET};
use super::status::{Measurement, Status};

/// One decoded measurement. Created fresh for every decoded frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Reading {
    /// Distance in the sensor's configured unit (centimetres by default).
    pub distance: u16,
    /// Return signal strength.
    pub signal_intensity: u16,
    /// Chip temperature in degrees Celsius.
    pub temperature: i16,
}

impl Reading {
    /// Maps the fixed field offsets of a frame to typed values.
    ///
    /// Only the length is checked; header and checksum are not. Use
    /// [`decode_frame`] for frames that still need validating.
    pub fn from_frame(frame: &[u8]) -> Result<Self, InvalidFrame> {
        if frame.len() < FRAME_SIZE {
            return Err(InvalidFrame::Length { expected: FRAME_SIZE, got: frame.len() });
        }
        Ok(Self::from_fields(frame))
    }

    // `frame` holds at least FRAME_SIZE bytes.
    fn from_fields(frame: &[u8]) -> Self {
        let temperature_raw = le_u16(frame, TEMPERATURE_OFFSET);
        Reading {
            distance: le_u16(frame, DISTANCE_OFFSET),
            signal_intensity: le_u16(frame, SIGNAL_OFFSET),
            // (raw >> 3) is at most 8191, so the result always fits.
            temperature: (temperature_raw >> 3) as i16 - 256,
        }
    }
}

/// Reserved field values the sensor uses to flag abnormal conditions.
///
/// The sensor documents these as -1 and -4. Because the fields travel as
/// unsigned 16-bit values they arrive as their two's complement, so the
/// defaults are `0xFFFF` and `0xFFFC`. `None` disables a check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Sentinels {
    /// `distance` value meaning the return signal is too weak.
    pub weak_distance: Option<u16>,
    /// `signal_intensity` value meaning the return signal saturated.
    pub strong_signal: Option<u16>,
    /// `distance` value meaning ambient light saturated the receiver.
    pub flood_distance: Option<u16>,
}

impl Sentinels {
    pub const WEAK_DISTANCE: u16 = (-1i16) as u16;
    pub const STRONG_SIGNAL: u16 = (-1i16) as u16;
    pub const FLOOD_DISTANCE: u16 = (-4i16) as u16;

    /// No sentinel checks at all, every decoded frame is `Ok`.
    pub const NONE: Sentinels = Sentinels {
        weak_distance: None,
        strong_signal: None,
        flood_distance: None,
    };

    /// Classifies a reading. Checked in order weak, strong, flood; first match wins.
    pub fn classify(&self, reading: &Reading) -> Status {
        if self.weak_distance == Some(reading.distance) {
            Status::SignalWeak
        } else if self.strong_signal == Some(reading.signal_intensity) {
            Status::SignalStrong
        } else if self.flood_distance == Some(reading.distance) {
            Status::SignalFlood
        } else {
            Status::Ok
        }
    }
}

impl Default for Sentinels {
    fn default() -> Self {
        Sentinels {
            weak_distance: Some(Self::WEAK_DISTANCE),
            strong_signal: Some(Self::STRONG_SIGNAL),
            flood_distance: Some(Self::FLOOD_DISTANCE),
        }
    }
}

/// Decodes a frame whose length, header and checksum are already known to
/// be good.
pub(crate) fn decode_validated(frame: &[u8], sentinels: &Sentinels) -> Measurement {
    let reading = Reading::from_fields(frame);
    Measurement::decoded(reading, sentinels.classify(&reading))
}

/// Decodes a standard 9-byte frame received from somewhere other than a
/// live session, e.g. a log file or a test vector.
///
/// # Returns
///
/// * `Ok(Measurement)` with `Ok` or one of the signal statuses.
/// * `Err(TfmpError::InvalidFrame)` on wrong length, header or checksum.
pub fn decode_frame(bytes: &[u8]) -> Result<Measurement, TfmpError> {
    decode_frame_with(bytes, &SessionConfig::default())
}

/// Like [`decode_frame`] but checks against a custom header, frame size and
/// sentinel table.
pub fn decode_frame_with(bytes: &[u8], config: &SessionConfig) -> Result<Measurement, TfmpError> {
    let expected = config.frame_size();
    if bytes.len() != expected {
        return Err(InvalidFrame::Length { expected, got: bytes.len() }.into());
    }

    let header = config.header();
    if bytes[..HEADER_LEN] != header {
        return Err(InvalidFrame::Header { expected: header, got: [bytes[0], bytes[1]] }.into());
    }

    if !verify_checksum(bytes) {
        return Err(InvalidFrame::Checksum {
            expected: bytes[expected - 1],
            calculated: checksum(&bytes[..expected - 1]),
        }
        .into());
    }

    Ok(decode_validated(bytes, config.sentinels()))
}
