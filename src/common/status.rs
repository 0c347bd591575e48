// src/common/status.rs

use super::reading::Reading;
use core::fmt;

/// Outcome of one read cycle.
///
/// Everything except `TransportError` is a normal steady-state result on a
/// noisy link and is recovered from by simply running the next cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    /// Frame found, checksum valid, fields within normal range.
    Ok,
    /// Deadline elapsed before a complete frame with a valid header arrived.
    HeaderNotFound,
    /// Header found but the checksum byte does not match.
    ChecksumError,
    /// Sensor reports a signal too weak to range (distance sentinel).
    SignalWeak,
    /// Sensor reports a saturated return signal (signal sentinel).
    SignalStrong,
    /// Sensor reports ambient light saturation (distance sentinel).
    SignalFlood,
    /// The transport failed or was closed during the cycle.
    TransportError,
}

impl Status {
    /// `true` for statuses that come with decoded fields.
    #[inline]
    pub const fn has_reading(&self) -> bool {
        matches!(
            self,
            Status::Ok | Status::SignalWeak | Status::SignalStrong | Status::SignalFlood
        )
    }

    /// `HeaderNotFound` and `ChecksumError`.
    #[inline]
    pub const fn is_protocol_error(&self) -> bool {
        matches!(self, Status::HeaderNotFound | Status::ChecksumError)
    }

    #[inline]
    pub const fn is_signal_condition(&self) -> bool {
        matches!(self, Status::SignalWeak | Status::SignalStrong | Status::SignalFlood)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Status::*;
        match self {
            Ok => write!(f, "ok"),
            HeaderNotFound => write!(f, "no header found before deadline"),
            ChecksumError => write!(f, "checksum mismatch"),
            SignalWeak => write!(f, "signal too weak"),
            SignalStrong => write!(f, "signal saturated"),
            SignalFlood => write!(f, "ambient light saturated"),
            TransportError => write!(f, "transport error"),
        }
    }
}

/// The `(Reading, Status)` pair produced by every cycle.
///
/// `reading` is `Some` exactly when [`Status::has_reading`] holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Measurement {
    pub status: Status,
    pub reading: Option<Reading>,
}

impl Measurement {
    /// Decoded fields together with the status the sentinel check produced.
    pub(crate) const fn decoded(reading: Reading, status: Status) -> Self {
        Measurement { status, reading: Some(reading) }
    }

    /// An outcome that carries no fields.
    pub const fn failed(status: Status) -> Self {
        Measurement { status, reading: None }
    }

    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok)
    }

    #[inline]
    pub fn distance(&self) -> Option<u16> {
        self.reading.map(|r| r.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    #[test]
    fn test_status_classes() {
        assert!(Status::Ok.has_reading());
        assert!(Status::SignalFlood.has_reading());
        assert!(!Status::ChecksumError.has_reading());
        assert!(!Status::TransportError.has_reading());

        assert!(Status::HeaderNotFound.is_protocol_error());
        assert!(Status::ChecksumError.is_protocol_error());
        assert!(!Status::TransportError.is_protocol_error());
        assert!(!Status::SignalWeak.is_protocol_error());

        assert!(Status::SignalStrong.is_signal_condition());
        assert!(!Status::Ok.is_signal_condition());
    }

    #[test]
    fn test_failed_measurement_has_no_reading() {
        let m = Measurement::failed(Status::HeaderNotFound);
        assert!(!m.is_ok());
        assert_eq!(m.reading, None);
        assert_eq!(m.distance(), None);
    }

    #[test]
    fn test_status_display() {
        let mut s: String<48> = String::new();
        write!(s, "{}", Status::HeaderNotFound).unwrap();
        assert_eq!(s.as_str(), "no header found before deadline");
    }
}
