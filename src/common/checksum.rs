// src/common/checksum.rs

/// Modulo-256 sum of `data`.
///
/// This is the TF-Mini Plus frame checksum: the low byte of the sum of every
/// byte that precedes the checksum byte, header included.
#[inline]
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Verifies a complete frame whose last byte is the checksum.
///
/// Pure and side-effect free. Header bytes are not inspected here; the
/// synchronizer (or the standalone decoder) has already checked them.
///
/// # Returns
///
/// * `false` if the frame is empty or the sums differ.
pub fn verify_checksum(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((received, body)) => checksum(body) == *received,
        None => false,
    }
}
