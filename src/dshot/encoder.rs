//! # DShot Packet Encoder
//!
//! Pure, stateless conversion from (payload, telemetry) pairs into 16-bit
//! DShot frames and per-bit pulse timings. No I/O happens here.

use super::protocol::*;

/// Calculate the 4-bit DShot checksum
///
/// XOR-folds the 12-bit `(payload << 1) | telemetry` value in three 4-bit
/// nibbles. Total over all 12-bit inputs.
///
/// # Arguments
///
/// * `data` - The 12-bit payload+telemetry value
///
/// # Returns
///
/// * `u8` - The 4-bit checksum
pub fn compute_checksum(data: u16) -> u8 {
    let mut csum = 0u16;
    let mut data = data;

    for _ in 0..3 {
        csum ^= data;
        data >>= 4;
    }

    (csum & 0x0F) as u8
}

/// Encode a payload and telemetry flag into a 16-bit DShot frame
///
/// Frame layout: bits [15:5] payload, bit [4] telemetry, bits [3:0]
/// checksum. Deterministic: identical inputs always produce the identical
/// frame.
///
/// # Arguments
///
/// * `payload` - 11-bit throttle or command value (masked to 0-2047)
/// * `telemetry` - Telemetry request bit
///
/// # Examples
///
/// ```
/// use dshot_link::dshot::encoder::encode_frame;
///
/// let frame = encode_frame(48, false);
/// assert_eq!(frame >> 5, 48);
/// ```
pub fn encode_frame(payload: u16, telemetry: bool) -> u16 {
    let mut data = (payload & PAYLOAD_MASK) << 1;
    if telemetry {
        data |= 1;
    }

    (data << 4) | u16::from(compute_checksum(data))
}

/// Decode a 16-bit frame back into its payload and telemetry flag
///
/// Returns `None` when the embedded checksum does not match the recomputed
/// one, which is how a conforming receiver rejects corrupted frames.
pub fn decode_frame(frame: u16) -> Option<(u16, bool)> {
    let data = frame >> 4;

    if compute_checksum(data) != (frame & 0x0F) as u8 {
        return None;
    }

    Some((data >> 1, data & 1 == 1))
}

/// Expand a 16-bit frame into its physical pulse train
///
/// Emits one symbol per frame bit, most-significant bit first, followed by
/// the inter-frame pause symbol. Total over all 16-bit inputs.
///
/// # Returns
///
/// * `PulseTrain` - Exactly 17 symbols (16 bits + pause)
pub fn to_pulse_train(frame: u16) -> PulseTrain {
    let mut train = [PulseSymbol::PAUSE; PULSE_TRAIN_LEN];

    for (i, symbol) in train.iter_mut().take(FRAME_BITS).enumerate() {
        *symbol = if frame & (0x8000 >> i) != 0 {
            PulseSymbol::ONE
        } else {
            PulseSymbol::ZERO
        };
    }

    train
}
