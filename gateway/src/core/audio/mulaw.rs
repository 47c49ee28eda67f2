//! G.711 μ-law decoding.
//!
//! Telephony media streams carry 8-bit μ-law samples at 8kHz. When the AI
//! peer is configured for linear input, every byte is expanded to a 16-bit
//! signed sample and packed little-endian, repeated to reach the AI peer's
//! higher input rate.

/// Bias added to the quantized magnitude before the exponent shift.
const MULAW_BIAS: i32 = 0x84;

/// Decode a single μ-law byte into a 16-bit linear sample.
#[inline]
pub fn decode_sample(byte: u8) -> i16 {
    let inverted = !byte;
    let sign = inverted & 0x80;
    let exponent = ((inverted >> 4) & 0x07) as i32;
    let mantissa = (inverted & 0x0F) as i32;

    let magnitude = (((mantissa << 3) + MULAW_BIAS) << exponent) - MULAW_BIAS;
    let sample = if sign != 0 { -magnitude } else { magnitude };

    sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Decode a μ-law frame straight into PCM 16-bit little-endian bytes,
/// writing each sample `repeat` times.
pub fn decode_to_pcm16le(frame: &[u8], repeat: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.len() * 2 * repeat);
    for &byte in frame {
        let sample = decode_sample(byte).to_le_bytes();
        for _ in 0..repeat {
            out.extend_from_slice(&sample);
        }
    }
    out
}
