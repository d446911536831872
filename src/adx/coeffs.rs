//! Predictor coefficient derivation and sample clamping
//!
//! ADX does not store its filter taps. Both coefficients are derived once
//! per file from the header's highpass cutoff frequency and sample rate,
//! then stay constant for the whole decode.

use std::f64::consts::{PI, SQRT_2};

/// Derive the two signed fixed-point predictor coefficients.
///
/// The math follows the reference encoder exactly, including the final
/// `floor` toward negative infinity (not truncation toward zero):
///
/// ```text
/// z     = cos(2*pi*cutoff / sample_rate)
/// a     = sqrt(2) - z
/// b     = sqrt(2) - 1
/// c     = (a - sqrt((a + b) * (a - b))) / b
/// coef1 = floor(c * 8192)
/// coef2 = floor(c * c * -4096)
/// ```
///
/// A zero `sample_rate` is a domain error the header validation upstream
/// must prevent.
pub fn predictor_coefficients(cutoff_hz: u16, sample_rate: u32) -> (i32, i32) {
    let z = (2.0 * PI * f64::from(cutoff_hz) / f64::from(sample_rate)).cos();
    let a = SQRT_2 - z;
    let b = SQRT_2 - 1.0;
    let c = (a - ((a + b) * (a - b)).sqrt()) / b;

    let coef1 = (c * 8192.0).floor() as i32;
    let coef2 = (c * c * -4096.0).floor() as i32;
    (coef1, coef2)
}

/// Saturate a predicted sample to the asymmetric range [-32767, 32767].
///
/// -32768 is representable in i16 but never produced; the reference format
/// clamps symmetrically around zero and that quirk is preserved here.
pub fn clamp16(value: i32) -> i16 {
    value.clamp(-32767, 32767) as i16
}
