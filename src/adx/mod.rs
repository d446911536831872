//! CRI ADX Format Domain
//!
//! Header validation, predictor coefficient derivation, ADPCM frame
//! reconstruction, and the stateful decode loop with loop-point handling.

pub mod coeffs;
pub mod decoder;
pub mod frame;
pub mod header;

pub use coeffs::{clamp16, predictor_coefficients};
pub use decoder::AdxDecoder;
pub use frame::{decode_frame, ChannelState};
pub use header::{AdxHeader, AdxVersion, EncodingType};
