//! Current-shunt conversion.
//!
//! The shunt is rated in amps per 75 mV of drop; the ADS1115 reads the
//! drop differentially across A0/A1. Current in amperes is then
//! `raw * mV-per-bit * (rating / 75)`. Signed: the sign follows the
//! direction of flow (negative while the battery charges).

/// Shunt drop (mV) at the rated current — the constant on the data plate.
pub const RATED_DROP_MV: f32 = 75.0;

/// Convert a raw differential ADC code to amperes.
pub fn raw_to_amps(raw: i16, lsb_mv: f32, shunt_rating_amps: f32) -> f32 {
    f32::from(raw) * lsb_mv * (shunt_rating_amps / RATED_DROP_MV)
}
