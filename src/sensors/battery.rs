//! Battery-voltage conversion.
//!
//! The battery sits behind a 2:1 resistive divider into A3; the per-bit
//! step is a bench-calibrated constant rather than the nominal ADS1115
//! step, and a fixed offset compensates the divider's bias. The result is
//! rounded to one decimal — the investigation cares about tenths of a
//! volt, and the divider tolerance eats anything finer anyway.

/// Bench-calibrated volts per ADC bit on the divider input.
pub const VOLTAGE_LSB_V: f32 = 0.000_269_6;

/// Divider ratio (battery volts per volt at the ADC pin).
pub const DIVIDER_RATIO: f32 = 2.0;

/// Convert a raw single-ended ADC code to battery volts, one decimal.
pub fn raw_to_volts(raw: i16, offset_v: f32) -> f32 {
    round_to_tenth(DIVIDER_RATIO * VOLTAGE_LSB_V * f32::from(raw) + offset_v)
}

/// Round to one decimal place.
pub fn round_to_tenth(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_formula() {
        for raw in [0i16, 1, 1000, 12345, 22760, -5] {
            let offset = 0.3;
            let expected = ((2.0 * 0.000_269_6 * f32::from(raw) + offset) * 10.0).round() / 10.0;
            assert_eq!(raw_to_volts(raw, offset), expected);
        }
    }

    #[test]
    fn nominal_battery_voltage() {
        // ~12.6 V battery → 6.3 V at the pin → 6.3 / 0.0002696 ≈ 23368.
        let v = raw_to_volts(23368, 0.0);
        assert!((v - 12.6).abs() < 0.05 + 1e-6);
    }

    #[test]
    fn output_has_one_decimal() {
        let v = raw_to_volts(12345, 0.3);
        assert!(((v * 10.0) - (v * 10.0).round()).abs() < 1e-4);
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_to_tenth(0.25), 0.3);
        assert_eq!(round_to_tenth(-0.25), -0.3);
        assert_eq!(round_to_tenth(0.24), 0.2);
    }
}
