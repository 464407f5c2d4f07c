//! Power unit conversions.

/// Converts power in dBm to linear power in W.
pub fn dbm_to_watts(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.) / 1000.
}

/// Converts linear power in W to dBm.
///
/// Returns negative infinity for zero power.
pub fn watts_to_dbm(watts: f64) -> f64 {
    10. * (watts * 1000.).log10()
}
