//! ADC and MQ-3 Circuit Constants
//!
//! The MQ-3 output (0-5 V) passes a 10 kΩ / 20 kΩ divider into the ADS1115,
//! which runs at the ±4.096 V full-scale range.
//!
//! ```text
//! VAdc = Vout * RL / (R1 + RL) = Vout * 2/3
//! Rs   = RL * (Vcc / Vout - 1)
//! ```

// ===== ADS1115 =====

/// Full-scale range of the `FS_4_096V` PGA setting (volts).
pub const ADC_FULL_SCALE_V: f64 = 4.096;

/// Codes per full scale of the signed 16-bit conversion.
pub const ADC_CODES_PER_FULL_SCALE: f64 = 32_768.0;

// ===== LOAD CIRCUIT =====

/// MQ-3 load resistor (ohms).
pub const LOAD_RESISTOR_OHMS: f64 = 20_000.0;

/// Top resistor of the 5 V → 3.3 V divider (ohms).
pub const DIVIDER_TOP_OHMS: f64 = 10_000.0;

/// Sensor supply voltage (volts).
pub const SUPPLY_V: f64 = 5.0;

/// Clean-air Rs/Ro ratio read off the datasheet curve.
pub const RS_RO_CLEAN_AIR: f64 = 60.0;

/// Clean-air sensor resistance Ro (ohms).
///
/// Source: calibration in an 18.9 L jug, stable mean ≈ 1.1876 V
pub const RO_AIR_OHMS: f64 = 685.124026;

// ===== CONCENTRATION FITS =====

/// Slope of the exponential fit `ln(Rs/Ro) = m ln(C) + b`.
pub const EXP_FIT_SLOPE: f64 = -0.268;

/// Intercept of the exponential fit.
pub const EXP_FIT_INTERCEPT: f64 = 0.29;

/// Slope of the log10 fit `C = 10^(m log10(Rs/Ro) + b)`.
pub const LOG10_FIT_SLOPE: f64 = -3.733;

/// Intercept of the log10 fit.
pub const LOG10_FIT_INTERCEPT: f64 = -0.47;

/// mg/L ethanol to ppm.
pub const ETHANOL_MG_L_TO_PPM: f64 = 530.0;

/// ppm to blood alcohol content (US factor).
pub const PPM_TO_BAC: f64 = 0.000385505;
