//! ADC and MQ-3 Conversions
//!
//! Turns pipeline voltages into physical quantities. None of this runs on the
//! sample hot path: calibration converts one stable window mean, runtime
//! converts one breath peak.
//!
//! ## Signal Chain
//!
//! ```text
//! MQ-3 Vout (0-5 V) ─→ 10k/20k divider ─→ ADS1115 (±4.096 V FS) ─→ raw i16
//!                                                                   │
//!   volts = raw * 4.096 / 32768 ←───────────────────────────────────┘
//!   Vout  = volts * 1.5
//!   Rs    = RL * (Vcc / Vout - 1)
//!   ratio = Rs / Ro
//!   C     = exp((ln ratio + 0.29) / -0.268)        mg/L
//!   ppm   = C * 530
//!   BAC   = ppm * 0.000385505
//! ```
//!
//! Non-positive voltages have no physical resistance; the functions return
//! whatever IEEE arithmetic gives (infinite or negative) and the report
//! constructors return `None` instead.

use crate::constants::sensor;
use crate::stats::WindowResult;

/// ADS1115 code to volts at the `FS_4_096V` gain
pub fn ads1115_volts(raw: i16) -> f64 {
    raw as f64 * sensor::ADC_FULL_SCALE_V / sensor::ADC_CODES_PER_FULL_SCALE
}

/// Volts to the nearest ADS1115 code at the `FS_4_096V` gain, saturating
pub fn volts_to_ads1115(volts: f64) -> i16 {
    let code = libm::round(volts * sensor::ADC_CODES_PER_FULL_SCALE / sensor::ADC_FULL_SCALE_V);
    code.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Load circuit of one sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CircuitConfig {
    /// Load resistor RL, also the lower divider leg (ohms)
    pub load_resistor_ohms: f64,
    /// Upper divider leg (ohms)
    pub divider_top_ohms: f64,
    /// Sensor supply (volts)
    pub supply_v: f64,
    /// Clean-air sensor resistance Ro (ohms)
    pub ro_air_ohms: f64,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            load_resistor_ohms: sensor::LOAD_RESISTOR_OHMS,
            divider_top_ohms: sensor::DIVIDER_TOP_OHMS,
            supply_v: sensor::SUPPLY_V,
            ro_air_ohms: sensor::RO_AIR_OHMS,
        }
    }
}

impl CircuitConfig {
    /// Divider gain from ADC pin back to sensor output, 1.5 by default
    pub fn divider_factor(&self) -> f64 {
        (self.divider_top_ohms + self.load_resistor_ohms) / self.load_resistor_ohms
    }

    /// ADC pin volts to sensor output volts
    pub fn adc_to_vout(&self, adc_volts: f64) -> f64 {
        adc_volts * self.divider_factor()
    }

    /// ADC pin volts to sensor resistance Rs
    pub fn adc_to_rs(&self, adc_volts: f64) -> f64 {
        vout_to_rs(self.adc_to_vout(adc_volts), self.load_resistor_ohms, self.supply_v)
    }

    /// ADC pin volts to Rs/Ro
    pub fn adc_to_ratio(&self, adc_volts: f64) -> f64 {
        rs_to_ratio(self.adc_to_rs(adc_volts), self.ro_air_ohms)
    }
}

/// Sensor resistance from its output voltage
pub fn vout_to_rs(vout: f64, load_ohms: f64, supply_v: f64) -> f64 {
    load_ohms * (supply_v / vout - 1.0)
}

/// Rs/Ro
pub fn rs_to_ratio(rs_ohms: f64, ro_ohms: f64) -> f64 {
    rs_ohms / ro_ohms
}

/// Ro from a clean-air Rs reading, using the datasheet clean-air ratio
pub fn ro_from_clean_air(rs_ohms: f64) -> f64 {
    rs_ohms / sensor::RS_RO_CLEAN_AIR
}

/// Ethanol mg/L from Rs/Ro, exponential fit
pub fn concentration_exp(rs_ro: f64) -> f64 {
    libm::exp((libm::log(rs_ro) + sensor::EXP_FIT_INTERCEPT) / sensor::EXP_FIT_SLOPE)
}

/// Ethanol mg/L from Rs/Ro, log10 fit
pub fn concentration_log10(rs_ro: f64) -> f64 {
    libm::pow(10.0, sensor::LOG10_FIT_SLOPE * libm::log10(rs_ro) + sensor::LOG10_FIT_INTERCEPT)
}

/// mg/L to ppm
pub fn ppm(concentration_mg_l: f64) -> f64 {
    concentration_mg_l * sensor::ETHANOL_MG_L_TO_PPM
}

/// ppm to blood alcohol content
pub fn bac(ppm: f64) -> f64 {
    ppm * sensor::PPM_TO_BAC
}

/// Sensor resistance at the end of a calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationReport {
    /// Window mean at the ADC pin (volts)
    pub mean_volts: f64,
    /// Sensor resistance Rs (ohms)
    pub rs_ohms: f64,
    /// Rs/Ro against the configured Ro
    pub rs_ro: f64,
    /// Ro implied by treating this reading as clean air (ohms)
    pub ro_clean_air_ohms: f64,
    /// Whether the window was stable
    pub stable: bool,
}

impl CalibrationReport {
    /// Convert a window mean; `None` for a non-positive mean
    pub fn from_window(window: &WindowResult, circuit: &CircuitConfig) -> Option<Self> {
        if !(window.mean > 0.0) {
            return None;
        }
        let rs_ohms = circuit.adc_to_rs(window.mean);
        Some(Self {
            mean_volts: window.mean,
            rs_ohms,
            rs_ro: rs_to_ratio(rs_ohms, circuit.ro_air_ohms),
            ro_clean_air_ohms: ro_from_clean_air(rs_ohms),
            stable: window.stable,
        })
    }
}

/// Physical reading of one breath peak
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreathReading {
    /// Peak at the ADC pin (volts)
    pub peak_volts: f64,
    /// Sensor resistance at the peak (ohms)
    pub rs_ohms: f64,
    /// Rs/Ro at the peak
    pub rs_ro: f64,
    /// Ethanol concentration (mg/L), exponential fit
    pub concentration_mg_l: f64,
    /// Ethanol (ppm)
    pub ppm: f64,
    /// Blood alcohol content
    pub bac: f64,
}

impl BreathReading {
    /// Convert a breath peak; `None` for a non-positive peak
    pub fn from_peak(peak_volts: f64, circuit: &CircuitConfig) -> Option<Self> {
        if !(peak_volts > 0.0) {
            return None;
        }
        let rs_ohms = circuit.adc_to_rs(peak_volts);
        let rs_ro = rs_to_ratio(rs_ohms, circuit.ro_air_ohms);
        let concentration_mg_l = concentration_exp(rs_ro);
        let ppm = ppm(concentration_mg_l);
        Some(Self {
            peak_volts,
            rs_ohms,
            rs_ro,
            concentration_mg_l,
            ppm,
            bac: bac(ppm),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn adc_codes() {
        assert_eq!(ads1115_volts(0), 0.0);
        assert_eq!(ads1115_volts(16_384), 2.048);
        assert_eq!(ads1115_volts(-32_768), -4.096);
        assert_eq!(volts_to_ads1115(2.048), 16_384);
        assert_eq!(volts_to_ads1115(10.0), i16::MAX);
    }

    #[test]
    fn divider_is_three_halves() {
        let circuit = CircuitConfig::default();
        assert_eq!(circuit.divider_factor(), 1.5);
        assert_eq!(circuit.adc_to_vout(2.0), 3.0);
    }

    #[test]
    fn rs_from_vout() {
        // Vout = Vcc / 2 means Rs == RL
        assert_eq!(vout_to_rs(2.5, 20_000.0, 5.0), 20_000.0);
        let circuit = CircuitConfig::default();
        assert!(close(circuit.adc_to_rs(2.5 / 1.5), 20_000.0, 1e-6));
    }

    #[test]
    fn fits_agree_roughly() {
        // Both fits describe the same datasheet curve
        for ratio in [0.2, 0.5, 1.0] {
            let exp_fit = concentration_exp(ratio);
            let log_fit = concentration_log10(ratio);
            assert!(exp_fit > 0.0 && log_fit > 0.0);
        }
        // Lower resistance means more ethanol
        assert!(concentration_exp(0.2) > concentration_exp(0.5));
        assert!(concentration_log10(0.2) > concentration_log10(0.5));
    }

    #[test]
    fn breath_reading_chain() {
        let circuit = CircuitConfig::default();
        let reading = BreathReading::from_peak(2.0, &circuit).unwrap();
        assert!(close(reading.rs_ohms, 20_000.0 * (5.0 / 3.0 - 1.0), 1e-6));
        assert!(close(reading.ppm, reading.concentration_mg_l * 530.0, 1e-9));
        assert!(close(reading.bac, reading.ppm * 0.000385505, 1e-12));
        assert!(BreathReading::from_peak(0.0, &circuit).is_none());
    }

    #[test]
    fn calibration_from_stable_window() {
        let window = WindowResult { mean: 1.1876, stable: true, num_samples: 128, ..Default::default() };
        let report = CalibrationReport::from_window(&window, &CircuitConfig::default()).unwrap();
        assert!(report.stable);
        assert!(close(report.rs_ro, report.rs_ohms / sensor::RO_AIR_OHMS, 1e-12));
        assert!(close(report.ro_clean_air_ohms * 60.0, report.rs_ohms, 1e-9));
    }
}
