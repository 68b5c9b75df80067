//! Runtime configuration for a conversion.
//!
//! `BcssConfig` is the immutable record the core works from. It is separate
//! from the TOML-deserialized schema in `bcss_config`; see `conversions`.

use serde::Serialize;

/// Spindle-speed formula. Exactly one is active per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RpmMode {
    /// Scale a known-good baseline: S = S_ref * sin(theta_ref) / sin(theta).
    #[default]
    Relative,
    /// Absolute cutting speed: S = 1000 * Vc / (pi * D * sin(theta)).
    SurfaceSpeed,
}

/// Conversion parameters, echoed verbatim into the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BcssConfig {
    /// Ball-end mill diameter (mm).
    pub tool_d_mm: f64,
    /// Baseline angle (deg), in B-axis terms when `invert_b_to_theta` is set.
    pub theta_ref_deg: f64,
    /// Spindle speed known to be right at the baseline angle (rpm).
    pub s_ref_rpm: u32,
    /// Target cutting speed (m/min) for `RpmMode::SurfaceSpeed`.
    pub vc_m_per_min: f64,
    /// Floor quantization step (deg). Non-positive disables quantization.
    pub theta_step_deg: f64,
    /// Safety floor for theta before any sine is taken (deg).
    pub theta_min_deg: f64,
    pub s_min_rpm: u32,
    pub s_max_rpm: u32,
    /// Rounding unit (rpm); 0 behaves as 1.
    pub s_round_unit_rpm: u32,
    /// Minimum speed change worth an inserted line (rpm).
    pub deadband_rpm: u32,
    /// theta = 90 - B
    pub invert_b_to_theta: bool,
    pub mode: RpmMode,
}

impl Default for BcssConfig {
    fn default() -> Self {
        Self {
            tool_d_mm: 20.0,
            theta_ref_deg: 12.0,
            s_ref_rpm: 8000,
            vc_m_per_min: 0.0,
            theta_step_deg: 1.0,
            theta_min_deg: 1.0,
            s_min_rpm: 0,
            s_max_rpm: 999_999,
            s_round_unit_rpm: 10,
            deadband_rpm: 50,
            invert_b_to_theta: true,
            mode: RpmMode::Relative,
        }
    }
}
