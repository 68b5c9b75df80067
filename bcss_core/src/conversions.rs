//! `From` implementations bridging `bcss_config` types to `bcss_core` types.

use crate::config::{BcssConfig, RpmMode};

// ── RpmMode ──────────────────────────────────────────────────────────────────

impl From<bcss_config::SpeedMode> for RpmMode {
    fn from(m: bcss_config::SpeedMode) -> Self {
        match m {
            bcss_config::SpeedMode::Relative => RpmMode::Relative,
            bcss_config::SpeedMode::SurfaceSpeed => RpmMode::SurfaceSpeed,
        }
    }
}

// ── BcssConfig ───────────────────────────────────────────────────────────────

impl From<&bcss_config::Config> for BcssConfig {
    fn from(c: &bcss_config::Config) -> Self {
        Self {
            tool_d_mm: c.tool.diameter_mm,
            theta_ref_deg: c.speed.theta_ref_deg,
            s_ref_rpm: c.speed.s_ref_rpm,
            vc_m_per_min: c.speed.vc_m_per_min.unwrap_or(0.0),
            theta_step_deg: c.angle.step_deg,
            theta_min_deg: c.angle.min_deg,
            s_min_rpm: c.spindle.s_min_rpm,
            s_max_rpm: c.spindle.s_max_rpm,
            s_round_unit_rpm: c.spindle.round_unit_rpm,
            deadband_rpm: c.spindle.deadband_rpm,
            invert_b_to_theta: c.angle.invert_b,
            mode: c.speed.mode.into(),
        }
    }
}
