//! Spindle speed as a function of tool tilt.
//!
//! A ball-end mill tilted by theta cuts on an effective diameter
//! `D_eff = D * sin(theta)`, so keeping the cutting speed constant means
//! scaling the spindle speed by `1 / sin(theta)`. Two formulas are offered:
//!
//! - **Relative**: `S(theta) = S_ref * sin(theta_ref) / sin(theta)`; the tool
//!   diameter cancels out.
//! - **Surface speed**: `S(theta) = 1000 * Vc / (pi * D_eff)`.
//!
//! Both share the same post-processing: safety floor on theta, rounding to
//! the configured unit, then clamping into `[s_min, s_max]`.

use crate::config::{BcssConfig, RpmMode};
use crate::util::{b_to_theta, floor_step};

/// Smallest |sin(theta)| used as a divisor.
pub const SIN_EPSILON: f64 = 1e-12;
/// Smallest effective cutting diameter (mm) used as a divisor.
pub const D_EFF_EPSILON_MM: f64 = 1e-9;

/// Full record of one speed computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpmDecision {
    /// Theta after the safety floor.
    pub theta_used_deg: f64,
    pub rpm_raw: f64,
    pub rpm_rounded: i64,
    pub rpm_clamped: u32,
    pub clamped: bool,
}

#[derive(Debug, Clone, Copy)]
enum Formula {
    Relative { s_ref_rpm: f64, sin_ref: f64 },
    SurfaceSpeed { vc_m_per_min: f64, tool_d_mm: f64 },
}

#[inline]
fn guarded_sin(theta_deg: f64) -> f64 {
    let s = theta_deg.to_radians().sin();
    if s.abs() < SIN_EPSILON { SIN_EPSILON } else { s }
}

/// Speed model for one conversion. Also remembers the last speed actually
/// in effect, which drives the deadband decision.
#[derive(Debug, Clone)]
pub struct RpmModel {
    cfg: BcssConfig,
    formula: Formula,
    last_s_rpm: Option<u32>,
}

impl RpmModel {
    pub fn new(cfg: &BcssConfig) -> Self {
        let formula = match cfg.mode {
            RpmMode::Relative => {
                // The baseline is entered in B terms, like the program itself.
                let theta_ref = if cfg.invert_b_to_theta {
                    b_to_theta(cfg.theta_ref_deg)
                } else {
                    cfg.theta_ref_deg
                };
                let theta_ref = theta_ref.max(cfg.theta_min_deg);
                Formula::Relative {
                    s_ref_rpm: f64::from(cfg.s_ref_rpm),
                    sin_ref: guarded_sin(theta_ref),
                }
            }
            RpmMode::SurfaceSpeed => Formula::SurfaceSpeed {
                vc_m_per_min: cfg.vc_m_per_min,
                tool_d_mm: cfg.tool_d_mm,
            },
        };
        Self {
            cfg: cfg.clone(),
            formula,
            last_s_rpm: None,
        }
    }

    pub fn config(&self) -> &BcssConfig {
        &self.cfg
    }

    /// Tool tilt for a B-axis reading under the configured angle convention.
    pub fn theta_for_b(&self, b_deg: f64) -> f64 {
        if self.cfg.invert_b_to_theta {
            b_to_theta(b_deg)
        } else {
            b_deg
        }
    }

    /// Floor theta to the configured step (identity when the step is not positive).
    pub fn quantize_theta(&self, theta_deg: f64) -> f64 {
        floor_step(theta_deg, self.cfg.theta_step_deg)
    }

    pub fn compute_s_for_theta(&self, theta_deg: f64) -> RpmDecision {
        let theta_used = theta_deg.max(self.cfg.theta_min_deg);
        let sin_theta = guarded_sin(theta_used);

        let rpm_raw = match self.formula {
            Formula::Relative { s_ref_rpm, sin_ref } => s_ref_rpm * (sin_ref / sin_theta),
            Formula::SurfaceSpeed {
                vc_m_per_min,
                tool_d_mm,
            } => {
                let d_eff_mm = (tool_d_mm * sin_theta).max(D_EFF_EPSILON_MM);
                (1000.0 * vc_m_per_min) / (std::f64::consts::PI * d_eff_mm)
            }
        };
        self.postprocess(theta_used, rpm_raw)
    }

    fn postprocess(&self, theta_used_deg: f64, rpm_raw: f64) -> RpmDecision {
        let unit = i64::from(self.cfg.s_round_unit_rpm.max(1));
        // Ties go to even.
        // Float-to-int casts saturate, so a runaway raw value still clamps below.
        let rpm_rounded = ((rpm_raw / unit as f64).round_ties_even() as i64).saturating_mul(unit);

        let s_min = i64::from(self.cfg.s_min_rpm);
        let s_max = i64::from(self.cfg.s_max_rpm);
        let mut value = rpm_rounded;
        let mut clamped = false;
        if value < s_min {
            value = s_min;
            clamped = true;
        }
        if value > s_max {
            value = s_max;
            clamped = true;
        }

        RpmDecision {
            theta_used_deg,
            rpm_raw,
            rpm_rounded,
            rpm_clamped: value.clamp(0, i64::from(u32::MAX)) as u32,
            clamped,
        }
    }

    /// Deadband gate: always true for the first speed of a spindle-on episode,
    /// otherwise true iff the change is at least `deadband_rpm`.
    pub fn should_insert(&self, next_rpm: u32) -> bool {
        match self.last_s_rpm {
            None => true,
            Some(last) => next_rpm.abs_diff(last) >= self.cfg.deadband_rpm,
        }
    }

    pub fn last_s(&self) -> Option<u32> {
        self.last_s_rpm
    }

    pub fn update_last_s(&mut self, s_rpm: u32) {
        self.last_s_rpm = Some(s_rpm);
    }

    pub fn reset_last_s(&mut self) {
        self.last_s_rpm = None;
    }
}
