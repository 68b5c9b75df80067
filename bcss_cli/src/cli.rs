//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "bcss",
    version,
    about = "Insert S words after B-axis tilts to hold ball-end surface speed"
)]
pub struct Cli {
    /// NC program files to convert (EIA/ISO, UTF-8 or Shift_JIS)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write outputs here instead of next to each input (created if missing)
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Print results and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub overrides: Overrides,
}

/// Per-run overrides; each wins over the matching config file value.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Ball-end mill diameter (mm)
    #[arg(long = "tool-d", value_name = "MM")]
    pub tool_d_mm: Option<f64>,

    /// Baseline angle (deg) at which --s-ref is correct
    #[arg(long = "theta-ref", value_name = "DEG")]
    pub theta_ref_deg: Option<f64>,

    /// Spindle speed (rpm) known to be right at --theta-ref
    #[arg(long = "s-ref", value_name = "RPM")]
    pub s_ref_rpm: Option<u32>,

    /// Target cutting speed (m/min) for --mode surface-speed
    #[arg(long = "vc", value_name = "M_PER_MIN")]
    pub vc_m_per_min: Option<f64>,

    /// Spindle-speed formula
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Angle quantization step (deg); 0 disables quantization
    #[arg(long = "theta-step", value_name = "DEG")]
    pub theta_step_deg: Option<f64>,

    /// Smallest theta used in the formula (deg)
    #[arg(long = "theta-min", value_name = "DEG")]
    pub theta_min_deg: Option<f64>,

    /// Lower clamp for inserted speeds (rpm)
    #[arg(long = "s-min", value_name = "RPM")]
    pub s_min_rpm: Option<u32>,

    /// Upper clamp for inserted speeds (rpm)
    #[arg(long = "s-max", value_name = "RPM")]
    pub s_max_rpm: Option<u32>,

    /// Round inserted speeds to a multiple of this (rpm)
    #[arg(long = "s-round", value_name = "RPM")]
    pub s_round_unit_rpm: Option<u32>,

    /// Skip insertions that change the speed by less than this (rpm)
    #[arg(long, value_name = "RPM")]
    pub deadband: Option<u32>,

    /// Treat theta as 90 - B
    #[arg(long = "invert-b", action = ArgAction::SetTrue, conflicts_with = "no_invert_b")]
    pub invert_b: bool,

    /// Use the B reading as theta directly
    #[arg(long = "no-invert-b", action = ArgAction::SetTrue)]
    pub no_invert_b: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Scale --s-ref by sin(theta_ref) / sin(theta)
    Relative,
    /// Hold --vc on a --tool-d ball
    SurfaceSpeed,
}

impl From<ModeArg> for bcss_config::SpeedMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Relative => bcss_config::SpeedMode::Relative,
            ModeArg::SurfaceSpeed => bcss_config::SpeedMode::SurfaceSpeed,
        }
    }
}

impl Overrides {
    /// Write every flag that was given into `cfg`.
    pub fn apply(&self, cfg: &mut bcss_config::Config) {
        if let Some(v) = self.tool_d_mm {
            cfg.tool.diameter_mm = v;
        }
        if let Some(v) = self.theta_ref_deg {
            cfg.speed.theta_ref_deg = v;
        }
        if let Some(v) = self.s_ref_rpm {
            cfg.speed.s_ref_rpm = v;
        }
        if let Some(v) = self.vc_m_per_min {
            cfg.speed.vc_m_per_min = Some(v);
        }
        if let Some(m) = self.mode {
            cfg.speed.mode = m.into();
        }
        if let Some(v) = self.theta_step_deg {
            cfg.angle.step_deg = v;
        }
        if let Some(v) = self.theta_min_deg {
            cfg.angle.min_deg = v;
        }
        if let Some(v) = self.s_min_rpm {
            cfg.spindle.s_min_rpm = v;
        }
        if let Some(v) = self.s_max_rpm {
            cfg.spindle.s_max_rpm = v;
        }
        if let Some(v) = self.s_round_unit_rpm {
            cfg.spindle.round_unit_rpm = v;
        }
        if let Some(v) = self.deadband {
            cfg.spindle.deadband_rpm = v;
        }
        if self.invert_b {
            cfg.angle.invert_b = true;
        }
        if self.no_invert_b {
            cfg.angle.invert_b = false;
        }
    }
}
