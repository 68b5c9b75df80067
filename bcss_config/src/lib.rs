#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the B-axis constant-surface-speed rewriter.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section and field is optional; an empty file yields the defaults.
//! - Validation is deliberately permissive: a non-positive angle step or
//!   rounding unit is accepted and degrades to a no-op in the core.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolCfg {
    /// Ball-end mill diameter in mm (used by the surface-speed formula).
    pub diameter_mm: f64,
}

impl Default for ToolCfg {
    fn default() -> Self {
        Self { diameter_mm: 20.0 }
    }
}

/// Which spindle-speed formula drives the insertions.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMode {
    /// S = S_ref * sin(theta_ref) / sin(theta)
    #[default]
    Relative,
    /// S = 1000 * Vc / (pi * D * sin(theta))
    #[serde(alias = "vc_absolute")]
    SurfaceSpeed,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpeedCfg {
    pub mode: SpeedMode,
    /// Baseline angle in degrees, given in B-axis terms (converted when `angle.invert_b`).
    pub theta_ref_deg: f64,
    /// Spindle speed (rpm) that is correct at `theta_ref_deg`.
    pub s_ref_rpm: u32,
    /// Target cutting speed in m/min. Required for `surface_speed`.
    pub vc_m_per_min: Option<f64>,
}

impl Default for SpeedCfg {
    fn default() -> Self {
        Self {
            mode: SpeedMode::Relative,
            theta_ref_deg: 12.0,
            s_ref_rpm: 8000,
            vc_m_per_min: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AngleCfg {
    /// Floor quantization step in degrees; <= 0 disables quantization.
    pub step_deg: f64,
    /// Safety floor for theta to keep sin(theta) away from zero.
    pub min_deg: f64,
    /// Use theta = 90 - B.
    pub invert_b: bool,
}

impl Default for AngleCfg {
    fn default() -> Self {
        Self {
            step_deg: 1.0,
            min_deg: 1.0,
            invert_b: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpindleCfg {
    pub s_min_rpm: u32,
    pub s_max_rpm: u32,
    /// Inserted speeds are rounded to a multiple of this; 0 behaves as 1.
    pub round_unit_rpm: u32,
    /// Changes smaller than this are not worth an extra S line.
    pub deadband_rpm: u32,
}

impl Default for SpindleCfg {
    fn default() -> Self {
        Self {
            s_min_rpm: 0,
            s_max_rpm: 999_999,
            round_unit_rpm: 10,
            deadband_rpm: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputCfg {
    /// Output directory; defaults to the input file's directory.
    pub dir: Option<String>,
    /// Appended to the input stem for the output and report names.
    pub suffix: String,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            dir: None,
            suffix: "-bcss".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub tool: ToolCfg,
    pub speed: SpeedCfg,
    pub angle: AngleCfg,
    pub spindle: SpindleCfg,
    pub output: OutputCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is left to the caller.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
}

fn ensure_finite(name: &str, v: f64) -> eyre::Result<()> {
    if !v.is_finite() {
        eyre::bail!("{name} must be a finite number");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Tool / speed
        ensure_finite("tool.diameter_mm", self.tool.diameter_mm)?;
        ensure_finite("speed.theta_ref_deg", self.speed.theta_ref_deg)?;
        if let Some(vc) = self.speed.vc_m_per_min {
            ensure_finite("speed.vc_m_per_min", vc)?;
        }
        if self.speed.mode == SpeedMode::SurfaceSpeed {
            match self.speed.vc_m_per_min {
                Some(vc) if vc > 0.0 => {}
                _ => eyre::bail!("speed.vc_m_per_min must be > 0 when speed.mode = \"surface_speed\""),
            }
            if self.tool.diameter_mm <= 0.0 {
                eyre::bail!("tool.diameter_mm must be > 0 when speed.mode = \"surface_speed\"");
            }
        }

        // Angle: step <= 0 is allowed (identity quantization)
        ensure_finite("angle.step_deg", self.angle.step_deg)?;
        ensure_finite("angle.min_deg", self.angle.min_deg)?;

        // Output
        if self.output.suffix.is_empty() {
            eyre::bail!("output.suffix must not be empty (output would overwrite the input)");
        }
        if self.output.suffix.contains(['/', '\\']) {
            eyre::bail!("output.suffix must not contain path separators");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        // Spindle: s_min > s_max is tolerated (s_max wins when clamping)

        Ok(())
    }
}
