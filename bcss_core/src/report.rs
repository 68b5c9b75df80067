//! Conversion statistics and the JSON report written next to the output.

use std::path::Path;

use eyre::WrapErr;
use serde::Serialize;

use crate::config::BcssConfig;
use crate::encoding::{Newline, TextEncoding};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectStats {
    pub total_lines: u64,
    /// Lines carrying a B word while the spindle was on.
    pub b_lines: u64,
    pub spindle_on_lines: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeStats {
    pub inserted_s_lines: u64,
    pub skipped_nextline_has_s: u64,
    pub skipped_deadband: u64,
    pub clamped_count: u64,
    pub theta_min_applied_count: u64,
    pub pending_at_eof: u64,
}

/// Range of spindle speeds in effect (inserted or explicit) while the spindle was on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SRange {
    pub s_min: Option<u32>,
    pub s_max: Option<u32>,
}

impl SRange {
    pub fn update(&mut self, s: u32) {
        self.s_min = Some(self.s_min.map_or(s, |m| m.min(s)));
        self.s_max = Some(self.s_max.map_or(s, |m| m.max(s)));
    }
}

/// Counters accumulated by the injector over one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub detect: DetectStats,
    pub changes: ChangeStats,
    pub s_range: SRange,
}

/// How the input was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodingInfo {
    pub detected: TextEncoding,
    pub newline: Newline,
    /// Lines that only decoded with the alternate encoding.
    pub fallback_lines: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input_file: String,
    pub output_file: String,
    pub report_file: String,
    pub processed_at: String,
    pub config: BcssConfig,
    pub encoding: EncodingInfo,
    pub detect: DetectStats,
    pub changes: ChangeStats,
    pub s_range: SRange,
}

impl Report {
    pub fn create(
        input: &Path,
        output: &Path,
        report: &Path,
        processed_at: String,
        cfg: &BcssConfig,
        encoding: EncodingInfo,
        stats: Stats,
    ) -> Self {
        Self {
            input_file: input.display().to_string(),
            output_file: output.display().to_string(),
            report_file: report.display().to_string(),
            processed_at,
            config: cfg.clone(),
            encoding,
            detect: stats.detect,
            changes: stats.changes,
            s_range: stats.s_range,
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            detect: self.detect,
            changes: self.changes,
            s_range: self.s_range,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).wrap_err("serialize report")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).wrap_err_with(|| format!("write report {}", path.display()))
    }
}
