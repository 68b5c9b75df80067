//! Per-file conversion: config mapping, output naming, and result rendering.

use std::path::{Path, PathBuf};

use bcss_core::error::Result as CoreResult;
use bcss_core::{BcssConfig, OutputPaths, Report, process_file_with};
use bcss_traits::Clock;
use serde_json::json;

/// Settings shared by every file of one invocation.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub core: BcssConfig,
    pub out_dir: Option<PathBuf>,
    pub suffix: String,
}

impl RunPlan {
    /// `--out-dir` wins over `[output] dir`.
    pub fn new(cfg: &bcss_config::Config, out_dir_flag: Option<PathBuf>) -> Self {
        Self {
            core: cfg.into(),
            out_dir: out_dir_flag.or_else(|| cfg.output.dir.as_ref().map(PathBuf::from)),
            suffix: cfg.output.suffix.clone(),
        }
    }

    pub fn convert(&self, input: &Path, clock: &impl Clock) -> CoreResult<Report> {
        let paths = OutputPaths::derive(input, self.out_dir.as_deref(), &self.suffix)?;
        process_file_with(input, &paths, &self.core, clock)
    }
}

fn fmt_opt(v: Option<u32>) -> String {
    v.map_or_else(|| "-".to_string(), |s| s.to_string())
}

pub fn summary_line(report: &Report) -> String {
    let c = &report.changes;
    format!(
        "{} -> {}: inserted={} skipped_deadband={} skipped_nextline_has_s={} pending_at_eof={} s_range={}..{}",
        report.input_file,
        report.output_file,
        c.inserted_s_lines,
        c.skipped_deadband,
        c.skipped_nextline_has_s,
        c.pending_at_eof,
        fmt_opt(report.s_range.s_min),
        fmt_opt(report.s_range.s_max),
    )
}

pub fn summary_json(report: &Report) -> serde_json::Value {
    let c = &report.changes;
    json!({
        "input": report.input_file,
        "output": report.output_file,
        "report": report.report_file,
        "inserted": c.inserted_s_lines,
        "skipped_deadband": c.skipped_deadband,
        "skipped_nextline_has_s": c.skipped_nextline_has_s,
        "pending_at_eof": c.pending_at_eof,
        "s_min": report.s_range.s_min,
        "s_max": report.s_range.s_max,
    })
}
