//! Streaming file conversion: raw bytes in, raw bytes plus `S` lines out.
//!
//! Lines are read with `read_until(b'\n')`, so each keeps its own terminator
//! and is written back untouched. Decoding only feeds the token scanner.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use bcss_traits::{Clock, SystemClock};
use eyre::WrapErr;

use crate::config::BcssConfig;
use crate::encoding::{
    LineDecoder, Newline, PROBE_LEN, Probe, TextEncoding, probe_file, probe_sample, split_newline,
};
use crate::error::{BcssError, Result};
use crate::injector::Injector;
use crate::report::{EncodingInfo, Report, Stats};
use crate::rpm_model::RpmModel;

/// Suffix appended to the input stem when none is configured.
pub const DEFAULT_SUFFIX: &str = "-bcss";

/// Where a conversion writes its program and its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub output: PathBuf,
    pub report: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<stem><suffix><.ext>` and `<dir>/<stem><suffix>.report.json`,
    /// with `dir` defaulting to the input's own directory.
    pub fn derive(input: &Path, out_dir: Option<&Path>, suffix: &str) -> Result<Self> {
        let stem = input.file_stem().ok_or_else(|| {
            BcssError::Config(format!("input has no file name: {}", input.display()))
        })?;
        let dir = out_dir
            .or_else(|| input.parent())
            .unwrap_or_else(|| Path::new(""));

        let mut base = OsString::from(stem);
        base.push(suffix);

        let mut output = base.clone();
        if let Some(ext) = input.extension() {
            output.push(".");
            output.push(ext);
        }
        let mut report = base;
        report.push(".report.json");

        Ok(Self {
            output: dir.join(output),
            report: dir.join(report),
        })
    }
}

/// One pass of the injector over a byte stream.
#[derive(Debug)]
pub struct Transducer {
    injector: Injector,
    decoder: LineDecoder,
    detected: TextEncoding,
    newline: Newline,
}

impl Transducer {
    pub fn new(cfg: &BcssConfig, probe: &Probe) -> Self {
        Self {
            injector: Injector::new(RpmModel::new(cfg)),
            decoder: LineDecoder::new(probe.encoding),
            detected: probe.encoding,
            newline: probe.newline,
        }
    }

    /// Copy `reader` to `writer`, placing each inserted `S` line before the
    /// line it was decided against. The writer is flushed on success.
    pub fn run<R: BufRead, W: Write>(
        mut self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(Stats, EncodingInfo)> {
        let mut line = Vec::with_capacity(256);
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line).wrap_err("read input")?;
            if n == 0 {
                break;
            }
            let (body, terminator) = split_newline(&line);
            let text = self.decoder.decode(body);
            if let Some(insertion) = self.injector.process_line(&text) {
                // The last line may lack a terminator; the inserted one never does.
                let newline = terminator.unwrap_or(self.newline);
                insertion
                    .write_to(&mut writer, newline.as_bytes())
                    .wrap_err("write output")?;
            }
            writer.write_all(&line).wrap_err("write output")?;
        }
        self.injector.finalize();
        writer.flush().wrap_err("flush output")?;

        let encoding = EncodingInfo {
            detected: self.detected,
            newline: self.newline,
            fallback_lines: self.decoder.fallback_lines(),
        };
        Ok((self.injector.into_stats(), encoding))
    }
}

/// Convert an in-memory program. Returns the rewritten bytes and statistics.
pub fn transform_bytes(input: &[u8], cfg: &BcssConfig) -> Result<(Vec<u8>, Stats)> {
    let complete = input.len() <= PROBE_LEN;
    let probe = probe_sample(&input[..input.len().min(PROBE_LEN)], complete);
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    let (stats, _) = Transducer::new(cfg, &probe).run(input, &mut out)?;
    Ok((out, stats))
}

/// Convert `input` next to itself (or into `out_dir`) with the default suffix.
pub fn process_file(input: &Path, out_dir: Option<&Path>, cfg: &BcssConfig) -> Result<Report> {
    let paths = OutputPaths::derive(input, out_dir, DEFAULT_SUFFIX)?;
    process_file_with(input, &paths, cfg, &SystemClock::new())
}

/// Convert `input` into `paths.output` and write the JSON report to `paths.report`.
pub fn process_file_with<C: Clock>(
    input: &Path,
    paths: &OutputPaths,
    cfg: &BcssConfig,
    clock: &C,
) -> Result<Report> {
    if !input.is_file() {
        return Err(BcssError::InputNotFound(input.to_path_buf()).into());
    }
    if paths.output == input || paths.report == input {
        return Err(BcssError::Config(format!(
            "output would overwrite the input: {}",
            input.display()
        ))
        .into());
    }
    if cfg.s_min_rpm > cfg.s_max_rpm {
        tracing::warn!(
            s_min = cfg.s_min_rpm,
            s_max = cfg.s_max_rpm,
            "s_min above s_max; every computed speed will clamp to s_max"
        );
    }

    let probe = probe_file(input)
        .map_err(|e| BcssError::Io(format!("read {}: {e}", input.display())))?;
    if probe.lossy {
        tracing::warn!(
            input = %input.display(),
            "neither UTF-8 nor Shift_JIS; scanning with replacement characters"
        );
    }
    tracing::info!(
        input = %input.display(),
        output = %paths.output.display(),
        encoding = probe.encoding.name(),
        newline = ?probe.newline,
        "converting"
    );

    if let Some(dir) = paths.output.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .wrap_err_with(|| format!("create output directory {}", dir.display()))?;
        }
    }

    let reader = File::open(input)
        .map(BufReader::new)
        .map_err(|e| BcssError::Io(format!("open {}: {e}", input.display())))?;
    let writer = File::create(&paths.output)
        .map(BufWriter::new)
        .map_err(|e| BcssError::Io(format!("create {}: {e}", paths.output.display())))?;

    let (stats, encoding) = Transducer::new(cfg, &probe)
        .run(reader, writer)
        .wrap_err_with(|| format!("convert {}", input.display()))?;

    let report = Report::create(
        input,
        &paths.output,
        &paths.report,
        clock.stamp(),
        cfg,
        encoding,
        stats,
    );
    report.write_json(&paths.report)?;

    tracing::info!(
        output = %paths.output.display(),
        lines = stats.detect.total_lines,
        inserted = stats.changes.inserted_s_lines,
        skipped_deadband = stats.changes.skipped_deadband,
        skipped_nextline_has_s = stats.changes.skipped_nextline_has_s,
        pending_at_eof = stats.changes.pending_at_eof,
        "converted"
    );
    Ok(report)
}
