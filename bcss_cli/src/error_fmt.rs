//! Human-readable error descriptions and structured JSON error formatting.

use bcss_core::BcssError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BcssError>() {
        return match be {
            BcssError::InputNotFound(path) => format!(
                "What happened: Input file {} was not found.\nLikely causes: Typo in the path, the file was moved, or the path names a directory.\nHow to fix: Pass an existing NC program file.",
                path.display()
            ),
            BcssError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: A non-numeric or non-finite value in the TOML or on the command line, or surface_speed mode without vc_m_per_min.\nHow to fix: Edit the config file or flags, then rerun. See README for a sample."
            ),
            BcssError::Io(msg) => format!(
                "What happened: File access failed ({msg}).\nLikely causes: Missing permissions, a read-only output directory, or a full disk.\nHow to fix: Check permissions on the input and output locations, or choose another --out-dir."
            ),
        };
    }

    // String-based heuristics for errors raised without a typed variant
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("permission denied") {
        return "What happened: Permission denied.\nLikely causes: The output directory or log file is not writable.\nHow to fix: Choose a writable --out-dir or fix the [logging] file path.".to_string();
    }

    if lower.contains("log-level") || lower.contains("logging.level") {
        return format!(
            "What happened: Invalid log level ({msg}).\nLikely causes: A level name other than error|warn|info|debug|trace.\nHow to fix: Use one of those names, or an EnvFilter directive such as bcss_core=debug."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 missing input, 4 bad configuration, 1 anything else.
/// Usage errors exit with 2 from clap itself.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<BcssError>() {
        Some(BcssError::InputNotFound(_)) => 3,
        Some(BcssError::Config(_)) => 4,
        Some(BcssError::Io(_)) | None => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<BcssError>() {
        Some(BcssError::InputNotFound(_)) => "InputNotFound",
        Some(BcssError::Config(_)) => "Config",
        Some(BcssError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "error": format!("{err:#}"),
    });
    if let Some(BcssError::InputNotFound(path)) = err.downcast_ref::<BcssError>() {
        obj["details"] = json!({ "input": path.display().to_string() });
    }
    obj.to_string()
}
