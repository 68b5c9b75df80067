//! Text encoding and newline handling for NC files.
//!
//! Post-processors emit either UTF-8 or Shift_JIS (CP932), the latter
//! mostly because of Japanese text inside `( ... )` comments. Detection runs
//! on a leading sample: strict UTF-8, then strict Shift_JIS, then lossy
//! UTF-8. Decoding is only needed for token scanning; output bytes are copied
//! through unchanged.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use encoding_rs::SHIFT_JIS;
use serde::Serialize;

/// Size of the leading sample used for detection.
pub const PROBE_LEN: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    ShiftJis,
}

impl TextEncoding {
    pub fn alternate(self) -> Self {
        match self {
            TextEncoding::Utf8 => TextEncoding::ShiftJis,
            TextEncoding::ShiftJis => TextEncoding::Utf8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::ShiftJis => "shift_jis",
        }
    }

    fn decode_strict(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            TextEncoding::ShiftJis => {
                SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }

    fn decode_lossy(self, bytes: &[u8]) -> Cow<'_, str> {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes),
            TextEncoding::ShiftJis => SHIFT_JIS.decode_without_bom_handling(bytes).0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Newline {
    Lf,
    CrLf,
}

impl Newline {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Newline::Lf => b"\n",
            Newline::CrLf => b"\r\n",
        }
    }
}

/// Result of sniffing the head of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub encoding: TextEncoding,
    /// File-level newline, used only for synthetic content at end of file.
    pub newline: Newline,
    /// Neither strict decoding accepted the sample.
    pub lossy: bool,
}

/// Classify a leading sample. `complete` is true when the sample is the whole file.
pub fn probe_sample(sample: &[u8], complete: bool) -> Probe {
    let newline = if sample.windows(2).any(|w| w == b"\r\n") {
        Newline::CrLf
    } else {
        Newline::Lf
    };

    // A cut-off sample may end inside a multi-byte character; stop at the last full line.
    let sample = match sample.iter().rposition(|&b| b == b'\n') {
        Some(pos) if !complete => &sample[..=pos],
        _ => sample,
    };

    let (encoding, lossy) = match std::str::from_utf8(sample) {
        Ok(_) => (TextEncoding::Utf8, false),
        Err(e) if !complete && e.error_len().is_none() => (TextEncoding::Utf8, false),
        Err(_) if TextEncoding::ShiftJis.decode_strict(sample).is_some() => {
            (TextEncoding::ShiftJis, false)
        }
        Err(_) => (TextEncoding::Utf8, true),
    };

    Probe {
        encoding,
        newline,
        lossy,
    }
}

/// Read at most `PROBE_LEN` bytes from the head of `path` and classify them.
pub fn probe_file(path: &Path) -> std::io::Result<Probe> {
    let mut sample = Vec::with_capacity(PROBE_LEN);
    let file = std::fs::File::open(path)?;
    // One extra byte tells a file of exactly PROBE_LEN bytes apart from a longer one.
    file.take(PROBE_LEN as u64 + 1).read_to_end(&mut sample)?;
    let complete = sample.len() <= PROBE_LEN;
    sample.truncate(PROBE_LEN);
    Ok(probe_sample(&sample, complete))
}

/// Split a raw line (as returned by `read_until(b'\n')`) into body and terminator.
pub fn split_newline(line: &[u8]) -> (&[u8], Option<Newline>) {
    if let Some(body) = line.strip_suffix(b"\r\n") {
        (body, Some(Newline::CrLf))
    } else if let Some(body) = line.strip_suffix(b"\n") {
        (body, Some(Newline::Lf))
    } else {
        (line, None)
    }
}

/// Per-line decoder that switches to the alternate encoding when the active
/// one rejects a line, and keeps using it for the lines that follow.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    active: TextEncoding,
    fallback_lines: u64,
}

impl LineDecoder {
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            active: encoding,
            fallback_lines: 0,
        }
    }

    pub fn active(&self) -> TextEncoding {
        self.active
    }

    pub fn fallback_lines(&self) -> u64 {
        self.fallback_lines
    }

    pub fn decode<'a>(&mut self, bytes: &'a [u8]) -> Cow<'a, str> {
        if let Some(text) = self.active.decode_strict(bytes) {
            return text;
        }
        let alt = self.active.alternate();
        tracing::warn!(
            from = self.active.name(),
            to = alt.name(),
            "line does not decode with the detected encoding; switching"
        );
        self.active = alt;
        self.fallback_lines += 1;
        alt.decode_lossy(bytes)
    }
}
