//! Token scanner for a single EIA/ISO program line.
//!
//! Only four things matter to the rewriter: spindle start (`M3`/`M03`),
//! spindle stop (`M5`/`M05`), the B-axis angle and an explicit `S` word.
//! Everything else on the line is ignored. Words may be glued together
//! without separators, e.g. `X1.0Y-11.8251B10.8411C0.`.

use std::borrow::Cow;

/// Tokens found on one line. Absent numbers are `None`, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedLine {
    pub has_m03: bool,
    pub has_m05: bool,
    pub b_deg: Option<f64>,
    pub s_rpm: Option<u32>,
}

/// Remove `( ... )` comment spans.
///
/// `(` raises the comment depth, `)` lowers it when it is
/// above zero, and both are dropped along with anything at depth > 0.
pub fn strip_paren_comments(line: &str) -> Cow<'_, str> {
    if !line.contains(['(', ')']) {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len());
    let mut depth = 0usize;
    for ch in line.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    Cow::Owned(out)
}

pub fn parse_line(line: &str) -> ParsedLine {
    let core = strip_paren_comments(line);
    let bytes = core.as_bytes();

    ParsedLine {
        has_m03: has_m_code(bytes, b'3'),
        has_m05: has_m_code(bytes, b'5'),
        b_deg: first_b_angle(bytes),
        s_rpm: first_s_speed(bytes),
    }
}

/// `M<digit>` or `M0<digit>`, not followed by another digit.
fn has_m_code(bytes: &[u8], digit: u8) -> bool {
    let at = |i: usize| bytes.get(i).copied();
    (0..bytes.len()).filter(|&i| bytes[i] == b'M').any(|i| {
        let end = if at(i + 1) == Some(digit) {
            i + 2
        } else if at(i + 1) == Some(b'0') && at(i + 2) == Some(digit) {
            i + 3
        } else {
            return false;
        };
        !at(end).is_some_and(|b| b.is_ascii_digit())
    })
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

/// Length of a signed decimal literal starting at `from`:
/// `[+-]?(\d+(\.\d*)?|\.\d+)`. Zero when there is none.
fn decimal_len(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_digits = digit_run(bytes, i);
    if int_digits > 0 {
        i += int_digits;
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            i += digit_run(bytes, i);
        }
        return i - from;
    }
    if bytes.get(i) == Some(&b'.') {
        let frac_digits = digit_run(bytes, i + 1);
        if frac_digits > 0 {
            return i + 1 + frac_digits - from;
        }
    }
    0
}

fn first_b_angle(bytes: &[u8]) -> Option<f64> {
    let (start, len) = (0..bytes.len())
        .filter(|&i| bytes[i] == b'B')
        .map(|i| (i + 1, decimal_len(bytes, i + 1)))
        .find(|&(_, len)| len > 0)?;
    std::str::from_utf8(&bytes[start..start + len])
        .ok()?
        .parse::<f64>()
        .ok()
}

fn first_s_speed(bytes: &[u8]) -> Option<u32> {
    let (start, len) = (0..bytes.len())
        .filter(|&i| bytes[i] == b'S')
        .map(|i| (i + 1, digit_run(bytes, i + 1)))
        .find(|&(_, len)| len > 0)?;
    // An out-of-range digit run counts as absent.
    std::str::from_utf8(&bytes[start..start + len])
        .ok()?
        .parse::<u32>()
        .ok()
}
