//! Line-by-line state machine deciding where `S` lines go.
//!
//! A B-axis change schedules a *pending* insertion; the decision is made one
//! line later, against the line the inserted `S` word would precede. That
//! line may already carry its own `S`, in which case nothing is inserted.
//!
//! ```text
//! X0Y0B13.1   <- B changes: pending(theta)
//! S7390       <- inserted here, decided while looking at the next line
//! G1X3
//! ```

use std::io::{self, Write};

use crate::parser::{ParsedLine, parse_line};
use crate::report::Stats;
use crate::rpm_model::RpmModel;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingInsert {
    theta_quant_deg: f64,
}

/// An `S` line to be written before the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub rpm: u32,
}

impl Insertion {
    /// Write `S<rpm>` followed by `newline`.
    pub fn write_to<W: Write>(&self, mut w: W, newline: &[u8]) -> io::Result<()> {
        write!(w, "S{}", self.rpm)?;
        w.write_all(newline)
    }
}

#[derive(Debug)]
pub struct Injector {
    model: RpmModel,
    stats: Stats,
    spindle_on: bool,
    last_theta_quant: Option<f64>,
    pending: Option<PendingInsert>,
}

impl Injector {
    pub fn new(model: RpmModel) -> Self {
        Self {
            model,
            stats: Stats::default(),
            spindle_on: false,
            last_theta_quant: None,
            pending: None,
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn into_stats(self) -> Stats {
        self.stats
    }

    pub fn spindle_on(&self) -> bool {
        self.spindle_on
    }

    /// Quantized theta still waiting for its next line, if any.
    pub fn pending_theta(&self) -> Option<f64> {
        self.pending.map(|p| p.theta_quant_deg)
    }

    pub fn process_line(&mut self, text: &str) -> Option<Insertion> {
        let parsed = parse_line(text);
        self.process_parsed(&parsed)
    }

    /// Feed one parsed line. Returns the `S` line to place before it, if any.
    pub fn process_parsed(&mut self, parsed: &ParsedLine) -> Option<Insertion> {
        self.stats.detect.total_lines += 1;
        let line_no = self.stats.detect.total_lines;
        tracing::trace!(line_no, ?parsed, spindle_on = self.spindle_on, "line");

        // Resolve the insertion scheduled by the previous line, using this one as "next".
        let inserted = self
            .pending
            .take()
            .and_then(|pending| self.resolve(pending, parsed, line_no));

        // Spindle state changes only after resolution: a stop here does not
        // cancel the decision just made, and a start here lets B below schedule.
        self.set_spindle_state(parsed.has_m03, parsed.has_m05);

        if self.spindle_on {
            self.stats.detect.spindle_on_lines += 1;

            // An explicit S in the program is as authoritative as an inserted one.
            if let Some(s) = parsed.s_rpm {
                self.model.update_last_s(s);
                self.stats.s_range.update(s);
            }

            if let Some(b) = parsed.b_deg {
                self.stats.detect.b_lines += 1;
                let theta_q = self.model.quantize_theta(self.model.theta_for_b(b));
                if self.last_theta_quant != Some(theta_q) {
                    self.pending = Some(PendingInsert {
                        theta_quant_deg: theta_q,
                    });
                }
                self.last_theta_quant = Some(theta_q);
            }
        }

        inserted
    }

    fn resolve(
        &mut self,
        pending: PendingInsert,
        next: &ParsedLine,
        line_no: u64,
    ) -> Option<Insertion> {
        if !self.spindle_on {
            // Unreachable with the current token set: pending is only scheduled
            // with the spindle on and is resolved before this line's stop
            // applies. Dropped without a counter.
            return None;
        }
        if next.s_rpm.is_some() {
            self.stats.changes.skipped_nextline_has_s += 1;
            tracing::debug!(line_no, "next line already has S; not inserting");
            return None;
        }

        let dec = self.model.compute_s_for_theta(pending.theta_quant_deg);
        if dec.theta_used_deg > pending.theta_quant_deg {
            self.stats.changes.theta_min_applied_count += 1;
        }
        if dec.clamped {
            self.stats.changes.clamped_count += 1;
        }

        if self.model.should_insert(dec.rpm_clamped) {
            self.stats.changes.inserted_s_lines += 1;
            self.stats.s_range.update(dec.rpm_clamped);
            self.model.update_last_s(dec.rpm_clamped);
            tracing::debug!(
                line_no,
                theta = pending.theta_quant_deg,
                rpm = dec.rpm_clamped,
                raw = dec.rpm_raw,
                clamped = dec.clamped,
                "insert S"
            );
            Some(Insertion {
                rpm: dec.rpm_clamped,
            })
        } else {
            self.stats.changes.skipped_deadband += 1;
            tracing::debug!(
                line_no,
                rpm = dec.rpm_clamped,
                last = ?self.model.last_s(),
                "within deadband; not inserting"
            );
            None
        }
    }

    fn set_spindle_state(&mut self, has_m03: bool, has_m05: bool) {
        // Both on one line: start, then stop.
        if has_m03 {
            self.spindle_on = true;
        }
        if has_m05 {
            self.spindle_on = false;
            self.model.reset_last_s();
        }
    }

    /// End of input: a pending insertion has no line left to precede.
    pub fn finalize(&mut self) {
        if self.pending.take().is_some() {
            self.stats.changes.pending_at_eof += 1;
            tracing::debug!("B change on the last line; nothing to insert before");
        }
    }
}
