//! Report boundary: renderers for a finished [`SessionReport`].
//!
//! The core's obligation ends at supplying ordered comparison records;
//! these helpers turn them into a human-readable table or JSON for
//! machine consumers.

use std::io::{self, Write};

use crate::error::Result;
use crate::session::{SessionOutcome, SessionReport, Verdict};

/// Render a plain-text report table.
///
/// Columns match the record fields: parameter number, expected, received,
/// signed percent error, and verdict, in generation order, followed by a
/// session summary.
pub fn write_text_report<W: Write>(out: &mut W, report: &SessionReport) -> io::Result<()> {
    writeln!(out, "Link Verification Report")?;
    writeln!(out, "========================")?;
    writeln!(out)?;
    writeln!(
        out,
        "{:>11}  {:>8}  {:>8}  {:>9}  {:>6}",
        "Parameter #", "Expected", "Received", "Error (%)", "Status"
    )?;

    for record in &report.records {
        let status = match record.verdict {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        };
        writeln!(
            out,
            "{:>11}  {:>8}  {:>8}  {:>9.2}  {:>6}",
            record.field, record.expected, record.received, record.percent_error, status
        )?;
    }

    let failed = report
        .records
        .iter()
        .filter(|r| r.verdict == Verdict::Fail)
        .count();

    writeln!(out)?;
    writeln!(
        out,
        "Frames sent: {}  Payloads received: {}  Wait timeouts: {}",
        report.frames_sent, report.payloads_received, report.wait_timeouts
    )?;
    writeln!(
        out,
        "Records: {}  Failed: {}  Outcome: {}",
        report.records.len(),
        failed,
        match report.outcome {
            SessionOutcome::Completed => "completed",
            SessionOutcome::ReceiverStopped => "receiver stopped",
        }
    )?;
    Ok(())
}

/// Serialize a report to pretty-printed JSON.
pub fn to_json(report: &SessionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report).map_err(std::io::Error::other)?)
}
