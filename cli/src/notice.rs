//! Engine diagnostic printer
//!
//! Installed as the session's diagnostic handler. Informational messages
//! (severity 10) go to stdout; plan and statistics notices keep their own
//! layout. Anything above severity 10 is printed with its message header and
//! marks the operation as failed.

use std::io::{self, Write};
use std::sync::Arc;

use crate::session::{Diagnostic, DiagnosticHandler};

const INFORMATIONAL: u8 = 10;

/// Showplan, statistics io/time and similar multi-line notices
pub fn is_plan_notice(number: i32) -> bool {
    matches!(number, 3612..=3615 | 6201..=6299 | 10201..=10299)
}

/// Print one diagnostic; returns `true` when the operation must fail
pub fn write_diagnostic(out: &mut dyn Write, diag: &Diagnostic) -> io::Result<bool> {
    if diag.severity == INFORMATIONAL {
        if is_plan_notice(diag.number) {
            write!(out, "{}", diag.text)?;
        } else {
            writeln!(out, "{}", diag.text.trim_end())?;
        }
    } else if diag.severity > INFORMATIONAL {
        writeln!(out, "Msg {}, Level {}:", diag.number, diag.severity)?;
        write!(out, "{}", diag.text)?;
        if !diag.text.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(diag.severity > INFORMATIONAL)
}

/// Handler printing to stdout
pub fn stdout_handler() -> DiagnosticHandler {
    Arc::new(|diag: &Diagnostic| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match write_diagnostic(&mut out, diag) {
            Ok(fail) => fail,
            Err(e) => {
                log::warn!("[NOTICE] Failed to print diagnostic {}: {}", diag.number, e);
                diag.severity > INFORMATIONAL
            }
        }
    })
}
