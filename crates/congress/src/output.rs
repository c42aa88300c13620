//! Rendering of command results.
//!
//! Everything is printed as pretty JSON on stdout; status lines go to
//! stderr so stdout stays machine-readable.

use std::io::Write;

use serde::Serialize;

use crate::error::CliError;

/// Print `value` as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Print `value` as one compact JSON line, flushing immediately.
pub fn print_json_line<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Confirmation for operations with nothing to print.
pub fn done(message: &str) {
    eprintln!("{message}");
}
