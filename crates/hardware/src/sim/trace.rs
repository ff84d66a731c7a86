//! Trace loading.
//!
//! A trace is a JSON array of [`DecodedUop`] records in program order. A record
//! without `neip` falls through to `eip + size`. Every record is validated before
//! the trace is returned, so a malformed uop is reported with its position
//! instead of reaching the pipeline.

use std::fs;
use std::path::Path;

use crate::common::error::SimError;
use crate::core::uop::DecodedUop;

/// Parses and validates a JSON trace.
///
/// # Errors
///
/// Returns [`SimError::Trace`] if the text is not a JSON array of uops or a uop
/// fails [`DecodedUop::validate`].
pub fn parse_trace(json: &str) -> Result<Vec<DecodedUop>, SimError> {
    let uops: Vec<DecodedUop> =
        serde_json::from_str(json).map_err(|e| SimError::Trace(format!("invalid trace: {e}")))?;
    for (n, uop) in uops.iter().enumerate() {
        uop.validate()
            .map_err(|e| SimError::Trace(format!("uop {n}: {e}")))?;
    }
    Ok(uops)
}

/// Reads and validates a JSON trace file.
///
/// # Errors
///
/// Returns [`SimError::Trace`] if the file cannot be read or fails
/// [`parse_trace`].
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<DecodedUop>, SimError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| SimError::Trace(format!("cannot read {}: {e}", path.display())))?;
    parse_trace(&text)
}
