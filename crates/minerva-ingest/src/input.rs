//! Buffered reading of the input stream.
//!
//! No parsing happens here: the reader yields raw lines with their newline
//! terminators stripped, and the caller decides the processing order.

use std::io::BufRead;

use crate::error::Result;

/// Read all lines from the reader into memory.
///
/// Fails only on an I/O error of the underlying source.
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

/// Reverse the line order in place, for latest-first processing.
pub fn reverse_lines(lines: &mut [String]) {
    lines.reverse();
}
