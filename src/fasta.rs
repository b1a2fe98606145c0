//! FASTA plumbing for reference interrogation and query materialization

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use needletail::parse_fastx_file;

use crate::error::{BlastError, BlastResult};

/// First whitespace-delimited token of a FASTA header, i.e. the record id
fn header_id(raw: &[u8]) -> String {
    let id = raw
        .split(|&b| b == b' ' || b == b'\t')
        .next()
        .unwrap_or(raw);
    String::from_utf8_lossy(id).into_owned()
}

/// Lengths of every record in a FASTA file, in file order
pub fn sequence_lengths(path: &Path) -> BlastResult<IndexMap<String, usize>> {
    let mut reader = parse_fastx_file(path)
        .map_err(|e| BlastError::Parse(format!("failed to open FASTA {:?}: {}", path, e)))?;

    let mut lengths = IndexMap::new();
    while let Some(record) = reader.next() {
        let record =
            record.map_err(|e| BlastError::Parse(format!("invalid FASTA record: {}", e)))?;
        lengths.insert(header_id(record.id()), record.num_bases());
    }
    Ok(lengths)
}

/// Extract a 0-based half-open region of one record's sequence.
///
/// `end = None` reads to the end of the record. Bounds are clamped to the
/// record length, so an oversized range returns the available suffix rather
/// than failing.
pub fn extract_region(
    path: &Path,
    id: &str,
    start: usize,
    end: Option<usize>,
) -> BlastResult<String> {
    let mut reader = parse_fastx_file(path)
        .map_err(|e| BlastError::Parse(format!("failed to open FASTA {:?}: {}", path, e)))?;

    while let Some(record) = reader.next() {
        let record =
            record.map_err(|e| BlastError::Parse(format!("invalid FASTA record: {}", e)))?;
        if header_id(record.id()) != id {
            continue;
        }
        let seq = record.seq();
        let end = end.unwrap_or(seq.len()).min(seq.len());
        let start = start.min(end);
        return Ok(String::from_utf8_lossy(&seq[start..end]).into_owned());
    }

    Err(BlastError::NotFound(format!(
        "reference sequence {:?} in {:?}",
        id, path
    )))
}

/// Write one FASTA record
pub fn write_record<W: Write>(writer: &mut W, id: &str, seq: &str) -> BlastResult<()> {
    writeln!(writer, ">{}", id)?;
    writeln!(writer, "{}", seq)?;
    Ok(())
}
