//! Validated, coordinate-normalized BLAST hit records
//!
//! One [`BlastHit`] is built per tabular output line. Construction is
//! fail-fast: every field bound is checked eagerly and no partially-valid
//! record is ever observable. Records are plain immutable values once built.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{BlastError, BlastResult};

/// Process-wide hit id source. Monotonic and never reused; ordering across
/// threads is not meaningful beyond uniqueness.
static NEXT_HIT_ID: AtomicU64 = AtomicU64::new(0);

fn next_hit_id() -> u64 {
    NEXT_HIT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Reading direction of an aligned span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    Reverse,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Forward => write!(f, "+"),
            Orientation::Reverse => write!(f, "-"),
        }
    }
}

/// One alignment hit between a query and a subject sequence
///
/// Coordinates are stored 0-based half-open. blastn reports 1-based,
/// orientation-dependent coordinates where start > end signals the reverse
/// strand; the conversion is asymmetric per strand and matches the tool's own
/// half-open convention (see [`BlastHit::new`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlastHit {
    /// Process-unique sequence number, for display and debugging only
    pub id: u64,
    pub query_id: String,
    pub subject_id: String,
    /// Percent identity over the aligned span, in [0, 100]
    pub identity: f64,
    /// Alignment length, >= 1
    pub length: u64,
    pub mismatches: u64,
    pub gaps: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub query_orient: Orientation,
    pub subject_start: u64,
    pub subject_end: u64,
    pub subject_orient: Orientation,
    pub evalue: f64,
    pub bit_score: f64,
    /// Aligned query characters, gap characters included; present only when
    /// the `qseq` output column was requested
    pub query_seq: Option<String>,
}

/// Normalize one raw 1-based coordinate pair to a 0-based half-open span.
///
/// Forward (start < end): the start moves to 0-based, the end is already
/// exclusive. Reverse (start >= end): the start is already the outer
/// boundary, the end moves. Asymmetric on purpose; do not "simplify" to a
/// symmetric min-1 rule.
fn normalize_span(raw_start: i64, raw_end: i64) -> (i64, i64, Orientation) {
    if raw_start < raw_end {
        (raw_start - 1, raw_end, Orientation::Forward)
    } else {
        (raw_start, raw_end - 1, Orientation::Reverse)
    }
}

impl BlastHit {
    /// Build a hit from the raw tabular fields.
    ///
    /// Coordinates are the aligner's raw 1-based values; counts and length are
    /// accepted signed so that negative input is rejected here as a
    /// [`BlastError::Validation`] rather than upstream as a parse failure.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query_id: &str,
        subject_id: &str,
        identity: f64,
        length: i64,
        mismatches: i64,
        gaps: i64,
        query_start: i64,
        query_end: i64,
        subject_start: i64,
        subject_end: i64,
        evalue: f64,
        bit_score: f64,
        query_seq: Option<&str>,
    ) -> BlastResult<Self> {
        for (name, value) in [
            ("query start", query_start),
            ("query end", query_end),
            ("subject start", subject_start),
            ("subject end", subject_end),
        ] {
            if value < 0 {
                return Err(BlastError::Validation(format!(
                    "raw {} {} out of range [>=0]",
                    name, value
                )));
            }
        }

        let (q_start, q_end, query_orient) = normalize_span(query_start, query_end);
        let (s_start, s_end, subject_orient) = normalize_span(subject_start, subject_end);

        if !(0.0..=100.0).contains(&identity) {
            return Err(BlastError::Validation(format!(
                "identity {} out of range [0:100]",
                identity
            )));
        }
        if length < 1 {
            return Err(BlastError::Validation(format!(
                "alignment length {} out of range [>=1]",
                length
            )));
        }
        if mismatches < 0 {
            return Err(BlastError::Validation(format!(
                "mismatch count {} out of range [>=0]",
                mismatches
            )));
        }
        if gaps < 0 {
            return Err(BlastError::Validation(format!(
                "gap count {} out of range [>=0]",
                gaps
            )));
        }
        for (name, value) in [
            ("query start", q_start),
            ("query end", q_end),
            ("subject start", s_start),
            ("subject end", s_end),
        ] {
            if value < 0 {
                return Err(BlastError::Validation(format!(
                    "normalized {} {} out of range [>=0]",
                    name, value
                )));
            }
        }
        if !(evalue >= 0.0) {
            return Err(BlastError::Validation(format!(
                "evalue {} out of range [>=0]",
                evalue
            )));
        }
        if !(bit_score >= 0.0) {
            return Err(BlastError::Validation(format!(
                "bit score {} out of range [>=0]",
                bit_score
            )));
        }

        Ok(BlastHit {
            id: next_hit_id(),
            query_id: query_id.to_string(),
            subject_id: subject_id.to_string(),
            identity,
            length: length as u64,
            mismatches: mismatches as u64,
            gaps: gaps as u64,
            query_start: q_start as u64,
            query_end: q_end as u64,
            query_orient,
            subject_start: s_start as u64,
            subject_end: s_end as u64,
            subject_orient,
            evalue,
            bit_score,
            query_seq: query_seq.map(|s| s.to_string()),
        })
    }

    /// Parse one line of `-outfmt "6 std qseq"` output.
    ///
    /// The line must split into exactly 12 or 13 whitespace-separated fields
    /// (13 when the aligned query sequence column is present). Anything else
    /// is a format mismatch and fails with [`BlastError::Parse`]; a field that
    /// violates its bound fails with [`BlastError::Validation`].
    pub fn from_tabular(line: &str) -> BlastResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 12 && fields.len() != 13 {
            return Err(BlastError::Parse(format!(
                "expected 12 or 13 tabular fields, found {}: {:?}",
                fields.len(),
                line
            )));
        }

        Self::new(
            fields[0],
            fields[1],
            parse_field::<f64>(fields[2], "identity")?,
            parse_field::<i64>(fields[3], "alignment length")?,
            parse_field::<i64>(fields[4], "mismatch count")?,
            parse_field::<i64>(fields[5], "gap count")?,
            parse_field::<i64>(fields[6], "query start")?,
            parse_field::<i64>(fields[7], "query end")?,
            parse_field::<i64>(fields[8], "subject start")?,
            parse_field::<i64>(fields[9], "subject end")?,
            parse_field::<f64>(fields[10], "evalue")?,
            parse_field::<f64>(fields[11], "bit score")?,
            fields.get(12).copied(),
        )
    }

    /// Ordered key/value summary of the hit.
    ///
    /// The minimal view carries the query and subject spans; `full` appends
    /// the score and count columns. Key order is stable and part of the
    /// contract.
    pub fn report(&self, full: bool) -> IndexMap<&'static str, String> {
        let mut report = IndexMap::new();
        report.insert(
            "Query",
            format!(
                "{}:{}-{}({})",
                self.query_id, self.query_start, self.query_end, self.query_orient
            ),
        );
        report.insert(
            "Subject",
            format!(
                "{}:{}-{}({})",
                self.subject_id, self.subject_start, self.subject_end, self.subject_orient
            ),
        );

        if full {
            report.insert("Identity", self.identity.to_string());
            report.insert("Evalue", self.evalue.to_string());
            report.insert("Bit Score", self.bit_score.to_string());
            report.insert("Hit length", self.length.to_string());
            report.insert("Number of gap", self.gaps.to_string());
            report.insert("Number of mismatch", self.mismatches.to_string());
        }

        report
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, column: &str) -> BlastResult<T> {
    raw.parse().map_err(|_| {
        BlastError::Parse(format!("invalid {} field: {:?}", column, raw))
    })
}

impl std::fmt::Display for BlastHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "HIT {}", self.id)?;
        writeln!(
            f,
            "\tQuery\t{}:{}-{}({})",
            self.query_id, self.query_start, self.query_end, self.query_orient
        )?;
        writeln!(
            f,
            "\tSubject\t{}:{}-{}({})",
            self.subject_id, self.subject_start, self.subject_end, self.subject_orient
        )?;
        writeln!(
            f,
            "\tLength: {}\tIdentity: {}%\tEvalue: {}\tBit score: {}",
            self.length, self.identity, self.evalue, self.bit_score
        )?;
        if let Some(seq) = &self.query_seq {
            writeln!(f, "\tAligned query seq: {}", seq)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit_with_coords(q_start: i64, q_end: i64, s_start: i64, s_end: i64) -> BlastResult<BlastHit> {
        BlastHit::new(
            "query", "subject", 98.5, 10, 0, 0, q_start, q_end, s_start, s_end, 1e-10, 42.0, None,
        )
    }

    // ===== Coordinate normalization =====

    #[test]
    fn test_forward_normalization() {
        let hit = hit_with_coords(10, 20, 1, 11).unwrap();
        assert_eq!(hit.query_orient, Orientation::Forward);
        assert_eq!(hit.query_start, 9);
        assert_eq!(hit.query_end, 20);
        assert_eq!(hit.subject_start, 0);
        assert_eq!(hit.subject_end, 11);
    }

    #[test]
    fn test_reverse_normalization() {
        let hit = hit_with_coords(20, 10, 30, 21).unwrap();
        assert_eq!(hit.query_orient, Orientation::Reverse);
        assert_eq!(hit.query_start, 20);
        assert_eq!(hit.query_end, 9);
        assert_eq!(hit.subject_orient, Orientation::Reverse);
        assert_eq!(hit.subject_start, 30);
        assert_eq!(hit.subject_end, 20);
    }

    #[test]
    fn test_equal_raw_coords_are_reverse() {
        let hit = hit_with_coords(5, 5, 1, 2).unwrap();
        assert_eq!(hit.query_orient, Orientation::Reverse);
        assert_eq!(hit.query_start, 5);
        assert_eq!(hit.query_end, 4);
    }

    #[test]
    fn test_forward_start_zero_fails_validation() {
        // raw (0, 5) is forward, so the stored start would be -1
        let result = hit_with_coords(0, 5, 1, 10);
        assert!(matches!(result, Err(BlastError::Validation(_))));
    }

    // ===== Field validation =====

    #[test]
    fn test_identity_bounds() {
        for identity in [-0.1, 100.1, f64::NAN] {
            let result = BlastHit::new(
                "q", "s", identity, 10, 0, 0, 1, 10, 1, 10, 0.0, 0.0, None,
            );
            assert!(matches!(result, Err(BlastError::Validation(_))));
        }
        assert!(BlastHit::new("q", "s", 0.0, 10, 0, 0, 1, 10, 1, 10, 0.0, 0.0, None).is_ok());
        assert!(BlastHit::new("q", "s", 100.0, 10, 0, 0, 1, 10, 1, 10, 0.0, 0.0, None).is_ok());
    }

    #[test]
    fn test_length_and_count_bounds() {
        let length_zero = BlastHit::new("q", "s", 50.0, 0, 0, 0, 1, 10, 1, 10, 0.0, 0.0, None);
        assert!(matches!(length_zero, Err(BlastError::Validation(_))));

        let negative_mis = BlastHit::new("q", "s", 50.0, 10, -1, 0, 1, 10, 1, 10, 0.0, 0.0, None);
        assert!(matches!(negative_mis, Err(BlastError::Validation(_))));

        let negative_gap = BlastHit::new("q", "s", 50.0, 10, 0, -1, 1, 10, 1, 10, 0.0, 0.0, None);
        assert!(matches!(negative_gap, Err(BlastError::Validation(_))));
    }

    #[test]
    fn test_score_bounds() {
        let negative_evalue =
            BlastHit::new("q", "s", 50.0, 10, 0, 0, 1, 10, 1, 10, -1e-3, 0.0, None);
        assert!(matches!(negative_evalue, Err(BlastError::Validation(_))));

        let negative_bscore =
            BlastHit::new("q", "s", 50.0, 10, 0, 0, 1, 10, 1, 10, 0.0, -0.5, None);
        assert!(matches!(negative_bscore, Err(BlastError::Validation(_))));

        let nan_evalue =
            BlastHit::new("q", "s", 50.0, 10, 0, 0, 1, 10, 1, 10, f64::NAN, 0.0, None);
        assert!(matches!(nan_evalue, Err(BlastError::Validation(_))));
    }

    // ===== Ids =====

    #[test]
    fn test_ids_unique_and_increasing() {
        let first = hit_with_coords(1, 10, 1, 10).unwrap();
        let second = hit_with_coords(1, 10, 1, 10).unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
    }

    // ===== Tabular parsing =====

    #[test]
    fn test_from_tabular_13_fields() {
        let line = "q1\ts1\t98.50\t100\t1\t0\t10\t109\t200\t101\t1e-50\t180.3\tACGT-ACGT";
        let hit = BlastHit::from_tabular(line).unwrap();
        assert_eq!(hit.query_id, "q1");
        assert_eq!(hit.subject_id, "s1");
        assert_eq!(hit.identity, 98.5);
        assert_eq!(hit.length, 100);
        assert_eq!(hit.mismatches, 1);
        assert_eq!(hit.gaps, 0);
        assert_eq!(hit.query_orient, Orientation::Forward);
        assert_eq!((hit.query_start, hit.query_end), (9, 109));
        assert_eq!(hit.subject_orient, Orientation::Reverse);
        assert_eq!((hit.subject_start, hit.subject_end), (200, 100));
        assert_eq!(hit.evalue, 1e-50);
        assert_eq!(hit.bit_score, 180.3);
        assert_eq!(hit.query_seq.as_deref(), Some("ACGT-ACGT"));
    }

    #[test]
    fn test_from_tabular_12_fields() {
        let line = "q1 s1 100.0 10 0 0 1 10 1 10 0.001 20.1";
        let hit = BlastHit::from_tabular(line).unwrap();
        assert_eq!(hit.query_seq, None);
    }

    #[test]
    fn test_from_tabular_wrong_field_count() {
        let result = BlastHit::from_tabular("q1 s1 100.0 10 0 0 1 10 1 10 0.001");
        assert!(matches!(result, Err(BlastError::Parse(_))));

        let result = BlastHit::from_tabular("q1 s1 100.0 10 0 0 1 10 1 10 0.001 20.1 ACGT extra");
        assert!(matches!(result, Err(BlastError::Parse(_))));
    }

    #[test]
    fn test_from_tabular_non_numeric_field() {
        let result = BlastHit::from_tabular("q1 s1 high 10 0 0 1 10 1 10 0.001 20.1");
        assert!(matches!(result, Err(BlastError::Parse(_))));
    }

    // ===== Report =====

    #[test]
    fn test_report_minimal() {
        let hit = hit_with_coords(10, 20, 20, 10).unwrap();
        let report = hit.report(false);
        let keys: Vec<&str> = report.keys().copied().collect();
        assert_eq!(keys, vec!["Query", "Subject"]);
        assert_eq!(report["Query"], "query:9-20(+)");
        assert_eq!(report["Subject"], "subject:20-9(-)");
    }

    #[test]
    fn test_report_full_key_order() {
        let hit = hit_with_coords(10, 20, 1, 11).unwrap();
        let report = hit.report(true);
        let keys: Vec<&str> = report.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                "Query",
                "Subject",
                "Identity",
                "Evalue",
                "Bit Score",
                "Hit length",
                "Number of gap",
                "Number of mismatch",
            ]
        );
    }

    #[test]
    fn test_display_includes_spans() {
        let hit = BlastHit::new(
            "q1", "s1", 97.0, 12, 1, 0, 10, 21, 5, 16, 1e-8, 33.2,
            Some("ACGTACGTACGT"),
        )
        .unwrap();
        let rendered = hit.to_string();
        assert!(rendered.contains(&format!("HIT {}", hit.id)));
        assert!(rendered.contains("q1:9-21(+)"));
        assert!(rendered.contains("s1:4-16(+)"));
        assert!(rendered.contains("Aligned query seq: ACGTACGTACGT"));
    }

    // ===== Properties =====

    #[quickcheck_macros::quickcheck]
    fn prop_construction_never_panics(
        identity: f64,
        length: i64,
        q_start: i64,
        q_end: i64,
        evalue: f64,
    ) -> bool {
        let _ = BlastHit::new(
            "q", "s", identity, length, 0, 0, q_start, q_end, 1, 10, evalue, 0.0, None,
        );
        true
    }

    #[quickcheck_macros::quickcheck]
    fn prop_valid_hit_satisfies_bounds(q_start: i64, q_end: i64) -> bool {
        match hit_with_coords(q_start, q_end, 1, 10) {
            Ok(hit) => {
                (0.0..=100.0).contains(&hit.identity)
                    && hit.length >= 1
                    && hit.evalue >= 0.0
                    && hit.bit_score >= 0.0
            }
            Err(BlastError::Validation(_)) => true,
            Err(_) => false,
        }
    }
}
