//! blastn invocation, tabular parsing, and hit selection
//!
//! [`Blastn`] binds one built [`BlastDatabase`] and runs blocking searches
//! against it. Each call spawns one child process, captures both streams in
//! full, and turns stdout into validated [`BlastHit`] records. Parsing is
//! strict: a row that does not match the tabular schema fails the whole call
//! rather than being dropped, since malformed output means a tool version or
//! format mismatch.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;

use crate::db::BlastDatabase;
use crate::error::{BlastError, BlastResult};
use crate::fasta;
use crate::hit::BlastHit;
use crate::types::{BlastTask, SortKey};

/// Query material for one search
#[derive(Debug, Clone)]
pub enum QueryInput {
    /// Path to a (non-gzipped) FASTA file of query sequences
    File(PathBuf),
    /// Inline sequence, materialized as a single-record temporary FASTA
    /// file for the invocation and deleted afterward regardless of outcome
    Sequence { name: String, seq: String },
}

impl QueryInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        QueryInput::File(path.into())
    }

    pub fn sequence(name: impl Into<String>, seq: impl Into<String>) -> Self {
        QueryInput::Sequence {
            name: name.into(),
            seq: seq.into(),
        }
    }
}

/// Parameters of one alignment search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub task: BlastTask,
    /// E-value cutoff applied by the external tool; must be non-negative
    pub evalue: f64,
    /// Keep at most this many hits in ranked mode; `None` or `Some(0)` means
    /// unbounded
    pub max_hits: Option<usize>,
    /// Parallelism hint passed to `-num_threads`; this crate's own control
    /// flow stays single-threaded per call
    pub threads: usize,
    pub sort_by: SortKey,
    /// Reduce the output to the lowest-e-value hit per query id
    pub best_hit_per_query: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            task: BlastTask::default(),
            evalue: 1.0,
            max_hits: Some(10),
            threads: num_cpus::get(),
            sort_by: SortKey::default(),
            best_hit_per_query: false,
        }
    }
}

/// blastn wrapper bound to one subject database
#[derive(Debug)]
pub struct Blastn {
    db: BlastDatabase,
    blastn_exec: PathBuf,
    blastn_opt: Vec<String>,
}

impl Blastn {
    /// Bind a runner to a built database, resolving `blastn` on the search
    /// path
    pub fn new(db: BlastDatabase) -> Self {
        Self {
            db,
            blastn_exec: PathBuf::from("blastn"),
            blastn_opt: Vec::new(),
        }
    }

    /// Use a specific blastn executable instead of the search path
    pub fn with_executable(mut self, exec: impl Into<PathBuf>) -> Self {
        self.blastn_exec = exec.into();
        self
    }

    /// Extra raw command line options, inserted before the fixed flag set
    pub fn with_options<S: AsRef<str>>(mut self, options: &[S]) -> Self {
        self.blastn_opt = options.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn db(&self) -> &BlastDatabase {
        &self.db
    }

    /// Release the runner and its database files
    pub fn close(self) -> BlastResult<()> {
        self.db.close()
    }

    /// Whether the configured executable can be invoked
    pub fn is_available(&self) -> bool {
        crate::process::executable_available(&self.blastn_exec)
    }

    /// Version string reported by `blastn -version`
    pub fn version(&self) -> BlastResult<String> {
        let (output, command) =
            crate::process::run_captured(&self.blastn_exec, &[OsString::from("-version")])?;
        if !output.status.success() {
            return Err(BlastError::Tool {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Search a query against the bound database.
    ///
    /// Returns every hit the tool reported, reduced to one best hit per
    /// query when `options.best_hit_per_query` is set, otherwise ranked by
    /// `options.sort_by` and truncated to `options.max_hits`. An empty
    /// result after a clean tool exit means no alignment was found and is
    /// not an error.
    pub fn align(&self, query: &QueryInput, options: &SearchOptions) -> BlastResult<Vec<BlastHit>> {
        if !(options.evalue >= 0.0) {
            return Err(BlastError::InvalidInput(format!(
                "evalue cutoff {} out of range [>=0]",
                options.evalue
            )));
        }

        // Holds the temp file alive through the invocation; dropping it at
        // the end of this call deletes the file on success and failure alike.
        let mut query_guard = None;
        let query_path: PathBuf = match query {
            QueryInput::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(BlastError::InvalidInput(
                        "empty query file path".to_string(),
                    ));
                }
                path.clone()
            }
            QueryInput::Sequence { name, seq } => {
                if seq.is_empty() {
                    return Err(BlastError::InvalidInput(
                        "empty query sequence".to_string(),
                    ));
                }
                let name: &str = if name.is_empty() { "seq" } else { name.as_str() };
                let mut file = tempfile::Builder::new().suffix(".fa").tempfile()?;
                fasta::write_record(&mut file, name, seq)?;
                file.flush()?;
                let path = file.path().to_path_buf();
                debug!(path = ?path, "wrote query sequence to temporary fasta file");
                query_guard = Some(file);
                path
            }
        };

        let mut args: Vec<OsString> = self.blastn_opt.iter().map(OsString::from).collect();
        args.extend([
            OsString::from("-num_threads"),
            OsString::from(options.threads.to_string()),
            OsString::from("-task"),
            OsString::from(options.task.name()),
            OsString::from("-evalue"),
            OsString::from(options.evalue.to_string()),
            OsString::from("-outfmt"),
            OsString::from("6 std qseq"),
            OsString::from("-dust"),
            OsString::from("no"),
            OsString::from("-query"),
            query_path.into_os_string(),
            OsString::from("-db"),
            self.db.path().as_os_str().to_os_string(),
        ]);

        let (output, command) = crate::process::run_captured(&self.blastn_exec, &args)?;
        drop(query_guard);

        if !output.status.success() {
            return Err(BlastError::Tool {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            // Clean exit without output is the no-alignment-found condition
            debug!("no alignment found");
            return Ok(Vec::new());
        }

        let hits = parse_tabular_output(&stdout)?;
        debug!(hits = hits.len(), "parsed alignment hits");

        if options.best_hit_per_query {
            Ok(best_hit_per_query(hits))
        } else {
            Ok(rank_hits(hits, options.sort_by, options.max_hits))
        }
    }
}

/// Parse the full tabular stdout into hits, strictly
fn parse_tabular_output(stdout: &str) -> BlastResult<Vec<BlastHit>> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(BlastHit::from_tabular)
        .collect()
}

/// Keep the numerically smallest e-value per query id; ties keep the
/// first-encountered row since aligner output order is meaningful. One hit
/// per distinct query id, in the order query ids were first seen.
fn best_hit_per_query(hits: Vec<BlastHit>) -> Vec<BlastHit> {
    let mut best: IndexMap<String, BlastHit> = IndexMap::new();
    for hit in hits {
        match best.get_mut(&hit.query_id) {
            Some(current) => {
                if hit.evalue < current.evalue {
                    *current = hit;
                }
            }
            None => {
                best.insert(hit.query_id.clone(), hit);
            }
        }
    }
    best.into_values().collect()
}

/// Stable-sort by the requested key, then truncate to `max_hits` when it is
/// a positive bound
fn rank_hits(mut hits: Vec<BlastHit>, sort_by: SortKey, max_hits: Option<usize>) -> Vec<BlastHit> {
    match sort_by {
        SortKey::Evalue => hits.sort_by(|a, b| {
            a.evalue
                .partial_cmp(&b.evalue)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortKey::Identity => hits.sort_by(|a, b| {
            b.identity
                .partial_cmp(&a.identity)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortKey::BitScore => hits.sort_by(|a, b| {
            b.bit_score
                .partial_cmp(&a.bit_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }

    if let Some(limit) = max_hits {
        if limit > 0 && hits.len() > limit {
            hits.truncate(limit);
        }
    }
    hits
}
