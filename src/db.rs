//! Subject database construction via makeblastdb
//!
//! A [`BlastDatabase`] owns the temporary directory its index files live in.
//! Dropping the handle removes every artifact; a failed build cleans up
//! before the error reaches the caller.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::TempDir;
use tracing::debug;

use crate::error::{BlastError, BlastResult};
use crate::fasta;
use crate::types::{DbType, InputType};

/// Configuration for the database build
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    /// Path or bare name of the makeblastdb executable
    pub makeblastdb_exec: PathBuf,
    /// Extra command line options, inserted before the fixed flag set
    pub extra: Vec<String>,
    pub dbtype: DbType,
    pub input_type: InputType,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            makeblastdb_exec: PathBuf::from("makeblastdb"),
            extra: Vec::new(),
            dbtype: DbType::Nucleotide,
            input_type: InputType::Fasta,
        }
    }
}

/// Handle to a built subject database
///
/// The basename path under the owned temporary directory is what
/// `blastn -db` consumes to locate the index files.
#[derive(Debug)]
pub struct BlastDatabase {
    dir: TempDir,
    db_path: PathBuf,
    basename: String,
    ref_path: PathBuf,
}

impl BlastDatabase {
    /// Build a database from a reference FASTA file.
    ///
    /// Runs `makeblastdb {extra} -dbtype {t} -input_type {t} -in {ref} -out
    /// {basename}` inside a fresh private temporary directory. The index
    /// basename is the reference file name with its directory and everything
    /// from the first `.` stripped. Success requires exit code 0 and
    /// non-empty stdout; on any failure the temporary directory and every
    /// partial index file in it are removed before the error propagates.
    pub fn build(ref_path: &Path, options: &DatabaseOptions) -> BlastResult<Self> {
        let file_name = ref_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BlastError::InvalidInput(format!("reference path {:?} has no file name", ref_path))
            })?;
        let basename = file_name
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string();
        if basename.is_empty() {
            return Err(BlastError::InvalidInput(format!(
                "reference file name {:?} has no usable stem",
                file_name
            )));
        }

        // Dropped on every early return below, taking partial artifacts with it
        let dir = TempDir::new()?;
        let db_path = dir.path().join(&basename);

        let mut args: Vec<OsString> = options.extra.iter().map(OsString::from).collect();
        args.extend([
            OsString::from("-dbtype"),
            OsString::from(options.dbtype.name()),
            OsString::from("-input_type"),
            OsString::from(options.input_type.name()),
            OsString::from("-in"),
            ref_path.as_os_str().to_os_string(),
            OsString::from("-out"),
            db_path.clone().into_os_string(),
        ]);

        let (output, command) = crate::process::run_captured(&options.makeblastdb_exec, &args)?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(BlastError::Tool { command, stderr });
        }
        if output.stdout.is_empty() {
            return Err(BlastError::Tool {
                command,
                stderr: format!("no data received from standard output\n{}", stderr),
            });
        }

        debug!(basename = %basename, dir = ?dir.path(), "blast database built");
        Ok(BlastDatabase {
            dir,
            db_path,
            basename,
            ref_path: ref_path.to_path_buf(),
        })
    }

    /// Basename path handed to `blastn -db`
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Derived index basename
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Reference FASTA the database was built from
    pub fn ref_path(&self) -> &Path {
        &self.ref_path
    }

    /// Lengths of the reference sequences, in file order
    pub fn sequence_lengths(&self) -> BlastResult<IndexMap<String, usize>> {
        fasta::sequence_lengths(&self.ref_path)
    }

    /// A 0-based half-open slice of one reference sequence
    pub fn reference_slice(&self, id: &str, start: usize, end: Option<usize>) -> BlastResult<String> {
        fasta::extract_region(&self.ref_path, id, start, end)
    }

    /// Remove the index files now, reporting any filesystem error.
    ///
    /// Dropping the handle performs the same cleanup silently.
    pub fn close(self) -> BlastResult<()> {
        debug!(basename = %self.basename, "removing blast database files");
        let BlastDatabase { dir, .. } = self;
        dir.close()?;
        Ok(())
    }
}
