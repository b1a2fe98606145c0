//! Typed wrapper around the NCBI BLAST+ nucleotide tools
//!
//! This crate shells out to `makeblastdb` to build a searchable subject
//! database from a reference FASTA file, runs `blastn` searches against it,
//! and parses the tabular output into validated, coordinate-normalized
//! [`BlastHit`] records, so pipelines get a typed interface instead of
//! hand-parsing CLI output.
//!
//! ```no_run
//! use blastwrap::{Blastn, BlastDatabase, DatabaseOptions, QueryInput, SearchOptions};
//!
//! # fn main() -> blastwrap::BlastResult<()> {
//! let db = BlastDatabase::build("ref_genome.fa".as_ref(), &DatabaseOptions::default())?;
//! let blastn = Blastn::new(db);
//! let hits = blastn.align(
//!     &QueryInput::sequence("probe", "ACGTACGTACGTACGTACGT"),
//!     &SearchOptions::default(),
//! )?;
//! for hit in &hits {
//!     println!("{}", hit);
//! }
//! # Ok(())
//! # }
//! ```

// Modules
pub mod blastn;
pub mod db;
pub mod error;
pub mod fasta;
pub mod hit;
pub mod types;

mod process;

// Re-exports for convenience
pub use blastn::{Blastn, QueryInput, SearchOptions};
pub use db::{BlastDatabase, DatabaseOptions};
pub use error::{BlastError, BlastResult};
pub use hit::{BlastHit, Orientation};
pub use types::{BlastTask, DbType, InputType, SortKey};
