//! Common types for the BLAST+ command-line contract

use serde::{Deserialize, Serialize};

use crate::error::BlastError;

/// Task mode selecting the blastn seeding/sensitivity heuristic
///
/// `Custom` is passed through to the external tool verbatim; if the tool
/// rejects it the failure surfaces as [`BlastError::Tool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlastTask {
    Blastn,
    BlastnShort,
    DcMegablast,
    Megablast,
    Rmblastn,
    Custom(String),
}

impl BlastTask {
    /// Value handed to `blastn -task`
    pub fn name(&self) -> &str {
        match self {
            BlastTask::Blastn => "blastn",
            BlastTask::BlastnShort => "blastn-short",
            BlastTask::DcMegablast => "dc-megablast",
            BlastTask::Megablast => "megablast",
            BlastTask::Rmblastn => "rmblastn",
            BlastTask::Custom(name) => name,
        }
    }
}

impl Default for BlastTask {
    fn default() -> Self {
        BlastTask::Megablast
    }
}

impl std::fmt::Display for BlastTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for BlastTask {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "blastn" => BlastTask::Blastn,
            "blastn-short" => BlastTask::BlastnShort,
            "dc-megablast" => BlastTask::DcMegablast,
            "megablast" => BlastTask::Megablast,
            "rmblastn" => BlastTask::Rmblastn,
            other => BlastTask::Custom(other.to_string()),
        })
    }
}

/// Molecule type of the subject database (`makeblastdb -dbtype`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbType {
    #[default]
    Nucleotide,
    Protein,
}

impl DbType {
    pub fn name(&self) -> &'static str {
        match self {
            DbType::Nucleotide => "nucl",
            DbType::Protein => "prot",
        }
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Format of the reference input handed to makeblastdb (`-input_type`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    #[default]
    Fasta,
    Asn1Bin,
    Asn1Txt,
    Blastdb,
}

impl InputType {
    pub fn name(&self) -> &'static str {
        match self {
            InputType::Fasta => "fasta",
            InputType::Asn1Bin => "asn1_bin",
            InputType::Asn1Txt => "asn1_txt",
            InputType::Blastdb => "blastdb",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Key used to rank hits when best-hit reduction is not requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Ascending; lower e-values are more significant
    #[default]
    Evalue,
    /// Descending percent identity
    Identity,
    /// Descending bit score
    BitScore,
}

impl std::str::FromStr for SortKey {
    type Err = BlastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evalue" | "e-value" => Ok(SortKey::Evalue),
            "identity" => Ok(SortKey::Identity),
            "bscore" | "bitscore" | "bit-score" => Ok(SortKey::BitScore),
            _ => Err(BlastError::InvalidInput(format!("unknown sort key: {}", s))),
        }
    }
}
