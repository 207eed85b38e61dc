//! Error types for the extraction engine
//!
//! Every operation either returns a fully populated record or one of these
//! typed failures. None of them is retried internally.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all anisource operations
///
/// Implements Display for human-readable messages and Serialize
/// so failures can be embedded in JSON responses.
#[derive(Error, Debug)]
pub enum AnisourceError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// An expected anchor node or pattern is absent from the document
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// The obfuscated token window could not be decoded
    #[error("Failed to decode manifest tokens: {0}")]
    DecodeError(String),

    /// The positional node lists of a ranking page disagree in length
    #[error(
        "Ranking rows misaligned: {ranks} ranks, {images} images, {titles} titles, {infos} info blocks, {scores} scores"
    )]
    AlignmentMismatch {
        ranks: usize,
        images: usize,
        titles: usize,
        infos: usize,
        scores: usize,
    },

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnisourceError {
    /// Whether the failure came from the network side
    ///
    /// These are the only failures a caller can reasonably retry; every other
    /// variant means the source markup contract has drifted.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AnisourceError::Upstream(_) | AnisourceError::UpstreamStatus { .. }
        )
    }
}

impl Serialize for AnisourceError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for anisource operations
pub type Result<T> = std::result::Result<T, AnisourceError>;
