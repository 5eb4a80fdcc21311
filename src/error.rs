//! Error handling.

use std::fmt::Debug;
use thiserror::Error;

/// Failure of a single directory parse.
///
/// Every variant is terminal for the parse call that produced it: a directory is either returned
/// whole or not at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The buffer is shorter than a TIFF header, or the byte-order marker or magic number is not
    /// recognized.
    #[error("Invalid TIFF header: {0}")]
    InvalidHeader(String),

    /// The directory at `offset` needs `needed` bytes but the buffer ends first.
    #[error("Truncated directory at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedDirectory {
        /// Byte offset of the directory structure being read.
        offset: u64,
        /// Number of bytes required from `offset`.
        needed: u64,
        /// Number of bytes actually available from `offset`.
        available: u64,
    },

    /// An out-of-line value of `tag` points outside the buffer.
    #[error("Value of tag {tag} at offset {offset} with length {length} exceeds file size {file_size}")]
    OffsetOutOfRange {
        /// Tag id owning the value.
        tag: u16,
        /// Absolute offset stored in the entry.
        offset: u64,
        /// Byte length implied by field type and count.
        length: u64,
        /// Total size of the buffer.
        file_size: u64,
    },

    /// The chain of IFD offsets loops back onto a directory already read.
    #[error("File contained a cycle in the list of IFDs at offset {0}")]
    CycleInOffsets(u64),

    /// The numeric values of one IFD add up to more than the reader accepts, typically because
    /// many entries point at the same large region.
    #[error("Numeric values of tag {tag} push the IFD past the limit of {limit} values")]
    TooManyValues {
        /// Tag id of the entry that crossed the limit.
        tag: u16,
        /// The number of numeric values allowed per IFD.
        limit: u64,
    },
}

/// Crate-specific result type for parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors surfaced to callers inspecting files.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InspectError {
    /// General error.
    #[error("General error: {0}")]
    General(String),

    /// IO Error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// The file is not a readable TIFF directory.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error while walking a directory tree.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}

/// Crate-specific result type.
pub type InspectResult<T> = std::result::Result<T, InspectError>;
