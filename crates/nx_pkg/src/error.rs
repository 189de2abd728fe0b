//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    UTF8Error(#[from] std::string::FromUtf8Error),

    /// Transparent wrapper for [`lz4_flex::block::CompressError`]
    #[error(transparent)]
    CompressError(#[from] lz4_flex::block::CompressError),

    /// Transparent wrapper for [`lz4_flex::block::DecompressError`]
    #[error(transparent)]
    DecompressError(#[from] lz4_flex::block::DecompressError),

    /// Transparent wrapper for [`serde_json::Error`]
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// file is an invalid nx container
    #[error("file is an invalid nx container")]
    InvalidContainer,

    /// the source tree handed out a node kind the container cannot represent
    #[error("node {0:?} has a type that cannot be stored in a container")]
    #[diagnostic(help("the source tree was probably read with the wrong decoding settings"))]
    UnsupportedNode(String),

    /// a node was visited twice while assigning ids
    #[error("node {0} was assigned an id twice")]
    DuplicateNode(String),

    /// a node id was requested before the node was written
    #[error("node {0} has not been assigned an id")]
    UnassignedNode(String),

    /// child counts are stored in 16 bits
    #[error("node {name:?} has {count} children, at most 65535 are supported")]
    TooManyChildren {
        /// Name of the offending node
        name: String,
        /// Number of children it reported
        count: usize,
    },

    /// canvas pixels must match the dimensions stored in the node record
    #[error("canvas {name:?} has {actual} bytes of pixels, {expected} expected from its size")]
    CanvasSizeMismatch {
        /// Name of the offending node
        name: String,
        /// Four bytes per pixel of the reported size
        expected: usize,
        /// Length of the buffer the tree returned
        actual: usize,
    },

    /// string lengths are stored in 16 bits
    #[error("string of {0} bytes exceeds the 65535 byte limit")]
    StringTooLong(usize),

    /// blob lengths are stored in 32 bits
    #[error("blob of {0} bytes exceeds the 4 GiB limit")]
    BlobTooLarge(usize),

    /// one of the 32 bit id spaces ran out
    #[error("too many entries in the {0} table")]
    TableOverflow(&'static str),

    /// unable to find requested entry
    #[error("unable to find requested entry")]
    NotFound(#[from] NotFoundError),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Error type to provide further information when an entry has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested entry")]
pub enum NotFoundError {
    /// node at index {0}
    #[error("node at index {0}")]
    Node(u32),

    /// string at index {0}
    #[error("string at index {0}")]
    String(u32),

    /// canvas at index {0}
    #[error("canvas at index {0}")]
    Canvas(u32),

    /// audio at index {0}
    #[error("audio at index {0}")]
    Audio(u32),

    /// by path {0}
    #[error("by path {0}")]
    Path(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
