//! Error types for compression and container operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of the codec, the single-file compressor and decompressor,
//! and the container packer and unpacker, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use zpack::{Error, compress_file};
//!
//! fn compress(src: &str, dst: &str) -> zpack::Result<()> {
//!     match compress_file(src, dst) {
//!         Ok(stats) => {
//!             println!("{} -> {} bytes", stats.bytes_in, stats.bytes_out);
//!             Ok(())
//!         }
//!         Err(Error::OpenFailed { path, source }) => {
//!             eprintln!("cannot open {}: {}", path.display(), source);
//!             Err(Error::OpenFailed { path, source })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The field of a container member record that was being read.
///
/// Used by [`Error::Truncated`] to say where the container ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    /// The fixed-width name field.
    Name,
    /// The 8-byte size field.
    Size,
    /// The payload following the size field.
    Payload,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Size => write!(f, "size"),
            Self::Payload => write!(f, "payload"),
        }
    }
}

/// The main error type for zpack operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`OpenFailed`][Self::OpenFailed], [`StatFailed`][Self::StatFailed] | File system operations |
/// | Engine | [`EngineInit`][Self::EngineInit], [`OutOfMemory`][Self::OutOfMemory] | Compression engine setup |
/// | Integrity | [`CorruptData`][Self::CorruptData], [`IncompleteStream`][Self::IncompleteStream], [`Truncated`][Self::Truncated] | Damaged input |
/// | Caller contract | [`NameTooLong`][Self::NameTooLong], [`InvalidMemberName`][Self::InvalidMemberName], [`InvalidCompressionLevel`][Self::InvalidCompressionLevel], [`InvalidChunkSize`][Self::InvalidChunkSize] | Bad arguments |
/// | Security | [`PathTraversal`][Self::PathTraversal] | Unsafe member names |
/// | Control | [`Cancelled`][Self::Cancelled] | Progress reporter asked to stop |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing a stream.
    ///
    /// Short writes to a destination are reported here and abort the
    /// operation immediately.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A source or destination file could not be opened.
    #[error("cannot open '{}': {source}", path.display())]
    OpenFailed {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The size of a file could not be determined from its metadata.
    #[error("cannot stat '{}': {source}", path.display())]
    StatFailed {
        /// The path whose metadata was requested.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The compression engine refused to initialize.
    ///
    /// The code follows zlib conventions (`-2` for a stream error such as an
    /// out-of-range level).
    #[error("compression engine initialization failed (code {code})")]
    EngineInit {
        /// The engine status code.
        code: i32,
    },

    /// A buffer could not be allocated.
    ///
    /// This is always fatal: the engine is torn down and the operation stops.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory {
        /// Number of bytes that were requested.
        requested: u64,
    },

    /// The compressed stream is malformed.
    ///
    /// A stream that needs a preset dictionary is reported here as well.
    #[error("corrupt compressed data: {reason}")]
    CorruptData {
        /// A description from the engine.
        reason: String,
    },

    /// The compressed input ended before the engine saw the end-of-stream marker.
    #[error("compressed stream ended early after {bytes_in} input bytes")]
    IncompleteStream {
        /// Number of compressed bytes consumed before the input ran out.
        bytes_in: u64,
    },

    /// The container ended in the middle of a member record.
    #[error("container truncated in {field} field: expected {expected} bytes, got {actual}")]
    Truncated {
        /// The record field being read.
        field: RecordField,
        /// Bytes the field requires.
        expected: u64,
        /// Bytes that were available.
        actual: u64,
    },

    /// A member name does not fit the fixed-width name field.
    #[error("member name '{name}' is {len} bytes, limit is {limit}", limit = crate::NAME_LEN)]
    NameTooLong {
        /// The rejected name.
        name: String,
        /// Its length in bytes.
        len: usize,
    },

    /// A member name is empty or contains a NUL byte.
    ///
    /// Also raised on platforms without byte paths when a stored name is not
    /// valid UTF-8 and has to become a file name.
    #[error("invalid member name: {reason}")]
    InvalidMemberName {
        /// Why the name was rejected.
        reason: String,
    },

    /// An invalid compression level was provided.
    ///
    /// ```rust
    /// use zpack::{CodecOptions, Error};
    ///
    /// assert!(CodecOptions::new().level(9).is_ok());
    /// let result = CodecOptions::new().level(15);
    /// assert!(matches!(result, Err(Error::InvalidCompressionLevel { level: 15 })));
    /// ```
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },

    /// A zero-sized working buffer was requested.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// A member name would place the output outside the extraction directory.
    #[error("unsafe member path rejected: {name}")]
    PathTraversal {
        /// The member name as stored in the container.
        name: String,
    },

    /// The operation was cancelled through a progress reporter.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns `true` if this error indicates damaged input data.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::CorruptData { .. } | Error::IncompleteStream { .. } | Error::Truncated { .. }
        )
    }

    /// Returns `true` if this error indicates a security issue.
    pub fn is_security_error(&self) -> bool {
        matches!(self, Error::PathTraversal { .. })
    }

    /// Returns `true` if retrying the operation might succeed.
    ///
    /// Only transient I/O errors qualify.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Io(e) | Error::OpenFailed { source: e, .. } => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    pub(crate) fn open_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::OpenFailed {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptData {
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for zpack operations.
pub type Result<T> = std::result::Result<T, Error>;
