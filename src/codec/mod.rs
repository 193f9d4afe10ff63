//! Streaming DEFLATE codec.
//!
//! This module wraps the compression engine in a [`Session`] and drives it
//! over bounded buffers with [`run_stream`], so files of any size are
//! processed without being held in memory.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use zpack::codec::{CodecOptions, Session, run_stream};
//!
//! # fn main() -> zpack::Result<()> {
//! let options = CodecOptions::default();
//!
//! let mut compressed = Vec::new();
//! let mut session = Session::compress(&options)?;
//! run_stream(&mut session, &mut Cursor::new(b"hello hello hello"), &mut compressed)?;
//!
//! let mut plain = Vec::new();
//! let mut session = Session::decompress(&options)?;
//! run_stream(&mut session, &mut Cursor::new(&compressed), &mut plain)?;
//! assert_eq!(plain, b"hello hello hello");
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod session;
pub mod stream;

pub use engine::{DeflateEngine, Engine, Flush, InflateEngine, Status, Step};
pub use session::Session;
pub use stream::run_stream;

use crate::{Error, Result};

/// Working buffer size in each direction (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16384;

/// Compression level used unless configured otherwise (maximum compression).
pub const DEFAULT_LEVEL: u32 = 9;

/// Direction a session runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain bytes in, compressed bytes out.
    Compress,
    /// Compressed bytes in, plain bytes out.
    Decompress,
}

/// Framing of the compressed byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// zlib framing: 2-byte header, DEFLATE data, Adler-32 trailer.
    #[default]
    Zlib,
    /// Bare DEFLATE data with no header or trailer.
    Raw,
}

impl Format {
    pub(crate) fn zlib_header(self) -> bool {
        matches!(self, Format::Zlib)
    }
}

/// Options for compressing and decompressing streams.
///
/// # Example
///
/// ```rust
/// use zpack::codec::{CodecOptions, Format};
///
/// let options = CodecOptions::new()
///     .level(6)?
///     .format(Format::Raw)
///     .chunk_size(64 * 1024)?;
/// assert_eq!(options.level, 6);
/// # Ok::<(), zpack::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// Compression level (0-9, default 9). Ignored when decompressing.
    pub level: u32,
    /// Stream framing (default zlib).
    pub format: Format,
    /// Size of the input and output working buffers (default 16 KiB).
    pub chunk_size: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            format: Format::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl CodecOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if `level` is above 9.
    pub fn level(mut self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the stream framing.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets the working buffer size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkSize`] if `chunk_size` is zero.
    pub fn chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CodecOptions::default();
        assert_eq!(options.level, 9);
        assert_eq!(options.format, Format::Zlib);
        assert_eq!(options.chunk_size, 16384);
    }

    #[test]
    fn test_level_validation() {
        assert_eq!(CodecOptions::new().level(0).unwrap().level, 0);
        assert!(matches!(
            CodecOptions::new().level(10),
            Err(Error::InvalidCompressionLevel { level: 10 })
        ));
    }

    #[test]
    fn test_chunk_size_validation() {
        assert!(matches!(
            CodecOptions::new().chunk_size(0),
            Err(Error::InvalidChunkSize)
        ));
        assert_eq!(CodecOptions::new().chunk_size(1).unwrap().chunk_size, 1);
    }

    #[test]
    fn test_raw_and_zlib_differ() {
        use std::io::Cursor;

        let data = b"framing check";
        let mut zlib = Vec::new();
        let mut session = Session::compress(&CodecOptions::default()).unwrap();
        run_stream(&mut session, &mut Cursor::new(data), &mut zlib).unwrap();

        let raw_options = CodecOptions::new().format(Format::Raw);
        let mut raw = Vec::new();
        let mut session = Session::compress(&raw_options).unwrap();
        run_stream(&mut session, &mut Cursor::new(data), &mut raw).unwrap();

        // 2-byte header + 4-byte Adler-32 trailer
        assert_eq!(zlib.len(), raw.len() + 6);
        assert_eq!(zlib[0], 0x78);

        let mut plain = Vec::new();
        let mut session = Session::decompress(&raw_options).unwrap();
        run_stream(&mut session, &mut Cursor::new(&raw), &mut plain).unwrap();
        assert_eq!(plain, data);
    }
}
