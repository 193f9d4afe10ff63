//! Whole-file compression and decompression.
//!
//! These functions open both ends, run one [`Session`] over the full input
//! with the chunked codec, and close everything again on every exit path.
//! The compressed file is the raw engine output with no extra header.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::codec::{CodecOptions, Session, run_stream};
use crate::{Error, Result};

/// Byte counts from one compress or decompress run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes read from the source.
    pub bytes_in: u64,
    /// Bytes written to the destination.
    pub bytes_out: u64,
}

impl StreamStats {
    /// Output size divided by input size (0.0 for empty input).
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }

    /// Fraction of space saved (`1 - ratio`); negative when the output grew.
    pub fn space_savings(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            1.0 - self.ratio()
        }
    }
}

fn open_pair(source_path: &Path, dest_path: &Path) -> Result<(File, File)> {
    let source = File::open(source_path).map_err(|e| Error::open_failed(source_path, e))?;
    let dest = File::create(dest_path).map_err(|e| Error::open_failed(dest_path, e))?;
    Ok((source, dest))
}

fn run_session<R, W>(mut session: Session, reader: &mut R, writer: &mut W) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    run_stream(&mut session, reader, writer)?;
    writer.flush()?;
    Ok(StreamStats {
        bytes_in: session.bytes_in(),
        bytes_out: session.bytes_out(),
    })
}

/// Compresses `source_path` into `dest_path` at level 9 with zlib framing.
///
/// The destination is created or truncated.
///
/// # Errors
///
/// - [`Error::OpenFailed`] if either file cannot be opened
/// - [`Error::Io`] on any read or write failure
///
/// # Example
///
/// ```rust,no_run
/// let stats = zpack::compress_file("manifest.xml", "manifest.cxml")?;
/// println!("saved {:.1}%", stats.space_savings() * 100.0);
/// # Ok::<(), zpack::Error>(())
/// ```
pub fn compress_file(
    source_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
) -> Result<StreamStats> {
    compress_file_with(source_path, dest_path, &CodecOptions::default())
}

/// Compresses a file with explicit options.
pub fn compress_file_with(
    source_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
    options: &CodecOptions,
) -> Result<StreamStats> {
    let (source_path, dest_path) = (source_path.as_ref(), dest_path.as_ref());
    let (mut source, mut dest) = open_pair(source_path, dest_path)?;
    let session = Session::compress(options)?;
    let stats = run_session(session, &mut source, &mut dest)?;
    log::debug!(
        "compressed '{}' -> '{}' ({} -> {} bytes)",
        source_path.display(),
        dest_path.display(),
        stats.bytes_in,
        stats.bytes_out
    );
    Ok(stats)
}

/// Decompresses `source_path` (zlib framing) into `dest_path`.
///
/// # Errors
///
/// - [`Error::OpenFailed`] if either file cannot be opened
/// - [`Error::CorruptData`] if the compressed data is invalid
/// - [`Error::IncompleteStream`] if the data stops before the end marker
/// - [`Error::Io`] on any read or write failure
pub fn decompress_file(
    source_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
) -> Result<StreamStats> {
    decompress_file_with(source_path, dest_path, &CodecOptions::default())
}

/// Decompresses a file with explicit options.
pub fn decompress_file_with(
    source_path: impl AsRef<Path>,
    dest_path: impl AsRef<Path>,
    options: &CodecOptions,
) -> Result<StreamStats> {
    let (source_path, dest_path) = (source_path.as_ref(), dest_path.as_ref());
    let (mut source, mut dest) = open_pair(source_path, dest_path)?;
    let session = Session::decompress(options)?;
    let stats = run_session(session, &mut source, &mut dest)?;
    log::debug!(
        "decompressed '{}' -> '{}' ({} -> {} bytes)",
        source_path.display(),
        dest_path.display(),
        stats.bytes_in,
        stats.bytes_out
    );
    Ok(stats)
}

/// Compresses everything from `reader` into `writer`.
pub fn compress_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    options: &CodecOptions,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    run_session(Session::compress(options)?, reader, writer)
}

/// Decompresses everything from `reader` into `writer`.
pub fn decompress_stream<R, W>(
    reader: &mut R,
    writer: &mut W,
    options: &CodecOptions,
) -> Result<StreamStats>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    run_session(Session::decompress(options)?, reader, writer)
}

/// Compresses a byte slice with default options.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress_stream(&mut &data[..], &mut out, &CodecOptions::default())?;
    Ok(out)
}

/// Decompresses a byte slice produced by [`compress_bytes`].
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress_stream(&mut &data[..], &mut out, &CodecOptions::default())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("manifest.xml");
        let packed = dir.path().join("manifest.cxml");
        let restored = dir.path().join("manifest_restored.xml");

        let data = b"<manifest><page id=\"1\"/></manifest>\n".repeat(500);
        std::fs::write(&plain, &data).unwrap();

        let stats = compress_file(&plain, &packed).unwrap();
        assert_eq!(stats.bytes_in, data.len() as u64);
        assert_eq!(stats.bytes_out, std::fs::metadata(&packed).unwrap().len());
        assert!(stats.space_savings() > 0.5);

        let stats = decompress_file(&packed, &restored).unwrap();
        assert_eq!(stats.bytes_out, data.len() as u64);
        assert_eq!(std::fs::read(&restored).unwrap(), data);
    }

    #[test]
    fn test_empty_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("empty");
        let packed = dir.path().join("empty.z");
        let restored = dir.path().join("empty.out");
        std::fs::write(&plain, b"").unwrap();

        compress_file(&plain, &packed).unwrap();
        assert!(std::fs::metadata(&packed).unwrap().len() > 0);

        let stats = decompress_file(&packed, &restored).unwrap();
        assert_eq!(stats.bytes_out, 0);
        assert!(std::fs::read(&restored).unwrap().is_empty());
    }

    #[test]
    fn test_missing_source_is_open_failed() {
        let dir = TempDir::new().unwrap();
        let err = compress_file(dir.path().join("nope"), dir.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::OpenFailed { .. }));
    }

    #[test]
    fn test_unwritable_destination_is_open_failed() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("in");
        std::fs::write(&plain, b"data").unwrap();
        let err = compress_file(&plain, dir.path().join("missing_dir").join("out")).unwrap_err();
        assert!(matches!(err, Error::OpenFailed { .. }));
    }

    #[test]
    fn test_invalid_level_is_engine_init() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("in");
        std::fs::write(&plain, b"data").unwrap();
        let options = CodecOptions {
            level: 12,
            ..CodecOptions::default()
        };
        let err = compress_file_with(&plain, dir.path().join("out"), &options).unwrap_err();
        assert!(matches!(err, Error::EngineInit { .. }));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.cxml");
        std::fs::write(&bad, b"this is not zlib data at all").unwrap();
        let err = decompress_file(&bad, dir.path().join("out")).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_bytes_helpers() {
        let data = b"in-memory helpers".repeat(40);
        let compressed = compress_bytes(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress_bytes(&compressed).unwrap(), data);
    }

    #[test]
    fn test_stats_ratio() {
        let stats = StreamStats {
            bytes_in: 200,
            bytes_out: 50,
        };
        assert!((stats.ratio() - 0.25).abs() < f64::EPSILON);
        assert!((stats.space_savings() - 0.75).abs() < f64::EPSILON);
        assert_eq!(StreamStats::default().ratio(), 0.0);
    }
}
