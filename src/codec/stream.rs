//! Chunked codec: drives a [`Session`] over bounded input and output buffers.

use std::io::{self, Read, Write};

use super::Mode;
use super::engine::{Flush, Status};
use super::session::Session;
use crate::{Error, Result};

/// Allocates a zeroed buffer of `len` bytes, reporting allocation failure.
pub(crate) fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| Error::OutOfMemory {
        requested: len as u64,
    })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Reads until `buf` is full or the source is exhausted.
///
/// Returns the number of bytes read; less than `buf.len()` means end of input.
pub(crate) fn fill_buffer<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Streams everything from `reader` through the session into `writer`.
///
/// Input is consumed in chunks of [`Session::chunk_size`] bytes; each chunk
/// is fed to the engine and all output it makes available is written out
/// before the next chunk is read. When compressing, the chunk that hits end
/// of input is flagged as final so the engine emits its trailer.
///
/// The call succeeds only once the engine confirms the logical end of the
/// stream. A decompression input that is completely empty is accepted and
/// produces no output; one that stops anywhere else before the end marker
/// fails with [`Error::IncompleteStream`]. Bytes following the end marker
/// are ignored.
///
/// Output is written after each engine call that succeeds. If a call fails,
/// for example on a checksum mismatch, whatever it produced is dropped, but
/// output from earlier calls has already reached `writer`.
///
/// The engine is finalized before returning, on success and on error.
pub fn run_stream<R, W>(session: &mut Session, reader: &mut R, writer: &mut W) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let result = match session.mode() {
        Mode::Compress => deflate_loop(session, reader, writer),
        Mode::Decompress => inflate_loop(session, reader, writer),
    };
    session.finalize();
    result
}

fn deflate_loop<R, W>(session: &mut Session, reader: &mut R, writer: &mut W) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let chunk = session.chunk_size();
    let mut input = alloc_buffer(chunk)?;
    let mut output = alloc_buffer(chunk)?;

    loop {
        let filled = fill_buffer(reader, &mut input)?;
        let flush = if filled < chunk {
            Flush::Finish
        } else {
            Flush::None
        };

        drain(session, &input[..filled], &mut output, flush, writer)?;

        if flush == Flush::Finish {
            break;
        }
    }

    if !session.is_finished() {
        return Err(Error::Io(io::Error::other(
            "deflate did not reach end of stream after final chunk",
        )));
    }
    Ok(())
}

fn inflate_loop<R, W>(session: &mut Session, reader: &mut R, writer: &mut W) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let chunk = session.chunk_size();
    let mut input = alloc_buffer(chunk)?;
    let mut output = alloc_buffer(chunk)?;
    let mut bytes_read: u64 = 0;

    loop {
        let filled = fill_buffer(reader, &mut input)?;
        if filled == 0 {
            break;
        }
        bytes_read += filled as u64;

        let left = drain(session, &input[..filled], &mut output, Flush::None, writer)?;

        if session.is_finished() {
            if left > 0 {
                log::warn!("ignoring {} trailing bytes after end of compressed stream", left);
            }
            break;
        }
    }

    if !session.is_finished() && bytes_read > 0 {
        return Err(Error::IncompleteStream {
            bytes_in: session.bytes_in(),
        });
    }
    Ok(())
}

/// Feeds one chunk and writes out everything the engine produces for it.
///
/// Returns the number of input bytes left unconsumed, which is non-zero only
/// when the engine reached the end of the stream mid-chunk.
fn drain<W: Write + ?Sized>(
    session: &mut Session,
    mut input: &[u8],
    output: &mut [u8],
    flush: Flush,
    writer: &mut W,
) -> Result<usize> {
    loop {
        let step = session.step(input, output, flush)?;
        input = &input[step.consumed..];
        writer.write_all(&output[..step.produced])?;

        if step.status == Status::StreamEnd {
            return Ok(input.len());
        }
        // Output space left over means the engine has nothing pending for this chunk.
        // A final chunk keeps going until the end marker.
        if flush == Flush::None && step.produced < output.len() && input.is_empty() {
            return Ok(0);
        }
        if step.consumed == 0 && step.produced == 0 {
            return Ok(input.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecOptions;
    use std::io::Cursor;

    fn compress_with(data: &[u8], chunk: usize) -> Vec<u8> {
        let options = CodecOptions::new().chunk_size(chunk).unwrap();
        let mut session = Session::compress(&options).unwrap();
        let mut out = Vec::new();
        run_stream(&mut session, &mut Cursor::new(data), &mut out).unwrap();
        assert!(session.is_finished());
        assert!(session.is_finalized());
        out
    }

    fn decompress_with(data: &[u8], chunk: usize) -> Result<Vec<u8>> {
        let options = CodecOptions::new().chunk_size(chunk).unwrap();
        let mut session = Session::decompress(&options).unwrap();
        let mut out = Vec::new();
        run_stream(&mut session, &mut Cursor::new(data), &mut out)?;
        Ok(out)
    }

    /// Reader that hands out at most one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    /// Writer that accepts a fixed number of bytes and then fails.
    struct FailingWriter {
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_roundtrip_small_chunks() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = compress_with(&data, 7);
        assert_eq!(decompress_with(&compressed, 5).unwrap(), data);
    }

    #[test]
    fn test_exact_chunk_multiple() {
        let chunk = 16384;
        let data: Vec<u8> = (0..chunk * 3).map(|i| (i * 7 % 256) as u8).collect();
        let compressed = compress_with(&data, chunk);
        let restored = decompress_with(&compressed, chunk).unwrap();
        assert_eq!(restored.len(), data.len());
        assert_eq!(restored, data);
    }

    #[test]
    fn test_empty_input_compresses_to_valid_stream() {
        let compressed = compress_with(&[], 16384);
        assert!(!compressed.is_empty());
        assert!(decompress_with(&compressed, 16384).unwrap().is_empty());
    }

    #[test]
    fn test_empty_compressed_input_is_tolerated() {
        assert!(decompress_with(&[], 16384).unwrap().is_empty());
    }

    #[test]
    fn test_short_reads() {
        let data = b"short reads must not be mistaken for end of input".repeat(20);
        let options = CodecOptions::new().chunk_size(64).unwrap();
        let mut session = Session::compress(&options).unwrap();
        let mut compressed = Vec::new();
        run_stream(&mut session, &mut Trickle(&data), &mut compressed).unwrap();
        assert_eq!(decompress_with(&compressed, 64).unwrap(), data);
    }

    #[test]
    fn test_truncated_stream() {
        let data = b"truncate me ".repeat(100);
        let compressed = compress_with(&data, 16384);
        let err = decompress_with(&compressed[..compressed.len() - 4], 16384).unwrap_err();
        assert!(matches!(err, Error::IncompleteStream { .. }));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = decompress_with(&[0x12, 0x34, 0x56, 0x78, 0x9A], 16384).unwrap_err();
        assert!(matches!(err, Error::CorruptData { .. }));
    }

    #[test]
    fn test_dictionary_required_is_corrupt() {
        // zlib header with FDICT set, followed by a dictionary id.
        let err = decompress_with(&[0x78, 0xBB, 0x00, 0x00, 0x00, 0x01], 16384).unwrap_err();
        match err {
            Error::CorruptData { reason } => assert!(reason.contains("dictionary")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut compressed = compress_with(b"payload", 16384);
        compressed.extend_from_slice(b"junk after the end marker");
        assert_eq!(decompress_with(&compressed, 16384).unwrap(), b"payload");
    }

    #[test]
    fn test_write_failure_releases_engine() {
        let data: Vec<u8> = (0..100_000u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
            .collect();
        let options = CodecOptions::new().level(0).unwrap();
        let mut session = Session::compress(&options).unwrap();
        let mut writer = FailingWriter { budget: 100 };
        let err = run_stream(&mut session, &mut Cursor::new(&data), &mut writer).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(session.is_finalized());
        assert!(!session.is_finished());
    }

    #[test]
    fn test_alloc_buffer() {
        assert_eq!(alloc_buffer(32).unwrap().len(), 32);
        let err = alloc_buffer(usize::MAX).unwrap_err();
        assert!(matches!(err, Error::OutOfMemory { .. }));
    }
}
