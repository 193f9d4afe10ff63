//! Compression engine contract and its flate2-backed implementations.
//!
//! The engine is the black box that actually runs DEFLATE. The chunked
//! codec only ever talks to it through [`Engine::process`], which feeds a
//! slice of input, drains into a slice of output, and reports how far it got.

use flate2::{
    Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status as FlateStatus,
};

use super::{Format, Mode};
use crate::{Error, Result};

/// zlib's `Z_STREAM_ERROR`, reported when the engine rejects its parameters.
pub const Z_STREAM_ERROR: i32 = -2;

/// How the engine should treat the input it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// More input follows.
    None,
    /// This is the final chunk; emit all buffered data and the trailer.
    Finish,
}

/// Outcome of a single engine call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Progress was made; keep going.
    Ok,
    /// No progress was possible with the buffers provided.
    BufError,
    /// The logical end of the stream was reached.
    StreamEnd,
}

/// Result of one [`Engine::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Input bytes the engine consumed.
    pub consumed: usize,
    /// Output bytes the engine produced.
    pub produced: usize,
    /// Engine status after the call.
    pub status: Status,
}

/// A stateful compression or decompression engine.
///
/// Implementations own their native state exclusively. `finalize` releases
/// it and must be safe to call any number of times, including after a
/// failed `process` call.
pub trait Engine: Send {
    /// Direction this engine runs in.
    fn mode(&self) -> Mode;

    /// Feeds `input` and drains into `output`.
    ///
    /// Data errors (including a missing preset dictionary) are returned as
    /// [`Error::CorruptData`].
    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step>;

    /// Tears down the engine state. Idempotent.
    fn finalize(&mut self);

    /// Returns `true` once [`finalize`](Engine::finalize) has run.
    fn is_finalized(&self) -> bool;
}

fn map_status(status: FlateStatus) -> Status {
    match status {
        FlateStatus::Ok => Status::Ok,
        FlateStatus::BufError => Status::BufError,
        FlateStatus::StreamEnd => Status::StreamEnd,
    }
}

fn released() -> Error {
    Error::Io(std::io::Error::other("compression engine already finalized"))
}

/// DEFLATE compressor.
pub struct DeflateEngine {
    inner: Option<Compress>,
}

impl std::fmt::Debug for DeflateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateEngine")
            .field("finalized", &self.inner.is_none())
            .finish_non_exhaustive()
    }
}

impl DeflateEngine {
    /// Initializes a compressor at `level` (0-9).
    ///
    /// Levels outside 0-9 fail with [`Error::EngineInit`] carrying
    /// [`Z_STREAM_ERROR`].
    pub fn new(level: u32, format: Format) -> Result<Self> {
        if level > 9 {
            return Err(Error::EngineInit {
                code: Z_STREAM_ERROR,
            });
        }
        let inner = Compress::new(Compression::new(level), format.zlib_header());
        Ok(Self { inner: Some(inner) })
    }
}

impl Engine for DeflateEngine {
    fn mode(&self) -> Mode {
        Mode::Compress
    }

    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step> {
        let inner = self.inner.as_mut().ok_or_else(released)?;
        let before_in = inner.total_in();
        let before_out = inner.total_out();
        let flush = match flush {
            Flush::None => FlushCompress::None,
            Flush::Finish => FlushCompress::Finish,
        };
        let status = inner
            .compress(input, output, flush)
            .map_err(|e| Error::corrupt(e.to_string()))?;
        Ok(Step {
            consumed: (inner.total_in() - before_in) as usize,
            produced: (inner.total_out() - before_out) as usize,
            status: map_status(status),
        })
    }

    fn finalize(&mut self) {
        self.inner = None;
    }

    fn is_finalized(&self) -> bool {
        self.inner.is_none()
    }
}

/// DEFLATE decompressor.
pub struct InflateEngine {
    inner: Option<Decompress>,
}

impl std::fmt::Debug for InflateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflateEngine")
            .field("finalized", &self.inner.is_none())
            .finish_non_exhaustive()
    }
}

impl InflateEngine {
    /// Initializes a decompressor for the given stream format.
    pub fn new(format: Format) -> Self {
        Self {
            inner: Some(Decompress::new(format.zlib_header())),
        }
    }
}

impl Engine for InflateEngine {
    fn mode(&self) -> Mode {
        Mode::Decompress
    }

    fn process(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step> {
        let inner = self.inner.as_mut().ok_or_else(released)?;
        let before_in = inner.total_in();
        let before_out = inner.total_out();
        let flush = match flush {
            Flush::None => FlushDecompress::None,
            Flush::Finish => FlushDecompress::Finish,
        };
        let status = inner.decompress(input, output, flush).map_err(|e| {
            if e.needs_dictionary().is_some() {
                Error::corrupt("stream requires a preset dictionary")
            } else {
                Error::corrupt(e.to_string())
            }
        })?;
        Ok(Step {
            consumed: (inner.total_in() - before_in) as usize,
            produced: (inner.total_out() - before_out) as usize,
            status: map_status(status),
        })
    }

    fn finalize(&mut self) {
        self.inner = None;
    }

    fn is_finalized(&self) -> bool {
        self.inner.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_fails_init() {
        let err = DeflateEngine::new(10, Format::Zlib).unwrap_err();
        assert!(matches!(err, Error::EngineInit { code: Z_STREAM_ERROR }));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut engine = DeflateEngine::new(9, Format::Zlib).unwrap();
        assert!(!engine.is_finalized());
        engine.finalize();
        engine.finalize();
        assert!(engine.is_finalized());

        let mut out = [0u8; 16];
        assert!(engine.process(b"abc", &mut out, Flush::Finish).is_err());
    }

    #[test]
    fn test_single_call_roundtrip() {
        let data = b"engine level roundtrip, engine level roundtrip";
        let mut deflate = DeflateEngine::new(9, Format::Zlib).unwrap();
        let mut compressed = [0u8; 256];
        let step = deflate
            .process(data, &mut compressed, Flush::Finish)
            .unwrap();
        assert_eq!(step.consumed, data.len());
        assert_eq!(step.status, Status::StreamEnd);

        let mut inflate = InflateEngine::new(Format::Zlib);
        let mut plain = [0u8; 256];
        let step = inflate
            .process(&compressed[..step.produced], &mut plain, Flush::None)
            .unwrap();
        assert_eq!(step.status, Status::StreamEnd);
        assert_eq!(&plain[..step.produced], data);
    }

    #[test]
    fn test_garbage_is_corrupt_data() {
        let mut inflate = InflateEngine::new(Format::Zlib);
        let mut out = [0u8; 64];
        let err = inflate
            .process(&[0xFF; 32], &mut out, Flush::None)
            .unwrap_err();
        assert!(matches!(err, Error::CorruptData { .. }));
    }

    #[test]
    fn test_modes() {
        assert_eq!(
            DeflateEngine::new(1, Format::Raw).unwrap().mode(),
            Mode::Compress
        );
        assert_eq!(InflateEngine::new(Format::Raw).mode(), Mode::Decompress);
    }
}
