//! Compression session: one engine owned by one in-flight operation.

use super::engine::{DeflateEngine, Engine, Flush, InflateEngine, Status, Step};
use super::{CodecOptions, DEFAULT_CHUNK_SIZE, Format, Mode};
use crate::Result;

/// Transient per-stream state for a compress or decompress run.
///
/// The session owns its engine exclusively and tears it down exactly once:
/// either through an explicit [`finalize`](Session::finalize) or, on every
/// other exit path, when the session is dropped.
pub struct Session {
    engine: Box<dyn Engine>,
    level: Option<u32>,
    format: Format,
    chunk_size: usize,
    bytes_in: u64,
    bytes_out: u64,
    finished: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode())
            .field("level", &self.level)
            .field("format", &self.format)
            .field("chunk_size", &self.chunk_size)
            .field("bytes_in", &self.bytes_in)
            .field("bytes_out", &self.bytes_out)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Session {
    /// Starts a compressing session with the level and format from `options`.
    pub fn compress(options: &CodecOptions) -> Result<Self> {
        let engine = DeflateEngine::new(options.level, options.format)?;
        log::debug!(
            "deflate session started (level {}, {:?})",
            options.level,
            options.format
        );
        Ok(
            Self::with_engine(Box::new(engine), Some(options.level), options.format)
                .with_chunk_size(options.chunk_size),
        )
    }

    /// Starts a decompressing session for the format in `options`.
    pub fn decompress(options: &CodecOptions) -> Result<Self> {
        log::debug!("inflate session started ({:?})", options.format);
        Ok(Self::with_engine(
            Box::new(InflateEngine::new(options.format)),
            None,
            options.format,
        )
        .with_chunk_size(options.chunk_size))
    }

    /// Wraps an arbitrary engine.
    ///
    /// The working buffer size starts at [`DEFAULT_CHUNK_SIZE`].
    pub fn with_engine(engine: Box<dyn Engine>, level: Option<u32>, format: Format) -> Self {
        Self {
            engine,
            level,
            format,
            chunk_size: DEFAULT_CHUNK_SIZE,
            bytes_in: 0,
            bytes_out: 0,
            finished: false,
        }
    }

    /// Sets the working buffer size used in each direction.
    ///
    /// A size of zero is clamped to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Working buffer size used in each direction.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Direction of this session.
    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Compression level, `None` for decompressing sessions.
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    /// Stream format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Input bytes consumed so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Output bytes produced so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Returns `true` once the engine has confirmed the logical end of stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns `true` once the engine has been torn down.
    pub fn is_finalized(&self) -> bool {
        self.engine.is_finalized()
    }

    /// Runs one engine step and advances the cursors.
    pub fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<Step> {
        let step = self.engine.process(input, output, flush)?;
        self.bytes_in += step.consumed as u64;
        self.bytes_out += step.produced as u64;
        if step.status == Status::StreamEnd {
            self.finished = true;
        }
        Ok(step)
    }

    /// Tears down the engine. Safe to call more than once.
    pub fn finalize(&mut self) {
        if !self.engine.is_finalized() {
            log::debug!(
                "{:?} session finalized ({} bytes in, {} bytes out)",
                self.mode(),
                self.bytes_in,
                self.bytes_out
            );
            self.engine.finalize();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.finalize();
    }
}
