//! Container packer: appends member records to a container stream.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use super::{MemberHeader, MemberInfo, MemberName};
use crate::codec::CodecOptions;
use crate::codec::stream::alloc_buffer;
use crate::{Error, Result};

/// Default limit for members read whole into memory (64 MiB).
pub const DEFAULT_MAX_BUFFERED_MEMBER: u64 = 64 * 1024 * 1024;

/// Options for building containers.
///
/// # Example
///
/// ```rust
/// use zpack::PackOptions;
///
/// // Buffer members up to 1 MiB, stream anything larger.
/// let options = PackOptions::new().max_buffered_member(1024 * 1024);
/// assert_eq!(options.max_buffered_member, 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Options for compressing each source before it is appended.
    pub codec: CodecOptions,

    /// Largest member payload read into a single buffer before writing.
    ///
    /// Members up to this size are read whole, so nothing reaches the
    /// container until the source has been read successfully. Larger
    /// members are copied straight from the source to the container.
    /// Default: 64 MiB.
    pub max_buffered_member: u64,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            codec: CodecOptions::default(),
            max_buffered_member: DEFAULT_MAX_BUFFERED_MEMBER,
        }
    }
}

impl PackOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec options used when compressing sources.
    pub fn codec(mut self, codec: CodecOptions) -> Self {
        self.codec = codec;
        self
    }

    /// Sets the buffering threshold.
    pub fn max_buffered_member(mut self, bytes: u64) -> Self {
        self.max_buffered_member = bytes;
        self
    }
}

/// Summary of a finished container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackResult {
    /// Members in the order they were written.
    pub members: Vec<MemberInfo>,
    /// Total bytes written, headers included.
    pub bytes_written: u64,
}

impl PackResult {
    /// Sum of all payload sizes.
    pub fn payload_bytes(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }
}

/// Appends member records to a container.
///
/// Records are written back to back in call order. A failed append may
/// leave a partial record at the end of the stream; earlier records are
/// never touched.
///
/// Once a failure happens after the header has been written, the stream no
/// longer matches [`position`](Self::position), and every later append or
/// [`finish`](Self::finish) fails. Failures caught before anything is
/// written (a bad name, a missing source file) leave the writer usable.
///
/// # Example
///
/// ```rust
/// use zpack::ContainerWriter;
///
/// let mut bytes = Vec::new();
/// let mut writer = ContainerWriter::new(&mut bytes);
/// writer.append_bytes("a.bin", b"payload")?;
/// let result = writer.finish()?;
/// assert_eq!(result.members.len(), 1);
/// assert_eq!(bytes.len(), 28 + 7);
/// # Ok::<(), zpack::Error>(())
/// ```
pub struct ContainerWriter<W: Write> {
    inner: W,
    position: u64,
    members: Vec<MemberInfo>,
    max_buffered_member: u64,
    poisoned: bool,
}

impl<W: Write> std::fmt::Debug for ContainerWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerWriter")
            .field("position", &self.position)
            .field("members", &self.members.len())
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}

impl ContainerWriter<BufWriter<File>> {
    /// Creates (or truncates) a container file.
    pub fn create_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::open_failed(path, e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ContainerWriter<W> {
    /// Wraps a writer positioned where the first record should go.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            position: 0,
            members: Vec::new(),
            max_buffered_member: DEFAULT_MAX_BUFFERED_MEMBER,
            poisoned: false,
        }
    }

    /// Sets the largest member read whole into memory by [`append_member`](Self::append_member).
    pub fn max_buffered_member(mut self, bytes: u64) -> Self {
        self.max_buffered_member = bytes;
        self
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns `true` if an earlier append failed partway through a record.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Members appended so far.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Appends the file at `source_path` as a member called `member_name`.
    ///
    /// The payload length is taken from the file's metadata and the name,
    /// size and payload are written in that order.
    ///
    /// # Errors
    ///
    /// - [`Error::NameTooLong`] / [`Error::InvalidMemberName`] for a bad name
    /// - [`Error::StatFailed`] if the file's size cannot be determined
    /// - [`Error::OpenFailed`] if the file cannot be opened
    /// - [`Error::OutOfMemory`] if the payload buffer cannot be allocated
    /// - [`Error::Io`] on short reads, any write failure, or a poisoned writer
    pub fn append_member(
        &mut self,
        member_name: &str,
        source_path: impl AsRef<Path>,
    ) -> Result<MemberInfo> {
        self.check_usable()?;
        let name = MemberName::new(member_name)?;
        let source_path = source_path.as_ref();
        let size = std::fs::metadata(source_path)
            .map_err(|source| Error::StatFailed {
                path: source_path.to_path_buf(),
                source,
            })?
            .len();
        let mut source =
            File::open(source_path).map_err(|e| Error::open_failed(source_path, e))?;

        if size <= self.max_buffered_member {
            let mut payload = alloc_buffer(size as usize)?;
            source.read_exact(&mut payload)?;
            self.write_record(name, &payload)
        } else {
            log::debug!(
                "streaming member '{}' ({} bytes) from '{}'",
                name,
                size,
                source_path.display()
            );
            self.write_record_from(name, &mut source, size)
        }
    }

    /// Appends an in-memory payload.
    pub fn append_bytes(&mut self, member_name: &str, data: &[u8]) -> Result<MemberInfo> {
        self.check_usable()?;
        let name = MemberName::new(member_name)?;
        self.write_record(name, data)
    }

    /// Appends exactly `size` bytes taken from `reader`.
    ///
    /// Fails with an [`io::ErrorKind::UnexpectedEof`] error if the reader
    /// runs dry first; the header has already been written by then.
    pub fn append_reader<R: Read + ?Sized>(
        &mut self,
        member_name: &str,
        reader: &mut R,
        size: u64,
    ) -> Result<MemberInfo> {
        self.check_usable()?;
        let name = MemberName::new(member_name)?;
        self.write_record_from(name, reader, size)
    }

    /// Flushes the stream and returns the summary.
    pub fn finish(mut self) -> Result<PackResult> {
        self.check_usable()?;
        self.inner.flush()?;
        log::debug!(
            "container finished: {} members, {} bytes",
            self.members.len(),
            self.position
        );
        Ok(PackResult {
            members: self.members,
            bytes_written: self.position,
        })
    }

    fn check_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(Error::Io(io::Error::other(
                "container writer is unusable after a failed append",
            )));
        }
        Ok(())
    }

    fn write_record(&mut self, name: MemberName, payload: &[u8]) -> Result<MemberInfo> {
        let header = MemberHeader::new(name, payload.len() as u64);
        self.poisoned = true;
        header.write_to(&mut self.inner)?;
        self.inner.write_all(payload)?;
        self.poisoned = false;
        Ok(self.record(header))
    }

    fn write_record_from<R: Read + ?Sized>(
        &mut self,
        name: MemberName,
        reader: &mut R,
        size: u64,
    ) -> Result<MemberInfo> {
        let header = MemberHeader::new(name, size);
        self.poisoned = true;
        header.write_to(&mut self.inner)?;
        let copied = io::copy(&mut reader.take(size), &mut self.inner)?;
        if copied != size {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "member '{}' source ended after {} of {} bytes",
                    header.name, copied, size
                ),
            )));
        }
        self.poisoned = false;
        Ok(self.record(header))
    }

    fn record(&mut self, header: MemberHeader) -> MemberInfo {
        let info = MemberInfo {
            name: header.name,
            size: header.size,
            offset: self.position,
        };
        self.position += info.record_len();
        log::debug!("appended member '{}' ({} bytes)", info.name, info.size);
        self.members.push(info.clone());
        info
    }
}
