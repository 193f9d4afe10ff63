//! Container unpacker: walks member records in order.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use super::header::read_fields;
use super::{HEADER_LEN, MemberInfo, MemberName};
use crate::error::RecordField;
use crate::safety::{PathSafety, resolve_member_path};
use crate::{Error, Result};

/// Options for extracting members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// How member names are turned into output paths. Default: strict.
    pub path_safety: PathSafety,
}

impl UnpackOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path safety policy.
    pub fn path_safety(mut self, policy: PathSafety) -> Self {
        self.path_safety = policy;
        self
    }
}

/// Reads member records from a container in the order they were written.
///
/// The reader keeps track of how much of the current payload is still
/// unread. Asking for the next header first skips whatever is left, so
/// callers may look at a header and move on without touching its payload.
///
/// # Example
///
/// ```rust
/// use zpack::{ContainerReader, ContainerWriter};
///
/// let mut bytes = Vec::new();
/// let mut writer = ContainerWriter::new(&mut bytes);
/// writer.append_bytes("x", b"first")?;
/// writer.append_bytes("y", b"second")?;
/// writer.finish()?;
///
/// let mut reader = ContainerReader::new(&bytes[..]);
/// let mut names = Vec::new();
/// for member in reader.members() {
///     names.push(member?.name.to_string());
/// }
/// assert_eq!(names, ["x", "y"]);
/// # Ok::<(), zpack::Error>(())
/// ```
pub struct ContainerReader<R: Read> {
    inner: R,
    position: u64,
    /// Declared size of the payload that follows the last header read.
    pending: Option<u64>,
}

impl<R: Read> std::fmt::Debug for ContainerReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReader")
            .field("position", &self.position)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl ContainerReader<BufReader<File>> {
    /// Opens a container file.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::open_failed(path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> ContainerReader<R> {
    /// Wraps a reader positioned at the start of a record.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            pending: None,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next record header, skipping any unread payload first.
    ///
    /// Returns `Ok(None)` at the end of the container.
    ///
    /// A record whose name field is empty fails with
    /// [`Error::InvalidMemberName`]. Its header still counts as read, so
    /// the next call skips its payload and moves on to the following
    /// record.
    pub fn next_header(&mut self) -> Result<Option<MemberInfo>> {
        self.skip_payload()?;

        let offset = self.position;
        let Some((field, size)) = read_fields(&mut self.inner)? else {
            return Ok(None);
        };
        self.position += HEADER_LEN as u64;
        self.pending = Some(size);

        let name = MemberName::from_field(field)?;
        Ok(Some(MemberInfo { name, size, offset }))
    }

    /// Copies the payload of the current record into `writer`.
    ///
    /// # Errors
    ///
    /// - [`Error::Truncated`] if the container ends inside the payload
    /// - [`Error::Io`] on a read or write failure
    ///
    /// Without a pending header nothing is copied.
    pub fn read_payload_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<u64> {
        let Some(size) = self.pending.take() else {
            return Ok(0);
        };
        let copied = io::copy(&mut (&mut self.inner).take(size), writer)?;
        self.position += copied;
        check_payload(size, copied)?;
        Ok(copied)
    }

    /// Discards the payload of the current record, if any.
    pub fn skip_payload(&mut self) -> Result<()> {
        self.read_payload_to(&mut io::sink())?;
        Ok(())
    }

    /// Reads the next member into memory.
    ///
    /// The buffer is allocated up front for the declared size, so a member
    /// that cannot fit in memory fails with [`Error::OutOfMemory`] before
    /// any payload is read.
    pub fn read_next_member_to_vec(&mut self) -> Result<Option<(MemberInfo, Vec<u8>)>> {
        let Some(info) = self.next_header()? else {
            return Ok(None);
        };
        let oom = || Error::OutOfMemory {
            requested: info.size,
        };
        let len = usize::try_from(info.size).map_err(|_| oom())?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| oom())?;
        self.read_payload_to(&mut data)?;
        Ok(Some((info, data)))
    }

    /// Extracts the next member to `out_dir/<name>` with strict path checks.
    ///
    /// Returns `Ok(None)` once the container is exhausted. The output file
    /// is created or truncated.
    ///
    /// # Errors
    ///
    /// - [`Error::Truncated`] if the record is cut short
    /// - [`Error::PathTraversal`] if the name is not a plain file name
    /// - [`Error::OpenFailed`] if the output file cannot be created
    /// - [`Error::Io`] on any other read or write failure
    pub fn read_next_member(&mut self, out_dir: impl AsRef<Path>) -> Result<Option<MemberInfo>> {
        self.read_next_member_with(out_dir, &UnpackOptions::default())
    }

    /// Extracts the next member with explicit options.
    pub fn read_next_member_with(
        &mut self,
        out_dir: impl AsRef<Path>,
        options: &UnpackOptions,
    ) -> Result<Option<MemberInfo>> {
        let Some(info) = self.next_header()? else {
            return Ok(None);
        };
        self.extract_pending(&info, out_dir.as_ref(), options)?;
        Ok(Some(info))
    }

    /// Writes the payload of the header just read to its output file.
    pub(crate) fn extract_pending(
        &mut self,
        info: &MemberInfo,
        out_dir: &Path,
        options: &UnpackOptions,
    ) -> Result<()> {
        let path = resolve_member_path(&info.name, out_dir, options.path_safety)?;
        let mut out = create_output(&path, options.path_safety)?;
        self.read_payload_to(&mut out)?;
        out.flush()?;
        log::debug!(
            "extracted member '{}' ({} bytes) to '{}'",
            info.name,
            info.size,
            path.display()
        );
        Ok(())
    }

    /// Iterates over the remaining member headers, skipping payloads.
    ///
    /// The iterator stops after the first error.
    pub fn members(&mut self) -> Members<'_, R> {
        Members {
            reader: self,
            done: false,
        }
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn check_payload(size: u64, copied: u64) -> Result<()> {
    if copied < size {
        return Err(Error::Truncated {
            field: RecordField::Payload,
            expected: size,
            actual: copied,
        });
    }
    Ok(())
}

fn create_output(path: &Path, policy: PathSafety) -> Result<io::BufWriter<File>> {
    if policy != PathSafety::Strict {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::open_failed(parent, e))?;
        }
    }
    let file = File::create(path).map_err(|e| Error::open_failed(path, e))?;
    Ok(io::BufWriter::new(file))
}

/// Iterator over member headers. See [`ContainerReader::members`].
#[derive(Debug)]
pub struct Members<'a, R: Read> {
    reader: &'a mut ContainerReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Members<'_, R> {
    type Item = Result<MemberInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_header() {
            Ok(Some(info)) => Some(Ok(info)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
