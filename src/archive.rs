//! Whole-archive operations built from the codec and container layers.
//!
//! [`build_archive`] compresses each source into a temporary blob, writes
//! the container from those blobs and removes them again.
//! [`extract_archive`] and [`list_archive`] walk a container from the first
//! record to the last.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::container::{
    ContainerReader, ContainerWriter, MemberInfo, MemberName, PackOptions, PackResult,
    UnpackOptions,
};
use crate::file::compress_stream;
use crate::progress::ProgressReporter;
use crate::{Error, Result};

/// A file to be compressed and stored as a container member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSource {
    /// Path of the uncompressed input.
    pub path: PathBuf,
    /// Name stored in the container.
    pub name: String,
}

impl MemberSource {
    /// Creates a source with an explicit member name.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Creates a source named after the file's final path component.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMemberName`] if the path has no UTF-8 file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidMemberName {
                reason: format!("'{}' has no usable file name", path.display()),
            })?
            .to_string();
        Ok(Self { path, name })
    }
}

/// Summary of an extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackResult {
    /// Members extracted, in container order.
    pub members: Vec<MemberInfo>,
    /// Total payload bytes written.
    pub bytes_written: u64,
}

/// Temporary compressed blobs awaiting append.
#[derive(Default)]
struct TempBlobs {
    files: Vec<NamedTempFile>,
}

impl TempBlobs {
    /// Deletes every blob, returning a message per failure.
    fn close(self) -> Vec<String> {
        let mut failures = Vec::new();
        for file in self.files {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                let message = format!(
                    "failed to remove temporary file '{}': {}",
                    path.display(),
                    e
                );
                log::warn!("{}", message);
                failures.push(message);
            }
        }
        failures
    }
}

/// Compresses `sources` and writes them as members of a new container.
///
/// All member names are checked before anything is written. Each source
/// is compressed into a temporary file next to the container; the
/// container is then created (or truncated) and the compressed blobs are
/// appended in order. Temporary files are removed whether or not the
/// build succeeds. A removal failure is logged and passed to
/// [`ProgressReporter::on_warning`] but does not fail the build.
///
/// # Errors
///
/// - [`Error::NameTooLong`] / [`Error::InvalidMemberName`] for a bad name
/// - [`Error::OpenFailed`] if a source, temporary or the container cannot be opened
/// - [`Error::Cancelled`] if the progress reporter asks to stop
/// - any codec or container error from the steps above
///
/// # Example
///
/// ```rust,no_run
/// use zpack::{MemberSource, NoProgress, PackOptions, build_archive};
///
/// let sources = [
///     MemberSource::new("manifest.xml", "manifest.cxml"),
///     MemberSource::new("page_1.xml", "page_1.cxml"),
/// ];
/// let result = build_archive("book.dqf", &sources, &PackOptions::default(), NoProgress)?;
/// println!("{} members", result.members.len());
/// # Ok::<(), zpack::Error>(())
/// ```
pub fn build_archive(
    container: impl AsRef<Path>,
    sources: &[MemberSource],
    options: &PackOptions,
    mut progress: impl ProgressReporter,
) -> Result<PackResult> {
    let container = container.as_ref();
    for source in sources {
        MemberName::new(&source.name)?;
    }

    let mut blobs = TempBlobs::default();
    let result = build_from_blobs(container, sources, options, &mut blobs, &mut progress);
    for warning in blobs.close() {
        progress.on_warning(&warning);
    }
    result
}

fn build_from_blobs(
    container: &Path,
    sources: &[MemberSource],
    options: &PackOptions,
    blobs: &mut TempBlobs,
    progress: &mut impl ProgressReporter,
) -> Result<PackResult> {
    let temp_dir = match container.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    progress.on_total(sources.len() as u64);
    for source in sources {
        if progress.should_cancel() {
            return Err(Error::Cancelled);
        }
        let blob = NamedTempFile::new_in(temp_dir).map_err(|e| Error::open_failed(temp_dir, e))?;
        let input = File::open(&source.path).map_err(|e| Error::open_failed(&source.path, e))?;
        let mut output = BufWriter::new(blob.as_file());
        let stats = compress_stream(&mut BufReader::new(input), &mut output, &options.codec)?;
        output.flush()?;
        drop(output);
        log::debug!(
            "compressed '{}' for member '{}' ({} -> {} bytes)",
            source.path.display(),
            source.name,
            stats.bytes_in,
            stats.bytes_out
        );
        blobs.files.push(blob);
    }

    let mut writer =
        ContainerWriter::create_path(container)?.max_buffered_member(options.max_buffered_member);
    let sizes = blobs
        .files
        .iter()
        .map(|f| f.as_file().metadata().map(|m| m.len()))
        .collect::<std::io::Result<Vec<_>>>()?;
    let total: u64 = sizes.iter().sum();
    let mut appended = 0u64;
    for ((source, blob), size) in sources.iter().zip(&blobs.files).zip(sizes) {
        if progress.should_cancel() {
            return Err(Error::Cancelled);
        }
        progress.on_entry_start(&source.name, size);
        match writer.append_member(&source.name, blob.path()) {
            Ok(info) => {
                appended += info.size;
                progress.on_entry_complete(&source.name, true);
                if !progress.on_progress(appended, total) {
                    return Err(Error::Cancelled);
                }
            }
            Err(e) => {
                progress.on_entry_complete(&source.name, false);
                return Err(e);
            }
        }
    }
    writer.finish()
}

/// Extracts every member of `container` into `out_dir`.
///
/// `out_dir` is created if it does not exist. Members are written in
/// container order until the end of the container; the first error stops
/// extraction, leaving earlier members in place.
pub fn extract_archive(
    container: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: &UnpackOptions,
    mut progress: impl ProgressReporter,
) -> Result<UnpackResult> {
    let (container, out_dir) = (container.as_ref(), out_dir.as_ref());
    std::fs::create_dir_all(out_dir).map_err(|e| Error::open_failed(out_dir, e))?;
    let total = std::fs::metadata(container)
        .map_err(|source| Error::StatFailed {
            path: container.to_path_buf(),
            source,
        })?
        .len();

    let mut reader = ContainerReader::open_path(container)?;
    let mut result = UnpackResult::default();
    loop {
        if progress.should_cancel() {
            return Err(Error::Cancelled);
        }
        let Some(info) = reader.next_header()? else {
            break;
        };
        let label = info.name.to_string_lossy();
        progress.on_entry_start(&label, info.size);
        match reader.extract_pending(&info, out_dir, options) {
            Ok(()) => progress.on_entry_complete(&label, true),
            Err(e) => {
                progress.on_entry_complete(&label, false);
                return Err(e);
            }
        }
        result.bytes_written += info.size;
        result.members.push(info);
        if !progress.on_progress(reader.position(), total) {
            return Err(Error::Cancelled);
        }
    }
    log::debug!(
        "extracted {} members from '{}'",
        result.members.len(),
        container.display()
    );
    Ok(result)
}

/// Lists the members of `container` without extracting them.
pub fn list_archive(container: impl AsRef<Path>) -> Result<Vec<MemberInfo>> {
    ContainerReader::open_path(container)?.members().collect()
}
