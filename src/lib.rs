//! # zpack
//!
//! Streaming DEFLATE compression of single files and a minimal sequential
//! container that bundles several compressed blobs under short names.
//!
//! The crate has three layers:
//!
//! - [`codec`]: a chunked driver around the compression engine that keeps
//!   memory bounded regardless of input size
//! - [`file`]: whole-file compress and decompress built on the codec
//! - [`container`]: a packer and an unpacker for the record format below
//!
//! [`build_archive`], [`extract_archive`] and [`list_archive`] combine them
//! for the common "compress these files into one container" workflow.
//!
//! ## Quick Start
//!
//! ### Compressing a File
//!
//! ```rust,no_run
//! use zpack::{Result, compress_file, decompress_file};
//!
//! fn main() -> Result<()> {
//!     let stats = compress_file("manifest.xml", "manifest.cxml")?;
//!     println!("{} -> {} bytes", stats.bytes_in, stats.bytes_out);
//!
//!     decompress_file("manifest.cxml", "manifest.xml.out")?;
//!     Ok(())
//! }
//! ```
//!
//! ### Building and Reading a Container
//!
//! ```rust,no_run
//! use zpack::{ContainerReader, ContainerWriter, Result};
//!
//! fn main() -> Result<()> {
//!     let mut writer = ContainerWriter::create_path("book.dqf")?;
//!     writer.append_member("manifest.cxml", "manifest.cxml")?;
//!     writer.append_member("page_1.cxml", "page_1.cxml")?;
//!     writer.finish()?;
//!
//!     let mut reader = ContainerReader::open_path("book.dqf")?;
//!     while let Some(member) = reader.read_next_member("./res")? {
//!         println!("{}: {} bytes", member.name, member.size);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Container Format
//!
//! ```text
//! Member    := NAME(20 bytes, zero padded) SIZE(u64, native byte order) PAYLOAD(SIZE bytes)
//! Container := Member*
//! ```
//!
//! There is no header, footer or index. The container ends when the input
//! ends exactly at a record boundary. The size field uses the host's byte
//! order, so containers are only portable between hosts of the same
//! endianness.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | The `zpack` command-line tool |
//!
//! ## Safety
//!
//! Member names are untrusted input. Extraction resolves them through
//! [`safety::PathSafety`], which defaults to accepting plain file names only.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive;
pub mod codec;
pub mod container;
pub mod error;
pub mod file;
pub mod progress;
pub mod safety;

pub use archive::{MemberSource, UnpackResult, build_archive, extract_archive, list_archive};
pub use codec::{CodecOptions, Format};
pub use container::{
    ContainerReader, ContainerWriter, HEADER_LEN, MemberInfo, MemberName, NAME_LEN, PackOptions,
    PackResult, SIZE_LEN, UnpackOptions,
};
pub use error::{Error, RecordField, Result};
pub use file::{
    StreamStats, compress_bytes, compress_file, compress_file_with, compress_stream,
    decompress_bytes, decompress_file, decompress_file_with, decompress_stream,
};
pub use progress::{NoProgress, ProgressReporter};
pub use safety::PathSafety;
