//! Sequential container of compressed members.
//!
//! A container is a plain concatenation of member records with no header,
//! footer, count field or index:
//!
//! ```text
//! Member    := NAME(20 bytes) SIZE(8 bytes, unsigned, native order) PAYLOAD(SIZE bytes)
//! Container := Member*
//! ```
//!
//! The only way to reach member N+1 is to consume member N completely, so
//! [`ContainerReader`] walks records strictly in order.
//!
//! # Name field
//!
//! Names are written as their bytes followed by zero padding up to 20
//! bytes. When reading, the name ends at the first NUL byte; anything after
//! it is ignored, so archives whose padding holds arbitrary bytes still
//! decode. The bytes before the NUL are kept as they are: containers built
//! by other tools may use a legacy single-byte code page, so they are not
//! required to be UTF-8.

pub mod header;
pub mod reader;
pub mod writer;

pub use header::MemberHeader;
pub use reader::{ContainerReader, Members, UnpackOptions};
pub use writer::{ContainerWriter, PackOptions, PackResult};

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Width of the name field in bytes.
pub const NAME_LEN: usize = 20;

/// Width of the size field in bytes.
pub const SIZE_LEN: usize = 8;

/// Bytes preceding each payload.
pub const HEADER_LEN: usize = NAME_LEN + SIZE_LEN;

/// A member name that fits the fixed-width name field.
///
/// # Examples
///
/// ```
/// use zpack::MemberName;
///
/// let name = MemberName::new("manifest.cxml").unwrap();
/// assert_eq!(name.to_str(), Some("manifest.cxml"));
/// assert_eq!(&name.field()[13..], &[0u8; 7]);
///
/// assert!(MemberName::new("a_name_longer_than_twenty.bin").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MemberName {
    field: [u8; NAME_LEN],
    len: usize,
}

impl MemberName {
    /// Validates `name` and zero-pads it to the field width.
    ///
    /// # Errors
    ///
    /// - [`Error::NameTooLong`] if the name is longer than 20 bytes
    /// - [`Error::InvalidMemberName`] if it is empty or contains a NUL byte
    pub fn new(name: &str) -> Result<Self> {
        Self::from_bytes(name.as_bytes()).map_err(|e| match e {
            Error::NameTooLong { len, .. } => Error::NameTooLong {
                name: name.to_string(),
                len,
            },
            other => other,
        })
    }

    /// Validates raw name bytes and zero-pads them to the field width.
    ///
    /// The bytes do not have to be UTF-8.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidMemberName {
                reason: "name is empty".into(),
            });
        }
        if bytes.contains(&0) {
            return Err(Error::InvalidMemberName {
                reason: format!(
                    "name {:?} contains a NUL byte",
                    String::from_utf8_lossy(bytes)
                ),
            });
        }
        if bytes.len() > NAME_LEN {
            return Err(Error::NameTooLong {
                name: String::from_utf8_lossy(bytes).into_owned(),
                len: bytes.len(),
            });
        }

        let mut field = [0u8; NAME_LEN];
        field[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            field,
            len: bytes.len(),
        })
    }

    /// Decodes a name field read from a container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMemberName`] if the field starts with NUL.
    pub fn from_field(raw: [u8; NAME_LEN]) -> Result<Self> {
        let len = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        if len == 0 {
            return Err(Error::InvalidMemberName {
                reason: "name field is empty".into(),
            });
        }

        let mut field = [0u8; NAME_LEN];
        field[..len].copy_from_slice(&raw[..len]);
        Ok(Self { field, len })
    }

    /// The name bytes, without padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.field[..self.len]
    }

    /// The name as a string slice, if it is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// The name as text, with invalid UTF-8 replaced by `U+FFFD`.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// The zero-padded on-disk field.
    pub fn field(&self) -> &[u8; NAME_LEN] {
        &self.field
    }

    /// Length of the name in bytes, without padding.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; empty names are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MemberName")
            .field(&self.to_string_lossy())
            .finish()
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl FromStr for MemberName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for MemberName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<[u8]> for MemberName {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Description of one member record in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// The member name.
    pub name: MemberName,
    /// Payload size in bytes.
    pub size: u64,
    /// Offset of the record's name field from the start of the container.
    pub offset: u64,
}

impl MemberInfo {
    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> u64 {
        self.offset + HEADER_LEN as u64
    }

    /// Total bytes the record occupies, header included.
    pub fn record_len(&self) -> u64 {
        HEADER_LEN as u64 + self.size
    }
}
