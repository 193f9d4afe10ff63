//! Fixed-width member record header.

use std::io::{Read, Write};

use super::{HEADER_LEN, MemberName, NAME_LEN, SIZE_LEN};
use crate::codec::stream::fill_buffer;
use crate::error::RecordField;
use crate::{Error, Result};

/// The 28 bytes preceding each payload: name field then size field.
///
/// The size is stored as an unsigned 64-bit integer in the host's native
/// byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberHeader {
    /// Member name.
    pub name: MemberName,
    /// Payload length in bytes.
    pub size: u64,
}

impl MemberHeader {
    /// Creates a header.
    pub fn new(name: MemberName, size: u64) -> Self {
        Self { name, size }
    }

    /// Serializes the header.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[..NAME_LEN].copy_from_slice(self.name.field());
        buf[NAME_LEN..].copy_from_slice(&self.size.to_ne_bytes());
        buf
    }

    /// Parses a serialized header.
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&buf[..NAME_LEN]);
        let mut size = [0u8; SIZE_LEN];
        size.copy_from_slice(&buf[NAME_LEN..]);
        Ok(Self {
            name: MemberName::from_field(name)?,
            size: u64::from_ne_bytes(size),
        })
    }

    /// Writes the header in one call.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Reads the next header.
    ///
    /// Returns `Ok(None)` when the reader is exhausted exactly at a record
    /// boundary, which is how the end of a container is recognized.
    ///
    /// # Errors
    ///
    /// - [`Error::Truncated`] if the input ends inside the name or size field
    /// - [`Error::InvalidMemberName`] if the name field is empty
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Self>> {
        let Some((name, size)) = read_fields(reader)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            name: MemberName::from_field(name)?,
            size,
        }))
    }
}

/// Reads the raw name and size fields of the next record.
///
/// The name is not validated, so a caller can account for all 28 bytes
/// before deciding whether the record is usable.
pub(crate) fn read_fields<R: Read + ?Sized>(
    reader: &mut R,
) -> Result<Option<([u8; NAME_LEN], u64)>> {
    let mut name = [0u8; NAME_LEN];
    let got = fill_buffer(reader, &mut name)?;
    if got == 0 {
        return Ok(None);
    }
    if got < NAME_LEN {
        return Err(Error::Truncated {
            field: RecordField::Name,
            expected: NAME_LEN as u64,
            actual: got as u64,
        });
    }

    let mut size = [0u8; SIZE_LEN];
    let got = fill_buffer(reader, &mut size)?;
    if got < SIZE_LEN {
        return Err(Error::Truncated {
            field: RecordField::Size,
            expected: SIZE_LEN as u64,
            actual: got as u64,
        });
    }

    Ok(Some((name, u64::from_ne_bytes(size))))
}
