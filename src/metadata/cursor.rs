use bytes::Bytes;

use crate::error::ParseError;
use crate::reader::Endianness;

/// A request that reaches past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OutOfBounds {
    pub offset: u64,
    pub needed: u64,
    pub available: u64,
}

impl From<OutOfBounds> for ParseError {
    fn from(err: OutOfBounds) -> Self {
        ParseError::TruncatedDirectory {
            offset: err.offset,
            needed: err.needed,
            available: err.available,
        }
    }
}

/// Bounds-checked slicing of a byte range of the file.
pub(crate) fn slice(data: &Bytes, offset: u64, length: u64) -> Result<Bytes, OutOfBounds> {
    let file_size = data.len() as u64;
    let out_of_bounds = OutOfBounds {
        offset,
        needed: length,
        available: file_size.saturating_sub(offset),
    };
    let end = offset.checked_add(length).ok_or(out_of_bounds)?;
    if end > file_size {
        return Err(out_of_bounds);
    }
    Ok(data.slice(offset as usize..end as usize))
}

/// A position in the file buffer that reads endian-aware values forward.
pub(crate) struct MetadataCursor<'a> {
    data: &'a Bytes,
    offset: u64,
    endianness: Endianness,
}

impl<'a> MetadataCursor<'a> {
    pub fn new_with_offset(data: &'a Bytes, endianness: Endianness, offset: u64) -> Self {
        Self {
            data,
            offset,
            endianness,
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> u64 {
        (self.data.len() as u64).saturating_sub(self.offset)
    }

    /// Read the given number of bytes, advancing the internal cursor state by the same amount.
    pub fn read(&mut self, length: u64) -> Result<Bytes, OutOfBounds> {
        let bytes = slice(self.data, self.offset, length)?;
        self.offset += length;
        Ok(bytes)
    }

    /// Read a u16 from the cursor, advancing the internal state by 2 bytes.
    pub fn read_u16(&mut self) -> Result<u16, OutOfBounds> {
        Ok(self.endianness.read_u16(&self.read(2)?))
    }

    /// Read a u32 from the cursor, advancing the internal state by 4 bytes.
    pub fn read_u32(&mut self) -> Result<u32, OutOfBounds> {
        Ok(self.endianness.read_u32(&self.read(4)?))
    }
}
