use std::collections::HashSet;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::ifd::{ImageFileDirectory, TagEntry};
use crate::metadata::cursor::{slice, MetadataCursor};
use crate::reader::Endianness;
use crate::tags;
use crate::value::TagValue;

/// The classic TIFF version number.
pub const TIFF_MAGIC: u16 = 42;
/// Numeric values decoded per IFD before [`ParseError::TooManyValues`] is returned.
pub const DEFAULT_VALUE_LIMIT: u64 = 1 << 22;

/// The BigTIFF version number, recognized only to give a clearer error.
const BIGTIFF_MAGIC: u16 = 43;

/// The 8-byte header at the start of every TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiffHeader {
    /// Byte order of every multi-byte value in the file.
    pub endianness: Endianness,
    /// The byte offset of the first IFD.
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Size of the header in bytes.
    pub const SIZE: u64 = 8;

    /// Validate the byte-order marker and magic number and read the first IFD offset.
    pub fn parse(data: &[u8]) -> ParseResult<Self> {
        if (data.len() as u64) < Self::SIZE {
            return Err(ParseError::InvalidHeader(format!(
                "expected at least {} bytes, got {}",
                Self::SIZE,
                data.len()
            )));
        }

        let endianness = Endianness::from_marker(&data[..2]).ok_or_else(|| {
            ParseError::InvalidHeader(format!("unexpected magic bytes {:?}", &data[..2]))
        })?;

        match endianness.read_u16(&data[2..4]) {
            TIFF_MAGIC => {}
            BIGTIFF_MAGIC => {
                return Err(ParseError::InvalidHeader(
                    "BigTIFF files are not supported".to_string(),
                ))
            }
            version => {
                return Err(ParseError::InvalidHeader(format!(
                    "unexpected version number {version}"
                )))
            }
        }

        let first_ifd_offset = endianness.read_u32(&data[4..8]).into();
        if first_ifd_offset < Self::SIZE {
            return Err(ParseError::InvalidHeader(format!(
                "first IFD offset {first_ifd_offset} overlaps the header"
            )));
        }

        Ok(Self {
            endianness,
            first_ifd_offset,
        })
    }
}

/// Parse the header and the first IFD of a TIFF file held in memory.
///
/// ```
/// let data = [0x49, 0x49, 0x2A, 0x00, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0];
/// let (header, ifd) = tiff_inspect::metadata::parse(data.to_vec()).unwrap();
/// assert_eq!(header.endianness, tiff_inspect::reader::Endianness::LittleEndian);
/// assert!(ifd.entries().is_empty());
/// assert_eq!(ifd.next_ifd_offset(), None);
/// ```
pub fn parse(data: impl Into<Bytes>) -> ParseResult<(TiffHeader, ImageFileDirectory)> {
    let reader = TiffMetadataReader::try_open(data)?;
    let ifd = reader.read_ifd_at(reader.header.first_ifd_offset)?;
    Ok((reader.header, ifd))
}

/// Entry point to reading TIFF metadata.
///
/// This is a stateful reader because we don't know how many IFDs will be encountered.
///
/// ```
/// # use tiff_inspect::metadata::TiffMetadataReader;
/// # let data = vec![0x4D, 0x4D, 0x00, 0x2A, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0];
/// let mut metadata_reader = TiffMetadataReader::try_open(data).unwrap();
/// let ifds = metadata_reader.read_all_ifds().unwrap();
/// assert_eq!(ifds.len(), 1);
/// ```
#[derive(Debug)]
pub struct TiffMetadataReader {
    data: Bytes,
    header: TiffHeader,
    next_ifd_offset: Option<u64>,
    visited: HashSet<u64>,
    value_limit: u64,
}

impl TiffMetadataReader {
    /// Open a new TIFF file, validating the magic bytes and reading the endianness.
    ///
    /// This does not read any IFD metadata.
    pub fn try_open(data: impl Into<Bytes>) -> ParseResult<Self> {
        let data = data.into();
        let header = TiffHeader::parse(&data)?;
        Ok(Self {
            data,
            header,
            next_ifd_offset: Some(header.first_ifd_offset),
            visited: HashSet::new(),
            value_limit: DEFAULT_VALUE_LIMIT,
        })
    }

    /// Cap the number of numeric values decoded from any one IFD.
    pub fn with_value_limit(mut self, value_limit: u64) -> Self {
        self.value_limit = value_limit;
        self
    }

    /// The parsed file header.
    pub fn header(&self) -> &TiffHeader {
        &self.header
    }

    /// Returns the endianness of the file.
    pub fn endianness(&self) -> Endianness {
        self.header.endianness
    }

    /// Returns `true` if there are more IFDs to read.
    pub fn has_next_ifd(&self) -> bool {
        self.next_ifd_offset.is_some()
    }

    /// The byte offset of the start of the next IFD.
    ///
    /// This will be `None` if all IFDs have already been read.
    pub fn next_ifd_offset(&self) -> Option<u64> {
        self.next_ifd_offset
    }

    /// Read the next IFD of the main chain.
    ///
    /// If there are no more IFDs, returns `None`.
    pub fn read_next_ifd(&mut self) -> ParseResult<Option<ImageFileDirectory>> {
        let Some(ifd_start) = self.next_ifd_offset else {
            return Ok(None);
        };
        if !self.visited.insert(ifd_start) {
            return Err(ParseError::CycleInOffsets(ifd_start));
        }
        let ifd = self.read_ifd_at(ifd_start)?;
        self.next_ifd_offset = ifd.next_ifd_offset();
        Ok(Some(ifd))
    }

    /// Read all IFDs of the main chain.
    pub fn read_all_ifds(&mut self) -> ParseResult<Vec<ImageFileDirectory>> {
        let mut ifds = vec![];
        while let Some(ifd) = self.read_next_ifd()? {
            ifds.push(ifd);
        }
        Ok(ifds)
    }

    /// Read the IFD starting at an arbitrary byte offset, such as an Exif sub-IFD.
    ///
    /// This does not affect the position in the main chain.
    pub fn read_ifd_at(&self, ifd_start: u64) -> ParseResult<ImageFileDirectory> {
        let ifd_reader = ImageFileDirectoryReader::open(&self.data, ifd_start, self.endianness())?;
        let entries = ifd_reader.read_with_limit(&self.data, self.value_limit)?;
        let next_ifd_offset = ifd_reader.finish(&self.data)?;
        debug!(
            offset = ifd_start,
            entries = entries.len(),
            next = ?next_ifd_offset,
            "read IFD"
        );
        Ok(ImageFileDirectory::new(ifd_start, entries, next_ifd_offset))
    }
}

/// Reads the entries of a single IFD.
///
/// Note that you must call [`finish`][ImageFileDirectoryReader::finish] to read the offset of the
/// following IFD.
pub struct ImageFileDirectoryReader {
    endianness: Endianness,
    /// The byte offset of the beginning of this IFD
    ifd_start_offset: u64,
    /// The number of tags in this IFD
    tag_count: u64,
}

impl ImageFileDirectoryReader {
    /// Tag 2 bytes, type 2 bytes, count 4 bytes, value or offset 4 bytes.
    const IFD_ENTRY_BYTE_SIZE: u64 = 12;
    /// The size of the entry count that opens every IFD.
    const TAG_COUNT_BYTE_SIZE: u64 = 2;

    /// Read the entry count of the IFD starting at the given file offset.
    ///
    /// Fails with [`ParseError::TruncatedDirectory`] unless the whole entry table fits in `data`.
    pub fn open(data: &Bytes, ifd_start_offset: u64, endianness: Endianness) -> ParseResult<Self> {
        let mut cursor = MetadataCursor::new_with_offset(data, endianness, ifd_start_offset);
        let tag_count: u64 = cursor.read_u16()?.into();

        let table_size = Self::IFD_ENTRY_BYTE_SIZE * tag_count;
        if cursor.remaining() < table_size {
            return Err(ParseError::TruncatedDirectory {
                offset: ifd_start_offset,
                needed: Self::TAG_COUNT_BYTE_SIZE + table_size,
                available: Self::TAG_COUNT_BYTE_SIZE + cursor.remaining(),
            });
        }

        Ok(Self {
            endianness: cursor.endianness(),
            ifd_start_offset,
            tag_count,
        })
    }

    /// The number of entries declared by this IFD.
    pub fn tag_count(&self) -> u64 {
        self.tag_count
    }

    /// Read the entry with the specified index.
    pub fn read_tag(&self, data: &Bytes, tag_idx: u64) -> ParseResult<TagEntry> {
        let tag_offset = self.ifd_start_offset
            + Self::TAG_COUNT_BYTE_SIZE
            + (Self::IFD_ENTRY_BYTE_SIZE * tag_idx);
        read_tag(data, tag_offset, self.endianness)
    }

    /// Read all entries of this IFD, in stored order.
    ///
    /// Keep in mind that you'll still need to call [`finish`][Self::finish] to get the byte offset
    /// of the next IFD.
    pub fn read(&self, data: &Bytes) -> ParseResult<Vec<TagEntry>> {
        self.read_with_limit(data, DEFAULT_VALUE_LIMIT)
    }

    /// Like [`read`][Self::read], failing once the entries hold more than `value_limit` numeric
    /// values in total.
    pub fn read_with_limit(&self, data: &Bytes, value_limit: u64) -> ParseResult<Vec<TagEntry>> {
        let mut decoded = 0u64;
        let mut entries = Vec::with_capacity(self.tag_count as usize);
        for tag_idx in 0..self.tag_count {
            let entry = self.read_tag(data, tag_idx)?;
            decoded += entry.value.scalars().len() as u64;
            if decoded > value_limit {
                return Err(ParseError::TooManyValues {
                    tag: entry.tag,
                    limit: value_limit,
                });
            }
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Finish this reader, reading the byte offset of the next IFD.
    ///
    /// A buffer that ends right after the entry table is treated as the end of the chain; one that
    /// ends inside the offset field is truncated.
    pub fn finish(self, data: &Bytes) -> ParseResult<Option<u64>> {
        let next_ifd_byte_offset = self.ifd_start_offset
            + Self::TAG_COUNT_BYTE_SIZE
            + (Self::IFD_ENTRY_BYTE_SIZE * self.tag_count);
        let mut cursor = MetadataCursor::new_with_offset(data, self.endianness, next_ifd_byte_offset);

        if cursor.remaining() == 0 {
            debug!(
                offset = next_ifd_byte_offset,
                "file ends before the next IFD offset, treating as last IFD"
            );
            return Ok(None);
        }

        // If the ifd_offset is 0, no more IFDs
        match cursor.read_u32()? {
            0 => Ok(None),
            next_ifd_offset => Ok(Some(next_ifd_offset.into())),
        }
    }
}

/// Read a single entry record starting at `tag_offset`.
fn read_tag(data: &Bytes, tag_offset: u64, endianness: Endianness) -> ParseResult<TagEntry> {
    let mut cursor = MetadataCursor::new_with_offset(data, endianness, tag_offset);

    let tag = cursor.read_u16()?;
    let field_type = cursor.read_u16()?;
    let count = cursor.read_u32()?;
    let value_field = cursor.read(4)?;

    let value = read_tag_value(data, tag, field_type, count, value_field, endianness)?;

    Ok(TagEntry {
        tag,
        field_type,
        count,
        value,
    })
}

/// Resolve an entry's value, either from the 4-byte value field itself or from the file offset it
/// holds.
fn read_tag_value(
    data: &Bytes,
    tag: u16,
    field_type: u16,
    count: u32,
    value_field: Bytes,
    endianness: Endianness,
) -> ParseResult<TagValue> {
    let count = u64::from(count);
    let value_byte_length = tags::unit_size(field_type) * count;

    let value_bytes = if value_byte_length <= 4 {
        value_field.slice(..value_byte_length as usize)
    } else {
        let offset = endianness.read_u32(&value_field).into();
        slice(data, offset, value_byte_length).map_err(|_| ParseError::OffsetOutOfRange {
            tag,
            offset,
            length: value_byte_length,
            file_size: data.len() as u64,
        })?
    };

    Ok(TagValue::decode(field_type, count, value_bytes, endianness))
}
