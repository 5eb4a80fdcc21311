//! Image File Directories and their entries.

use serde::Serialize;

use crate::tags::{self, Type};
use crate::value::TagValue;

/// One record of an Image File Directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagEntry {
    /// The tag id, e.g. 700 for XMP.
    pub tag: u16,
    /// The raw field type code. Unknown codes are kept as-is and their value decoded as bytes.
    pub field_type: u16,
    /// Number of values of `field_type`.
    pub count: u32,
    /// The decoded value.
    pub value: TagValue,
}

impl TagEntry {
    /// The field type, if the code is one of the known TIFF types.
    pub fn known_type(&self) -> Option<Type> {
        Type::try_from(self.field_type).ok()
    }

    /// Name of the tag, if it is a well-known one.
    pub fn name(&self) -> Option<&'static str> {
        tags::tag_name(self.tag)
    }
}

/// An Image File Directory: its entries in the order they were stored, plus the link to the next
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageFileDirectory {
    /// The byte offset this directory was read from.
    pub(crate) offset: u64,
    pub(crate) entries: Vec<TagEntry>,
    /// `None` marks the last directory of the chain.
    pub(crate) next_ifd_offset: Option<u64>,
}

impl ImageFileDirectory {
    /// Create a directory from entries already decoded.
    pub fn new(offset: u64, entries: Vec<TagEntry>, next_ifd_offset: Option<u64>) -> Self {
        Self {
            offset,
            entries,
            next_ifd_offset,
        }
    }

    /// The byte offset this directory was read from.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The entries, in stored order.
    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    /// Consume the directory, returning its entries.
    pub fn into_entries(self) -> Vec<TagEntry> {
        self.entries
    }

    /// The byte offset of the following directory, or `None` if this one is the last.
    pub fn next_ifd_offset(&self) -> Option<u64> {
        self.next_ifd_offset
    }

    /// Returns the first entry with the given tag id.
    pub fn get(&self, tag: u16) -> Option<&TagEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }

    /// Offsets of sub-directories referenced from this directory (Exif, GPS, Interoperability and
    /// SubIFDs), paired with the tag that referenced them.
    ///
    /// Zero offsets are skipped.
    pub fn sub_ifd_offsets(&self) -> Vec<(u16, u64)> {
        self.entries
            .iter()
            .filter(|entry| tags::SUB_IFD_POINTERS.contains(&entry.tag))
            .flat_map(|entry| {
                entry
                    .value
                    .scalars()
                    .iter()
                    .filter_map(|scalar| scalar.as_u64())
                    .filter(|&offset| offset != 0)
                    .map(move |offset| (entry.tag, offset))
            })
            .collect()
    }
}
