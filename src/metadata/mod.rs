//! API for reading metadata out of a TIFF file.
//!
//! ### Reading the first IFD
//!
//! [`parse`] validates the header and decodes the first Image File Directory of an in-memory
//! buffer. Every out-of-line value is bounds-checked against the buffer before it is sliced, so a
//! malformed file yields a [`ParseError`][crate::error::ParseError] and never a partial
//! directory.
//!
//! ### Reading all TIFF metadata
//!
//! We can use [`TiffMetadataReader::read_all_ifds`] to follow the chain of IFDs:
//!
//! ```
//! use tiff_inspect::metadata::TiffMetadataReader;
//!
//! // little endian, first IFD at 8 holding no entries
//! let data = vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0];
//! let mut metadata_reader = TiffMetadataReader::try_open(data).unwrap();
//! let ifds = metadata_reader.read_all_ifds().unwrap();
//! assert!(!ifds.is_empty());
//! ```

mod cursor;
mod reader;

pub use reader::{parse, ImageFileDirectoryReader, TiffHeader, TiffMetadataReader, TIFF_MAGIC};
