//! Discovery of structured payloads hidden in tag values.
//!
//! TIFF field types are advisory. Vendors routinely store XML or key-value text inside entries
//! typed as opaque bytes, or inside tags that were never meant for metadata. The scanner decodes
//! every text and byte value and tests it against a [`MarkerRegistry`]. It never fails: values
//! that do not decode to useful text simply produce no finding.
//!
//! ```
//! use bytes::Bytes;
//! use tiff_inspect::ifd::TagEntry;
//! use tiff_inspect::scanner::scan;
//! use tiff_inspect::value::TagValue;
//!
//! let entries = [TagEntry {
//!     tag: 700,
//!     field_type: 7,
//!     count: 26,
//!     value: TagValue::Bytes(Bytes::from_static(b"<x:xmpmeta xmlns:x=\"adobe\"")),
//! }];
//! let findings = scan(&entries);
//! assert_eq!(findings[0].marker, "xmp-meta");
//! ```

mod markers;

use std::borrow::Cow;

use serde::Serialize;
use tracing::trace;

use crate::ifd::TagEntry;
use crate::value::TagValue;

pub use markers::{
    Marker, MarkerRegistry, MarkerScope, VENDOR_OPTICAL_CENTER, VENDOR_OPTICAL_CENTER_PATTERN,
    XMP_META, XMP_META_PATTERN,
};

/// A tag value that contains one of the registered markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// The tag id owning the value.
    pub tag: u16,
    /// Name of the marker that matched.
    pub marker: String,
    /// The full decoded text of the value.
    pub text: String,
}

/// Tests tag values against a marker table.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedMetadataScanner {
    registry: MarkerRegistry,
}

impl EmbeddedMetadataScanner {
    /// Create a scanner testing the markers of `registry`.
    pub fn new(registry: MarkerRegistry) -> Self {
        Self { registry }
    }

    /// The marker table in use.
    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Lazily scan `entries` in order, yielding at most one finding per entry.
    pub fn scan<'a>(&'a self, entries: &'a [TagEntry]) -> impl Iterator<Item = Finding> + 'a {
        entries.iter().filter_map(move |entry| self.scan_entry(entry))
    }

    /// Scan `entries`, collecting every finding.
    pub fn scan_all(&self, entries: &[TagEntry]) -> Vec<Finding> {
        self.scan(entries).collect()
    }

    /// Test a single entry. Numeric values never match.
    pub fn scan_entry(&self, entry: &TagEntry) -> Option<Finding> {
        let (text, kind) = match &entry.value {
            TagValue::Text(text) => (Cow::Borrowed(text.as_str()), MarkerScope::Text),
            TagValue::Bytes(bytes) => (decode_text(bytes)?, MarkerScope::Bytes),
            TagValue::Scalar(_) | TagValue::Sequence(_) => return None,
        };
        let marker = self.registry.find(&text, kind)?;
        trace!(tag = entry.tag, marker = marker.name(), "marker matched");
        Some(Finding {
            tag: entry.tag,
            marker: marker.name().to_string(),
            text: text.into_owned(),
        })
    }
}

/// Scan `entries` with the default markers.
pub fn scan(entries: &[TagEntry]) -> Vec<Finding> {
    EmbeddedMetadataScanner::default().scan_all(entries)
}

/// Best-effort text view of raw bytes.
///
/// Invalid UTF-8 is replaced rather than rejected, which only lowers the chance of a match.
fn decode_text(bytes: &[u8]) -> Option<Cow<'_, str>> {
    if bytes.is_empty() {
        return None;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(Cow::Borrowed(text)),
        Err(err) => {
            trace!(valid_up_to = err.valid_up_to(), "lossy decode of byte value");
            Some(String::from_utf8_lossy(bytes))
        }
    }
}
