//! The table of substrings that reveal embedded metadata.

use std::borrow::Cow;

use serde::Serialize;

use crate::error::{InspectError, InspectResult};

/// Name of the marker for XMP packets.
pub const XMP_META: &str = "xmp-meta";
/// Opening element of every XMP packet.
pub const XMP_META_PATTERN: &str = "<x:xmpmeta";
/// Name of the marker for DJI-style gimbal/optical-center calibration text.
pub const VENDOR_OPTICAL_CENTER: &str = "vendor-optical-center";
/// Key written by drone vendors into opaque byte tags.
pub const VENDOR_OPTICAL_CENTER_PATTERN: &str = "RelativeOpticalCenter";

/// The kinds of decoded values a marker is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkerScope {
    /// ASCII-typed values only.
    Text,
    /// Raw byte values only, after a lossy UTF-8 decode.
    Bytes,
    /// Both text and raw byte values.
    Both,
}

impl MarkerScope {
    /// Returns `true` if a marker with this scope applies to values of kind `kind`.
    pub fn covers(self, kind: MarkerScope) -> bool {
        self == MarkerScope::Both || self == kind
    }
}

/// A named, literal, case-sensitive substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    name: Cow<'static, str>,
    pattern: Cow<'static, str>,
    scope: MarkerScope,
}

impl Marker {
    /// Create a new marker.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        pattern: impl Into<Cow<'static, str>>,
        scope: MarkerScope,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            scope,
        }
    }

    /// The name reported in findings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The substring searched for.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Which value kinds the marker is tested against.
    pub fn scope(&self) -> MarkerScope {
        self.scope
    }

    /// Unanchored substring match; partial or corrupted packets still match.
    pub fn matches(&self, text: &str) -> bool {
        text.contains(self.pattern.as_ref())
    }
}

/// The ordered set of markers a scanner tests. Earlier markers win when several match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRegistry(Vec<Marker>);

impl MarkerRegistry {
    /// Create a new, empty `MarkerRegistry`
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a marker to the table.
    ///
    /// Fails if a marker with the same name is already registered or the pattern is empty.
    pub fn register(&mut self, marker: Marker) -> InspectResult<()> {
        if marker.pattern.is_empty() {
            return Err(InspectError::General(format!(
                "Marker {:?} has an empty pattern",
                marker.name
            )));
        }
        if self.0.iter().any(|existing| existing.name == marker.name) {
            return Err(InspectError::General(format!(
                "Marker {:?} already registered in {self:?}!",
                marker.name
            )));
        }
        self.0.push(marker);
        Ok(())
    }

    /// The registered markers, in test order.
    pub fn markers(&self) -> &[Marker] {
        &self.0
    }

    /// The first marker that applies to `kind` and matches `text`.
    pub fn find(&self, text: &str, kind: MarkerScope) -> Option<&Marker> {
        self.0
            .iter()
            .find(|marker| marker.scope.covers(kind) && marker.matches(text))
    }
}

impl Default for MarkerRegistry {
    /// XMP packets in text and byte values, vendor optical-center data in byte values.
    fn default() -> Self {
        Self(vec![
            Marker::new(XMP_META, XMP_META_PATTERN, MarkerScope::Both),
            Marker::new(
                VENDOR_OPTICAL_CENTER,
                VENDOR_OPTICAL_CENTER_PATTERN,
                MarkerScope::Bytes,
            ),
        ])
    }
}
