//! Plain text rendering of reports.

use std::io::{self, Write};
use std::path::Path;

use crate::ifd::TagEntry;
use crate::inspect::{DirectoryLocation, Report};
use crate::scanner::Finding;

/// Values with more elements than this are shown as [`LARGE_DATA`].
pub const DEFAULT_TRUNCATE: usize = 20;

/// Placeholder printed instead of a long value.
pub const LARGE_DATA: &str = "[Large Data]";

/// Renders entries and findings as lines of text.
///
/// Truncation only applies to entry values. Findings always carry their full text.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    truncate: usize,
    tag_names: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            truncate: DEFAULT_TRUNCATE,
            tag_names: false,
        }
    }
}

impl TextRenderer {
    /// Show values of up to `truncate` elements in full.
    pub fn with_truncate(mut self, truncate: usize) -> Self {
        self.truncate = truncate;
        self
    }

    /// Append the name of well-known tags, e.g. `Tag 700 (XMP): ...`.
    pub fn with_tag_names(mut self, tag_names: bool) -> Self {
        self.tag_names = tag_names;
        self
    }

    /// `Tag <id>: <value>`
    pub fn entry(&self, entry: &TagEntry) -> String {
        let label = match entry.name() {
            Some(name) if self.tag_names => format!("Tag {} ({name})", entry.tag),
            _ => format!("Tag {}", entry.tag),
        };
        if entry.value.len() > self.truncate {
            format!("{label}: {LARGE_DATA}")
        } else {
            format!("{label}: {}", entry.value)
        }
    }

    /// `FOUND <marker> in Tag <id>` followed by the decoded text on the next line.
    pub fn finding(&self, finding: &Finding) -> String {
        format!("FOUND {} in Tag {}\n{}", finding.marker, finding.tag, finding.text)
    }

    /// Write the whole report for `path`.
    pub fn write_report<W: Write>(
        &self,
        out: &mut W,
        path: &Path,
        report: &Report,
    ) -> io::Result<()> {
        writeln!(out, "File: {}", path.display())?;
        for dir in &report.directories {
            match dir.location {
                DirectoryLocation::Main(index) => {
                    writeln!(out, "IFD {index} at offset {}", dir.ifd.offset())?
                }
                DirectoryLocation::SubIfd { parent_tag, offset } => {
                    writeln!(out, "Sub-IFD of tag {parent_tag} at offset {offset}")?
                }
            }
            for entry in dir.ifd.entries() {
                writeln!(out, "{}", self.entry(entry))?;
            }
            for finding in &dir.findings {
                writeln!(out, "{}", self.finding(finding))?;
            }
        }
        Ok(())
    }
}
