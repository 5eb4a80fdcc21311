//! Parsing and scanning of one file.

use std::collections::HashSet;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ParseResult;
use crate::ifd::ImageFileDirectory;
use crate::metadata::{TiffHeader, TiffMetadataReader};
use crate::scanner::{EmbeddedMetadataScanner, Finding, MarkerRegistry};

/// Where in the file a directory was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryLocation {
    /// The n-th directory of the main chain, starting at 0.
    Main(usize),
    /// A directory referenced by a pointer tag such as ExifIFD.
    SubIfd {
        /// The tag holding the pointer.
        parent_tag: u16,
        /// The byte offset of the directory.
        offset: u64,
    },
}

/// One directory and what the scanner found in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryReport {
    /// Where the directory lives.
    pub location: DirectoryLocation,
    /// The decoded directory.
    pub ifd: ImageFileDirectory,
    /// Findings in stored entry order.
    pub findings: Vec<Finding>,
}

/// Everything learned from one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The file header.
    pub header: TiffHeader,
    /// Directories in the order they were read: the main chain first, then sub-IFDs.
    pub directories: Vec<DirectoryReport>,
}

impl Report {
    /// All findings across every directory.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.directories.iter().flat_map(|dir| dir.findings.iter())
    }
}

/// Runs the directory reader and the scanner over a buffer.
///
/// By default only the first IFD is read, which is where XMP and vendor tags live in camera and
/// drone TIFFs.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    scanner: EmbeddedMetadataScanner,
    all_ifds: bool,
    exif_sub_ifds: bool,
}

impl Inspector {
    /// Create an inspector that tests the markers of `registry`.
    pub fn new(registry: MarkerRegistry) -> Self {
        Self {
            scanner: EmbeddedMetadataScanner::new(registry),
            ..Default::default()
        }
    }

    /// Follow the whole chain of IFDs instead of stopping after the first.
    pub fn with_all_ifds(mut self, all_ifds: bool) -> Self {
        self.all_ifds = all_ifds;
        self
    }

    /// Also read directories referenced by ExifIFD, GPSInfoIFD, InteroperabilityIFD and SubIFDs.
    pub fn with_exif_sub_ifds(mut self, exif_sub_ifds: bool) -> Self {
        self.exif_sub_ifds = exif_sub_ifds;
        self
    }

    /// The scanner in use.
    pub fn scanner(&self) -> &EmbeddedMetadataScanner {
        &self.scanner
    }

    /// Parse `data` and scan every directory read.
    ///
    /// Errors in the main chain are returned; a sub-IFD that fails to parse is skipped with a
    /// warning.
    pub fn inspect(&self, data: impl Into<Bytes>) -> ParseResult<Report> {
        let mut reader = TiffMetadataReader::try_open(data)?;
        let header = *reader.header();

        let mut main = Vec::new();
        while let Some(ifd) = reader.read_next_ifd()? {
            main.push(ifd);
            if !self.all_ifds {
                break;
            }
        }

        let mut directories = main
            .into_iter()
            .enumerate()
            .map(|(index, ifd)| self.report(DirectoryLocation::Main(index), ifd))
            .collect::<Vec<_>>();

        if self.exif_sub_ifds {
            let sub_ifds = self.read_sub_ifds(&reader, &directories);
            directories.extend(sub_ifds);
        }

        debug!(
            directories = directories.len(),
            findings = directories.iter().map(|d| d.findings.len()).sum::<usize>(),
            "inspected file"
        );
        Ok(Report {
            header,
            directories,
        })
    }

    fn report(&self, location: DirectoryLocation, ifd: ImageFileDirectory) -> DirectoryReport {
        let findings = self.scanner.scan_all(ifd.entries());
        DirectoryReport {
            location,
            ifd,
            findings,
        }
    }

    /// Breadth-first walk over pointer tags, visiting each offset once.
    fn read_sub_ifds(
        &self,
        reader: &TiffMetadataReader,
        roots: &[DirectoryReport],
    ) -> Vec<DirectoryReport> {
        let mut seen = roots.iter().map(|dir| dir.ifd.offset()).collect::<HashSet<_>>();
        let mut pending = roots
            .iter()
            .flat_map(|dir| dir.ifd.sub_ifd_offsets())
            .collect::<Vec<_>>();
        let mut out = Vec::new();

        let mut idx = 0;
        while idx < pending.len() {
            let (parent_tag, offset) = pending[idx];
            idx += 1;
            if !seen.insert(offset) {
                continue;
            }
            match reader.read_ifd_at(offset) {
                Ok(ifd) => {
                    pending.extend(ifd.sub_ifd_offsets());
                    out.push(self.report(DirectoryLocation::SubIfd { parent_tag, offset }, ifd));
                }
                Err(err) => warn!(parent_tag, offset, %err, "skipping unreadable sub-IFD"),
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[rustfmt::skip]
    fn two_ifds_with_exif() -> Vec<u8> {
        vec![
            0x49, 0x49, 0x2A, 0x00, 8, 0, 0, 0,
            // IFD 0 at 8: ExifIFD -> 44, next IFD at 38
            2, 0,
            0x69, 0x87, 4, 0, 1, 0, 0, 0, 44, 0, 0, 0,
            0x0e, 0x01, 2, 0, 4, 0, 0, 0, b'a', b'b', b'c', 0,
            38, 0, 0, 0,
            // IFD 1 at 38: no entries
            0, 0,
            0, 0, 0, 0,
            // Exif IFD at 44: MakerNote holding vendor text at 62
            1, 0,
            0x7c, 0x92, 7, 0, 21, 0, 0, 0, 62, 0, 0, 0,
            0, 0, 0, 0,
            b'R', b'e', b'l', b'a', b't', b'i', b'v', b'e', b'O', b'p', b't', b'i', b'c', b'a', b'l',
            b'C', b'e', b'n', b't', b'e', b'r',
        ]
    }

    #[test]
    fn test_first_ifd_only_by_default() {
        let report = Inspector::default().inspect(two_ifds_with_exif()).unwrap();
        assert_eq!(report.directories.len(), 1);
        assert_eq!(report.directories[0].location, DirectoryLocation::Main(0));
        assert_eq!(report.directories[0].ifd.entries().len(), 2);
        assert_eq!(report.findings().count(), 0);
    }

    #[test]
    fn test_all_ifds_and_exif() {
        let report = Inspector::default()
            .with_all_ifds(true)
            .with_exif_sub_ifds(true)
            .inspect(two_ifds_with_exif())
            .unwrap();
        let locations = report
            .directories
            .iter()
            .map(|dir| dir.location)
            .collect::<Vec<_>>();
        assert_eq!(
            locations,
            vec![
                DirectoryLocation::Main(0),
                DirectoryLocation::Main(1),
                DirectoryLocation::SubIfd {
                    parent_tag: 34665,
                    offset: 44
                },
            ]
        );
        let findings = report.findings().collect::<Vec<_>>();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag, 37500);
        assert_eq!(findings[0].marker, "vendor-optical-center");
    }

    #[test]
    fn test_bad_sub_ifd_is_skipped() {
        let mut data = two_ifds_with_exif();
        // ExifIFD pointer past the end of the file
        data[18] = 0xff;
        let report = Inspector::default()
            .with_exif_sub_ifds(true)
            .inspect(data)
            .unwrap();
        assert_eq!(report.directories.len(), 1);
    }
}
