//! Command line configuration for the `tiff-inspect` binary.
//!
//! Every option can also be set through an environment variable with the `TIFF_INSPECT_` prefix:
//!
//! - `TIFF_INSPECT_PATHS` - files or directories to inspect (default: .)
//! - `TIFF_INSPECT_RECURSIVE` - descend into subdirectories
//! - `TIFF_INSPECT_EXTENSIONS` - comma-separated extensions (default: tif,tiff)
//! - `TIFF_INSPECT_ALL_IFDS` - follow the whole IFD chain
//! - `TIFF_INSPECT_EXIF` - read Exif, GPS, Interoperability and SubIFD directories
//! - `TIFF_INSPECT_JSON` - print JSON instead of text
//! - `TIFF_INSPECT_TRUNCATE` - longest value printed in full (default: 20)
//! - `TIFF_INSPECT_JOBS` - files inspected concurrently (default: 4)

use std::path::PathBuf;

use clap::Parser;

use crate::batch::DEFAULT_EXTENSIONS;
use crate::display::DEFAULT_TRUNCATE;
use crate::inspect::Inspector;

/// Default number of files inspected at once.
pub const DEFAULT_JOBS: usize = 4;

/// Find XMP packets and vendor metadata hidden in TIFF tags.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiff-inspect")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Files or directories to inspect.
    #[arg(env = "TIFF_INSPECT_PATHS", value_delimiter = ',', default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long, env = "TIFF_INSPECT_RECURSIVE")]
    pub recursive: bool,

    /// File extensions to pick up when walking directories.
    #[arg(
        short,
        long = "ext",
        env = "TIFF_INSPECT_EXTENSIONS",
        value_delimiter = ',',
        default_values_t = DEFAULT_EXTENSIONS.map(String::from)
    )]
    pub extensions: Vec<String>,

    /// Follow the whole chain of IFDs instead of only the first.
    #[arg(long, env = "TIFF_INSPECT_ALL_IFDS")]
    pub all_ifds: bool,

    /// Also read Exif, GPS, Interoperability and SubIFD directories.
    #[arg(long, env = "TIFF_INSPECT_EXIF")]
    pub exif: bool,

    /// Print one JSON document per file instead of text.
    #[arg(long, env = "TIFF_INSPECT_JSON")]
    pub json: bool,

    /// Values with more elements than this are printed as "[Large Data]".
    #[arg(long, default_value_t = DEFAULT_TRUNCATE, env = "TIFF_INSPECT_TRUNCATE")]
    pub truncate: usize,

    /// Number of files inspected concurrently.
    #[arg(short, long, default_value_t = DEFAULT_JOBS, env = "TIFF_INSPECT_JOBS")]
    pub jobs: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.jobs == 0 {
            return Err("jobs must be greater than 0".to_string());
        }
        if self.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err("at least one non-empty extension is required".to_string());
        }
        Ok(())
    }

    /// Build the inspector described by the flags.
    pub fn inspector(&self) -> Inspector {
        Inspector::default()
            .with_all_ifds(self.all_ifds)
            .with_exif_sub_ifds(self.exif)
    }
}
