#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod batch;
#[cfg(feature = "cli")]
pub mod config;
pub mod display;
pub mod error;
pub mod ifd;
pub mod inspect;
pub mod metadata;
pub mod reader;
pub mod scanner;
pub mod tags;
pub mod value;

pub use ifd::{ImageFileDirectory, TagEntry};
pub use inspect::{Inspector, Report};
pub use metadata::parse;
pub use scanner::{scan, Finding};
pub use value::TagValue;
