//! Byte order handling.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::Serialize;

/// Endianness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endianness {
    /// Little Endian
    LittleEndian,
    /// Big Endian
    BigEndian,
}

macro_rules! endian_read {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` from the start of `buf`.")]
            ///
            /// Callers hand in slices that are at least as long as the value; shorter slices
            /// panic.
            pub(crate) fn $name(self, buf: &[u8]) -> $ty {
                match self {
                    Endianness::LittleEndian => LittleEndian::$name(buf),
                    Endianness::BigEndian => BigEndian::$name(buf),
                }
            }
        )*
    };
}

macro_rules! endian_write {
    ($($name:ident <- $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $name(self, buf: &mut [u8], n: $ty) {
                match self {
                    Endianness::LittleEndian => LittleEndian::$name(buf, n),
                    Endianness::BigEndian => BigEndian::$name(buf, n),
                }
            }
        )*
    };
}

impl Endianness {
    /// Detect the byte order from the first two bytes of a TIFF file.
    ///
    /// Should be b"II" for little endian or b"MM" for big endian.
    pub fn from_marker(marker: &[u8]) -> Option<Self> {
        match marker {
            b"II" => Some(Endianness::LittleEndian),
            b"MM" => Some(Endianness::BigEndian),
            _ => None,
        }
    }

    /// The two marker bytes that open a file in this byte order.
    pub fn marker(self) -> [u8; 2] {
        match self {
            Endianness::LittleEndian => *b"II",
            Endianness::BigEndian => *b"MM",
        }
    }

    endian_read! {
        read_u16 -> u16,
        read_i16 -> i16,
        read_u32 -> u32,
        read_i32 -> i32,
        read_u64 -> u64,
        read_i64 -> i64,
        read_f32 -> f32,
        read_f64 -> f64,
    }

    endian_write! {
        write_u16 <- u16,
        write_i16 <- i16,
        write_u32 <- u32,
        write_i32 <- i32,
        write_u64 <- u64,
        write_i64 <- i64,
        write_f32 <- f32,
        write_f64 <- f64,
    }
}
