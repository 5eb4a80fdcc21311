//! Decoded tag values.

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;
use serde::Serialize;

use crate::reader::Endianness;
use crate::tags::Type;

/// A single numeric value of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[allow(missing_docs)]
pub enum Scalar {
    Byte(u8),
    Short(u16),
    SignedShort(i16),
    Unsigned(u32),
    Signed(i32),
    UnsignedBig(u64),
    SignedBig(i64),
    Float(f32),
    Double(f64),
    Rational(u32, u32),
    SRational(i32, i32),
    Ifd(u32),
    IfdBig(u64),
}

/// The decoded value of a directory entry.
///
/// The variant is decided by the field type alone: BYTE, SBYTE, UNDEFINED and unknown types are
/// kept as raw bytes, ASCII becomes text and everything else is numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TagValue {
    /// A numeric entry with a count of exactly one.
    Scalar(Scalar),
    /// A numeric entry with any other count, in file order.
    Sequence(Vec<Scalar>),
    /// Opaque bytes.
    Bytes(Bytes),
    /// ASCII text with trailing NULs removed.
    Text(Ascii),
}

/// An ASCII value: the decoded text and the bytes it was read from.
///
/// Equality compares both, so `"ab"` stored with one NUL differs from `"ab"` stored with two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ascii {
    text: String,
    #[serde(skip)]
    raw: Bytes,
}

impl Ascii {
    /// Decode raw ASCII field data. Trailing NULs are dropped from the text, invalid UTF-8 is
    /// replaced.
    pub fn from_raw(raw: Bytes) -> Self {
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
        let text = String::from_utf8_lossy(&raw[..end]).into_owned();
        Self { text, raw }
    }

    /// The decoded text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The field data exactly as stored, including any NULs.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }
}

impl From<&str> for Ascii {
    /// Text stored with a single terminating NUL.
    fn from(text: &str) -> Self {
        let mut raw = Vec::with_capacity(text.len() + 1);
        raw.extend_from_slice(text.as_bytes());
        raw.push(0);
        Self {
            text: text.to_string(),
            raw: raw.into(),
        }
    }
}

impl Deref for Ascii {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Ascii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.text)
    }
}

impl Scalar {
    /// Read one value of type `ty` from a chunk of exactly `ty.unit_size()` bytes.
    fn read(ty: Type, chunk: &[u8], endianness: Endianness) -> Self {
        match ty {
            // byte-sized types never reach here; `decode` keeps them as bytes
            Type::BYTE | Type::SBYTE | Type::ASCII | Type::UNDEFINED => Scalar::Byte(chunk[0]),
            Type::SHORT => Scalar::Short(endianness.read_u16(chunk)),
            Type::SSHORT => Scalar::SignedShort(endianness.read_i16(chunk)),
            Type::LONG => Scalar::Unsigned(endianness.read_u32(chunk)),
            Type::SLONG => Scalar::Signed(endianness.read_i32(chunk)),
            Type::FLOAT => Scalar::Float(endianness.read_f32(chunk)),
            Type::IFD => Scalar::Ifd(endianness.read_u32(chunk)),
            Type::DOUBLE => Scalar::Double(endianness.read_f64(chunk)),
            Type::LONG8 => Scalar::UnsignedBig(endianness.read_u64(chunk)),
            Type::SLONG8 => Scalar::SignedBig(endianness.read_i64(chunk)),
            Type::IFD8 => Scalar::IfdBig(endianness.read_u64(chunk)),
            Type::RATIONAL => Scalar::Rational(
                endianness.read_u32(&chunk[..4]),
                endianness.read_u32(&chunk[4..]),
            ),
            Type::SRATIONAL => Scalar::SRational(
                endianness.read_i32(&chunk[..4]),
                endianness.read_i32(&chunk[4..]),
            ),
        }
    }

    /// Append the on-disk representation of this value to `out`.
    fn write(&self, endianness: Endianness, out: &mut Vec<u8>) {
        let mut buf = [0u8; 8];
        let len = match *self {
            Scalar::Byte(v) => {
                buf[0] = v;
                1
            }
            Scalar::Short(v) => {
                endianness.write_u16(&mut buf, v);
                2
            }
            Scalar::SignedShort(v) => {
                endianness.write_i16(&mut buf, v);
                2
            }
            Scalar::Unsigned(v) | Scalar::Ifd(v) => {
                endianness.write_u32(&mut buf, v);
                4
            }
            Scalar::Signed(v) => {
                endianness.write_i32(&mut buf, v);
                4
            }
            Scalar::Float(v) => {
                endianness.write_f32(&mut buf, v);
                4
            }
            Scalar::UnsignedBig(v) | Scalar::IfdBig(v) => {
                endianness.write_u64(&mut buf, v);
                8
            }
            Scalar::SignedBig(v) => {
                endianness.write_i64(&mut buf, v);
                8
            }
            Scalar::Double(v) => {
                endianness.write_f64(&mut buf, v);
                8
            }
            Scalar::Rational(n, d) => {
                endianness.write_u32(&mut buf[..4], n);
                endianness.write_u32(&mut buf[4..], d);
                8
            }
            Scalar::SRational(n, d) => {
                endianness.write_i32(&mut buf[..4], n);
                endianness.write_i32(&mut buf[4..], d);
                8
            }
        };
        out.extend_from_slice(&buf[..len]);
    }

    /// The value as an unsigned integer, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Scalar::Byte(v) => Some(v.into()),
            Scalar::Short(v) => Some(v.into()),
            Scalar::Unsigned(v) | Scalar::Ifd(v) => Some(v.into()),
            Scalar::UnsignedBig(v) | Scalar::IfdBig(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scalar::Byte(v) => write!(f, "{v}"),
            Scalar::Short(v) => write!(f, "{v}"),
            Scalar::SignedShort(v) => write!(f, "{v}"),
            Scalar::Unsigned(v) | Scalar::Ifd(v) => write!(f, "{v}"),
            Scalar::Signed(v) => write!(f, "{v}"),
            Scalar::UnsignedBig(v) | Scalar::IfdBig(v) => write!(f, "{v}"),
            Scalar::SignedBig(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Double(v) => write!(f, "{v}"),
            Scalar::Rational(n, d) => write!(f, "{n}/{d}"),
            Scalar::SRational(n, d) => write!(f, "{n}/{d}"),
        }
    }
}

impl TagValue {
    /// Decode `data`, which holds exactly `count` values of the field type `type_code`.
    pub(crate) fn decode(type_code: u16, count: u64, data: Bytes, endianness: Endianness) -> Self {
        let ty = match Type::try_from(type_code) {
            Ok(Type::BYTE | Type::SBYTE | Type::UNDEFINED) | Err(_) => return TagValue::Bytes(data),
            Ok(Type::ASCII) => return TagValue::Text(Ascii::from_raw(data)),
            Ok(ty) => ty,
        };
        let scalars = data
            .chunks_exact(ty.unit_size() as usize)
            .map(|chunk| Scalar::read(ty, chunk, endianness))
            .collect::<Vec<_>>();
        if count == 1 {
            if let [single] = scalars[..] {
                return TagValue::Scalar(single);
            }
        }
        TagValue::Sequence(scalars)
    }

    /// Encode this value back into the byte representation used inside a TIFF file.
    ///
    /// Text is written back exactly as it was stored.
    pub fn encode(&self, endianness: Endianness) -> Vec<u8> {
        match self {
            TagValue::Scalar(scalar) => {
                let mut out = Vec::with_capacity(8);
                scalar.write(endianness, &mut out);
                out
            }
            TagValue::Sequence(scalars) => {
                let mut out = Vec::with_capacity(scalars.len() * 8);
                for scalar in scalars {
                    scalar.write(endianness, &mut out);
                }
                out
            }
            TagValue::Bytes(bytes) => bytes.to_vec(),
            TagValue::Text(text) => text.raw().to_vec(),
        }
    }

    /// Number of elements: values for numeric entries, bytes for raw and text entries.
    pub fn len(&self) -> usize {
        match self {
            TagValue::Scalar(_) => 1,
            TagValue::Sequence(scalars) => scalars.len(),
            TagValue::Bytes(bytes) => bytes.len(),
            TagValue::Text(text) => text.len(),
        }
    }

    /// Returns `true` if the value holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The text, if this is an ASCII value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// The raw bytes, if this is a BYTE, SBYTE, UNDEFINED or unknown-typed value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            TagValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// All numeric values, whether this is a scalar or a sequence.
    pub fn scalars(&self) -> &[Scalar] {
        match self {
            TagValue::Scalar(scalar) => std::slice::from_ref(scalar),
            TagValue::Sequence(scalars) => scalars,
            TagValue::Bytes(_) | TagValue::Text(_) => &[],
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Scalar(scalar) => fmt::Display::fmt(scalar, f),
            TagValue::Sequence(scalars) => {
                f.write_str("[")?;
                for (i, scalar) in scalars.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(scalar, f)?;
                }
                f.write_str("]")
            }
            TagValue::Bytes(bytes) => {
                f.write_str("<")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{byte:02x}")?;
                }
                f.write_str(">")
            }
            TagValue::Text(text) => fmt::Display::fmt(text, f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ascii(raw: &'static [u8]) -> TagValue {
        TagValue::Text(Ascii::from_raw(Bytes::from_static(raw)))
    }

    #[test]
    #[rustfmt::skip]
    fn test_decode() {
        let cases = [
        // type count  data                      byte order                value
        (  1,   3,   vec![1, 2, 3],              Endianness::LittleEndian, TagValue::Bytes(Bytes::from_static(&[1, 2, 3]))),
        (  7,   2,   vec![0xff, 0],              Endianness::BigEndian,    TagValue::Bytes(Bytes::from_static(&[0xff, 0]))),
        (  2,   4,   vec![b'a', b'b', 0, 0],     Endianness::LittleEndian, ascii(b"ab\0\0")),
        (  2,   3,   vec![b'a', b'b', 0],        Endianness::LittleEndian, TagValue::Text("ab".into())),
        (  2,   0,   vec![],                     Endianness::LittleEndian, ascii(b"")),
        (  3,   1,   vec![0, 42],                Endianness::BigEndian,    TagValue::Scalar(Scalar::Short(42))),
        (  3,   2,   vec![42, 0, 43, 0],         Endianness::LittleEndian, TagValue::Sequence(vec![Scalar::Short(42), Scalar::Short(43)])),
        (  6,   1,   vec![0xff],                 Endianness::LittleEndian, TagValue::Bytes(Bytes::from_static(&[0xff]))),
        (  6,   3,   vec![b'<', b'x', b':'],     Endianness::BigEndian,    TagValue::Bytes(Bytes::from_static(b"<x:"))),
        (  5,   1,   vec![0,0,0,1, 0,0,0,2],     Endianness::BigEndian,    TagValue::Scalar(Scalar::Rational(1, 2))),
        ( 10,   1,   vec![0xff,0xff,0xff,0xff, 2,0,0,0], Endianness::LittleEndian, TagValue::Scalar(Scalar::SRational(-1, 2))),
        (  4,   0,   vec![],                     Endianness::LittleEndian, TagValue::Sequence(vec![])),
        (999,   2,   vec![9, 9],                 Endianness::LittleEndian, TagValue::Bytes(Bytes::from_static(&[9, 9]))),
        ];
        for (type_code, count, data, byte_order, expected) in cases {
            assert_eq!(TagValue::decode(type_code, count, Bytes::from(data), byte_order), expected);
        }
    }

    #[test]
    fn test_ascii_text() {
        assert_eq!(ascii(b"a\0b\0").as_text(), Some("a\0b"));
        assert_eq!(ascii(b"\0\0").as_text(), Some(""));
        assert_eq!(ascii(b"abcd").as_text(), Some("abcd"));
        assert_eq!(ascii(&[0xff, 0]).as_text(), Some("\u{fffd}"));
        assert_ne!(ascii(b"ab\0\0"), TagValue::Text("ab".into()));
    }

    /// Every field type whose values fit in the 4-byte value field, at every count that fits,
    /// re-encodes to the bytes it was decoded from.
    #[test]
    fn test_encode_inline_roundtrip() {
        let type_codes = [1u16, 2, 3, 4, 6, 7, 8, 9, 11, 13, 999];
        let patterns: [[u8; 4]; 7] = [
            [0, 0, 0, 0],
            [1, 2, 3, 4],
            [0x80, 0xfe, 0x41, 0x00],
            [b'a', b'b', 0, 0],
            [b'a', b'b', b'c', b'd'],
            [0xff, 0, 0, 0],
            [0xc3, 0x28, 0, 0x7f],
        ];
        for byte_order in [Endianness::LittleEndian, Endianness::BigEndian] {
            for type_code in type_codes {
                let unit = crate::tags::unit_size(type_code);
                for count in 0..=4 / unit {
                    let len = (unit * count) as usize;
                    for pattern in &patterns {
                        let raw = &pattern[..len];
                        let value = TagValue::decode(
                            type_code,
                            count,
                            Bytes::copy_from_slice(raw),
                            byte_order,
                        );
                        assert_eq!(
                            value.encode(byte_order),
                            raw,
                            "type {type_code} count {count} {byte_order:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TagValue::Scalar(Scalar::Rational(72, 1)).to_string(), "72/1");
        assert_eq!(
            TagValue::Sequence(vec![Scalar::Short(8), Scalar::Short(8)]).to_string(),
            "[8, 8]"
        );
        assert_eq!(TagValue::Bytes(Bytes::from_static(&[0, 0xab])).to_string(), "<00 ab>");
        assert_eq!(TagValue::Text("x".into()).to_string(), "\"x\"");
    }
}
