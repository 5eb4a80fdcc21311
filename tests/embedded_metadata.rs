//! Parsing and scanning of hand-built TIFF files.
use tiff_inspect::error::ParseError;
use tiff_inspect::reader::Endianness;
use tiff_inspect::scanner::{VENDOR_OPTICAL_CENTER, XMP_META};
use tiff_inspect::value::Scalar;
use tiff_inspect::{parse, scan, Inspector, TagValue};

mod util;

use util::TiffBuilder;

#[test]
fn test_minimal_tiff() {
    let data = [0x49, 0x49, 0x2A, 0x00, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let (header, ifd) = parse(data.to_vec()).unwrap();
    assert_eq!(header.endianness, Endianness::LittleEndian);
    assert_eq!(header.first_ifd_offset, 8);
    assert!(ifd.entries().is_empty());
    assert_eq!(ifd.next_ifd_offset(), None);
    assert!(scan(ifd.entries()).is_empty());
}

#[test]
fn test_ascii_xmp_out_of_line() {
    for builder in [TiffBuilder::little_endian(), TiffBuilder::big_endian()] {
        let data = builder.ascii(270, "<x:xmpmeta").build();
        let (_, ifd) = parse(data).unwrap();
        let entry = &ifd.entries()[0];
        assert_eq!(entry.count, 11);
        assert_eq!(entry.value, TagValue::Text("<x:xmpmeta".into()));

        let findings = scan(ifd.entries());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag, 270);
        assert_eq!(findings[0].marker, XMP_META);
        assert_eq!(findings[0].text, "<x:xmpmeta");
    }
}

#[test]
fn test_undefined_vendor_text() {
    let text = "drone-dji:GimbalYawDegree=\"-1.2\" drone-dji:RelativeOpticalCenterX=\"2.5\"";
    let data = TiffBuilder::little_endian()
        .short(256, 1600)
        .entry(50001, 7, text.len() as u32, text.as_bytes())
        .build();
    let (_, ifd) = parse(data).unwrap();
    let findings = scan(ifd.entries());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].tag, 50001);
    assert_eq!(findings[0].marker, VENDOR_OPTICAL_CENTER);
    assert_eq!(findings[0].text, text);
}

#[test]
fn test_vendor_type_code_is_scanned() {
    let text = b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">";
    let data = TiffBuilder::big_endian()
        .entry(700, 0x1234, text.len() as u32, text)
        .build();
    let (_, ifd) = parse(data).unwrap();
    assert_eq!(ifd.entries()[0].known_type(), None);
    assert_eq!(&ifd.entries()[0].value.as_bytes().unwrap()[..], &text[..]);
    assert_eq!(scan(ifd.entries())[0].marker, XMP_META);
}

#[test]
fn test_numeric_never_matches() {
    for value in [0u16, 0x3c78, 0x783c, u16::MAX] {
        let data = TiffBuilder::little_endian().short(700, value).build();
        let (_, ifd) = parse(data).unwrap();
        assert_eq!(ifd.entries()[0].value, TagValue::Scalar(Scalar::Short(value)));
        assert!(scan(ifd.entries()).is_empty());
    }
}

#[test]
fn test_offset_past_end() {
    let builder = TiffBuilder::little_endian().entry(700, 1, 32, &[b'x'; 32]);
    let mut data = builder.build();
    data.truncate(builder.data_offset() as usize + 31);
    let err = parse(data).unwrap_err();
    assert_eq!(
        err,
        ParseError::OffsetOutOfRange {
            tag: 700,
            offset: builder.data_offset() as u64,
            length: 32,
            file_size: builder.data_offset() as u64 + 31,
        }
    );
}

#[test]
fn test_truncated_directory_never_panics() {
    let builder = TiffBuilder::big_endian()
        .short(256, 10)
        .short(257, 20)
        .ascii(270, "a description");
    let data = builder.build();
    let table_end = builder.data_offset() as usize - 4;
    for len in 8..table_end {
        let err = parse(data[..len].to_vec()).unwrap_err();
        assert!(
            matches!(err, ParseError::TruncatedDirectory { .. }),
            "length {len}: {err:?}"
        );
    }
    for len in 0..8 {
        assert!(matches!(
            parse(data[..len].to_vec()),
            Err(ParseError::InvalidHeader(_))
        ));
    }
}

#[test]
fn test_signed_byte_xmp_is_scanned() {
    let text = b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">";
    for builder in [TiffBuilder::little_endian(), TiffBuilder::big_endian()] {
        let data = builder.entry(700, 6, text.len() as u32, text).build();
        let (_, ifd) = parse(data).unwrap();
        assert_eq!(&ifd.entries()[0].value.as_bytes().unwrap()[..], &text[..]);

        let findings = scan(ifd.entries());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tag, 700);
        assert_eq!(findings[0].marker, XMP_META);
    }
}

#[test]
fn test_inline_round_trip() {
    for builder in [TiffBuilder::little_endian(), TiffBuilder::big_endian()] {
        let width = builder.u32_bytes(4000);
        let depth = [builder.u16_bytes(8), builder.u16_bytes(8)].concat();
        #[rustfmt::skip]
        let cases: [(u16, u16, u32, &[u8]); 9] = [
            (256, 4, 1, &width),
            (258, 3, 2, &depth),
            (700, 1, 3, b"abc"),
            // ASCII: padded, unterminated, empty, not UTF-8
            (270, 2, 4, &[b'a', b'b', 0, 0]),
            (271, 2, 4, b"abcd"),
            (272, 2, 0, &[]),
            (305, 2, 2, &[0xff, 0]),
            (306, 2, 3, &[0xc3, 0x28, 0]),
            // SBYTE
            (50001, 6, 4, &[0x80, 0xff, 0x01, 0x00]),
        ];
        let data = cases
            .iter()
            .fold(builder, |b, (tag, field_type, count, raw)| {
                b.entry(*tag, *field_type, *count, raw)
            })
            .build();
        let (header, ifd) = parse(data).unwrap();
        assert_eq!(ifd.entries().len(), cases.len());
        for (entry, (tag, _, _, raw)) in ifd.entries().iter().zip(cases) {
            assert_eq!(entry.tag, tag);
            assert_eq!(entry.value.encode(header.endianness), raw, "tag {tag}");
        }
    }
}

#[test]
fn test_inspector_matches_scan() {
    let data = TiffBuilder::little_endian()
        .ascii(305, "exporter 1.0")
        .ascii(700, "<x:xmpmeta><rdf:RDF/></x:xmpmeta>")
        .build();
    let report = Inspector::default().inspect(data.clone()).unwrap();
    let (_, ifd) = parse(data).unwrap();
    assert_eq!(
        report.findings().cloned().collect::<Vec<_>>(),
        scan(ifd.entries())
    );
}
