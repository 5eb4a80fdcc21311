/// Builds single-IFD classic TIFF files in memory.
///
/// Values of more than four bytes are placed after the directory, in entry order.
pub(crate) struct TiffBuilder {
    big_endian: bool,
    entries: Vec<(u16, u16, u32, Vec<u8>)>,
    next_ifd_offset: u32,
}

impl TiffBuilder {
    pub(crate) fn little_endian() -> Self {
        Self {
            big_endian: false,
            entries: Vec::new(),
            next_ifd_offset: 0,
        }
    }

    pub(crate) fn big_endian() -> Self {
        Self {
            big_endian: true,
            ..Self::little_endian()
        }
    }

    /// Add an entry whose value is already encoded in the file's byte order.
    pub(crate) fn entry(mut self, tag: u16, field_type: u16, count: u32, value: &[u8]) -> Self {
        self.entries.push((tag, field_type, count, value.to_vec()));
        self
    }

    /// Add an ASCII entry; the terminating NUL is appended and counted.
    pub(crate) fn ascii(self, tag: u16, text: &str) -> Self {
        let mut value = text.as_bytes().to_vec();
        value.push(0);
        let count = value.len() as u32;
        self.entry(tag, 2, count, &value)
    }

    pub(crate) fn short(self, tag: u16, value: u16) -> Self {
        let bytes = self.u16_bytes(value);
        self.entry(tag, 3, 1, &bytes)
    }

    pub(crate) fn u16_bytes(&self, value: u16) -> [u8; 2] {
        if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        }
    }

    pub(crate) fn u32_bytes(&self, value: u32) -> [u8; 4] {
        if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        }
    }

    /// Byte offset of the first out-of-line value.
    pub(crate) fn data_offset(&self) -> u32 {
        8 + 2 + 12 * self.entries.len() as u32 + 4
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        out.extend_from_slice(&self.u16_bytes(42));
        out.extend_from_slice(&self.u32_bytes(8));
        out.extend_from_slice(&self.u16_bytes(self.entries.len() as u16));

        let mut data = Vec::new();
        for (tag, field_type, count, value) in &self.entries {
            out.extend_from_slice(&self.u16_bytes(*tag));
            out.extend_from_slice(&self.u16_bytes(*field_type));
            out.extend_from_slice(&self.u32_bytes(*count));
            if value.len() <= 4 {
                let mut inline = [0u8; 4];
                inline[..value.len()].copy_from_slice(value);
                out.extend_from_slice(&inline);
            } else {
                let offset = self.data_offset() + data.len() as u32;
                out.extend_from_slice(&self.u32_bytes(offset));
                data.extend_from_slice(value);
            }
        }
        out.extend_from_slice(&self.u32_bytes(self.next_ifd_offset));
        out.extend_from_slice(&data);
        out
    }
}
