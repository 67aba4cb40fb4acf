//! OnigString - UTF-16 text with a lazily built UTF-8 view
//!
//! The engine matches on UTF-8 bytes while callers index text by UTF-16 code
//! units. `OnigString` encodes once on first use and keeps a sparse mapping
//! table: before `table_start` both indexings coincide, from there on every
//! code unit has an entry. Pure ASCII text never allocates a table.

use std::cell::OnceCell;

use super::offset_table::OffsetTable;

/// Offset mapping built when the first multi-byte character is seen
#[derive(Debug, Clone, PartialEq)]
struct OffsetMapping {
    /// UTF-16 index (== UTF-8 index) where offsets start diverging
    table_start: usize,
    table: OffsetTable,
}

#[derive(Debug, Clone, PartialEq)]
struct Utf8Encoding {
    /// UTF-8 bytes followed by one NUL terminator
    bytes: Vec<u8>,
    mapping: Option<OffsetMapping>,
}

/// Text indexed by UTF-16 code units, with UTF-8 offset translation
#[derive(Debug, Clone, Default)]
pub struct OnigString {
    source: Vec<u16>,
    encoded: OnceCell<Utf8Encoding>,
}

impl OnigString {
    /// Wrap raw UTF-16 code units. Lone surrogates are kept as-is and only
    /// replaced with U+FFFD in the UTF-8 view.
    pub fn from_utf16(source: Vec<u16>) -> Self {
        Self {
            source,
            encoded: OnceCell::new(),
        }
    }

    /// The UTF-16 code units of the source text
    pub fn content(&self) -> &[u16] {
        &self.source
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Slice by UTF-16 offsets with `String.prototype.substring` rules:
    /// bounds clamp to the length and reversed bounds are swapped. A split
    /// surrogate pair decodes as U+FFFD.
    pub fn substring(&self, start: usize, end: usize) -> String {
        let len = self.source.len();
        let (mut start, mut end) = (start.min(len), end.min(len));
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        String::from_utf16_lossy(&self.source[start..end])
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.source)
    }

    /// UTF-8 encoding of the source plus a trailing NUL byte
    pub fn utf8_bytes(&self) -> &[u8] {
        &self.encoding().bytes
    }

    /// UTF-8 encoding without the NUL terminator
    pub fn utf8_content(&self) -> &[u8] {
        let bytes = self.utf8_bytes();
        &bytes[..bytes.len() - 1]
    }

    /// True when an offset table was needed (multi-byte or surrogate characters)
    pub fn has_multi_byte_characters(&self) -> bool {
        self.encoding().mapping.is_some()
    }

    pub fn convert_utf16_offset_to_utf8(&self, utf16_offset: i64) -> usize {
        if utf16_offset < 0 {
            return 0;
        }
        let encoding = self.encoding();
        let offset = match usize::try_from(utf16_offset) {
            Ok(offset) if offset < self.source.len() => offset,
            _ => return encoding.bytes.len() - 1,
        };

        match &encoding.mapping {
            Some(mapping) if offset >= mapping.table_start => mapping
                .table
                .get(offset - mapping.table_start)
                .map_or(encoding.bytes.len() - 1, |relative| relative + mapping.table_start),
            _ => offset,
        }
    }

    pub fn convert_utf8_offset_to_utf16(&self, utf8_offset: i64) -> usize {
        if utf8_offset < 0 {
            return 0;
        }
        let encoding = self.encoding();
        let offset = match usize::try_from(utf8_offset) {
            Ok(offset) if offset < encoding.bytes.len() - 1 => offset,
            _ => return self.source.len(),
        };

        match &encoding.mapping {
            Some(mapping) if offset >= mapping.table_start => {
                mapping.table.utf16_index_of(offset - mapping.table_start) + mapping.table_start
            }
            _ => offset,
        }
    }

    fn encoding(&self) -> &Utf8Encoding {
        self.encoded.get_or_init(|| encode(&self.source))
    }
}

impl PartialEq for OnigString {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for OnigString {}

impl From<&str> for OnigString {
    fn from(text: &str) -> Self {
        Self::from_utf16(text.encode_utf16().collect())
    }
}

impl From<String> for OnigString {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<&String> for OnigString {
    fn from(text: &String) -> Self {
        Self::from(text.as_str())
    }
}

impl From<Vec<u16>> for OnigString {
    fn from(units: Vec<u16>) -> Self {
        Self::from_utf16(units)
    }
}

impl From<&[u16]> for OnigString {
    fn from(units: &[u16]) -> Self {
        Self::from_utf16(units.to_vec())
    }
}

fn encode(source: &[u16]) -> Utf8Encoding {
    // worst case is 3 bytes per code unit, plus the terminator
    let mut bytes: Vec<u8> = Vec::with_capacity(source.len() * 3 + 1);
    let mut table: Option<(usize, Vec<u32>)> = None;
    let mut utf16_index = 0;
    let mut buf = [0u8; 4];

    for decoded in char::decode_utf16(source.iter().copied()) {
        let (ch, units) = match decoded {
            Ok(ch) => (ch, ch.len_utf16()),
            Err(_) => (char::REPLACEMENT_CHARACTER, 1),
        };
        let encoded = ch.encode_utf8(&mut buf);

        if table.is_none() && (encoded.len() > 1 || units > 1) {
            // everything before is ASCII, so the UTF-16 and UTF-8 offsets agree here
            table = Some((utf16_index, Vec::with_capacity(source.len() - utf16_index)));
        }
        if let Some((table_start, offsets)) = table.as_mut() {
            let relative = (bytes.len() - *table_start) as u32;
            offsets.extend(std::iter::repeat(relative).take(units));
        }

        bytes.extend_from_slice(encoded.as_bytes());
        utf16_index += units;
    }
    bytes.push(0);

    Utf8Encoding {
        bytes,
        mapping: table.map(|(table_start, offsets)| OffsetMapping {
            table_start,
            table: OffsetTable::from_offsets(offsets),
        }),
    }
}
