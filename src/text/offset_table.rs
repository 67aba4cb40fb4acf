//! UTF-16 -> UTF-8 offset table
//!
//! One entry per UTF-16 code unit from the table start onward, holding the
//! UTF-8 byte offset relative to the table start. Entries are non-decreasing;
//! both halves of a surrogate pair hold the same value.

/// Offset table stored at the narrowest width that fits `3 * len`
#[derive(Debug, Clone, PartialEq)]
pub enum OffsetTable {
    Narrow(Vec<u8>),
    Medium(Vec<u16>),
    Wide(Vec<u32>),
}

impl OffsetTable {
    /// Pack relative offsets. Every value is at most `3 * offsets.len()`.
    pub fn from_offsets(offsets: Vec<u32>) -> Self {
        let max_utf8_len = offsets.len().saturating_mul(3);
        if max_utf8_len <= 0xff {
            OffsetTable::Narrow(offsets.into_iter().map(|v| v as u8).collect())
        } else if max_utf8_len <= 0xffff {
            OffsetTable::Medium(offsets.into_iter().map(|v| v as u16).collect())
        } else {
            OffsetTable::Wide(offsets)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OffsetTable::Narrow(t) => t.len(),
            OffsetTable::Medium(t) => t.len(),
            OffsetTable::Wide(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Relative UTF-8 offset of the code unit at `index`
    pub fn get(&self, index: usize) -> Option<usize> {
        match self {
            OffsetTable::Narrow(t) => t.get(index).map(|&v| v as usize),
            OffsetTable::Medium(t) => t.get(index).map(|&v| v as usize),
            OffsetTable::Wide(t) => t.get(index).map(|&v| v as usize),
        }
    }

    /// Relative UTF-16 index for a relative UTF-8 offset
    pub fn utf16_index_of(&self, utf8_offset: usize) -> usize {
        let target = utf8_offset as u64;
        match self {
            OffsetTable::Narrow(t) => find_first_in_sorted(t, target),
            OffsetTable::Medium(t) => find_first_in_sorted(t, target),
            OffsetTable::Wide(t) => find_first_in_sorted(t, target),
        }
    }
}

/// Locate the UTF-16 index whose UTF-8 offset covers `target`.
///
/// Finds the first entry `>= target`, walks back to the last entry `<= target`,
/// then steps back once more when that entry repeats its predecessor so the
/// first unit of a surrogate pair wins.
pub fn find_first_in_sorted<T>(table: &[T], target: u64) -> usize
where
    T: Copy + Into<u64>,
{
    if table.is_empty() {
        return 0;
    }

    let mut low = table.partition_point(|&v| v.into() < target);

    while low > 0 && (low >= table.len() || table[low].into() > target) {
        low -= 1;
    }

    if low > 0 && table[low].into() == table[low - 1].into() {
        low -= 1;
    }

    low
}
