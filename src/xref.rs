//! Cross-reference table, as seen by the stream layer.
//!
//! Each entry records where an object's stream data lives: at a byte offset
//! in the document's file, or in an already-materialized buffer (synthesized
//! or repaired objects). Building the table from a file is the parser's job.

use crate::object::{Dictionary, Object};
use bytes::Bytes;

/// Cross-reference table entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XRefEntry {
    /// Generation number
    pub generation: u16,
    /// The object itself; for streams this is the stream dictionary
    pub obj: Option<Object>,
    /// Byte offset of the stream data in the file, 0 if none
    pub stm_ofs: u64,
    /// Already-materialized (decrypted, length-constrained) raw stream data
    pub stm_buf: Option<Bytes>,
}

impl XRefEntry {
    /// Entry for a plain (non-stream) object.
    pub fn object(generation: u16, obj: Object) -> Self {
        Self {
            generation,
            obj: Some(obj),
            ..Default::default()
        }
    }

    /// Entry for a stream whose data starts at `offset` in the file.
    pub fn stream(generation: u16, dict: Dictionary, offset: u64) -> Self {
        Self {
            generation,
            obj: Some(Object::Dictionary(dict)),
            stm_ofs: offset,
            stm_buf: None,
        }
    }

    /// Entry for a stream whose raw data is already in memory.
    pub fn buffered(generation: u16, dict: Dictionary, data: impl Into<Bytes>) -> Self {
        Self {
            generation,
            obj: Some(Object::Dictionary(dict)),
            stm_ofs: 0,
            stm_buf: Some(data.into()),
        }
    }

    /// Whether this entry carries stream data of either kind.
    pub fn is_stream(&self) -> bool {
        self.stm_ofs != 0 || self.stm_buf.is_some()
    }

    /// The object as a dictionary, if it is one.
    pub fn dict(&self) -> Option<&Dictionary> {
        self.obj.as_ref().and_then(Object::as_dict)
    }
}

/// Cross-reference table indexed by object number.
///
/// Object number 0 is the head of the free list and never a valid target.
#[derive(Debug, Clone)]
pub struct CrossRefTable {
    entries: Vec<XRefEntry>,
}

impl CrossRefTable {
    /// Create a table holding only the reserved entry 0.
    pub fn new() -> Self {
        Self {
            entries: vec![XRefEntry::default()],
        }
    }

    /// Number of slots, including the reserved entry 0.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds nothing but the reserved entry.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Store an entry, growing the table as needed.
    pub fn insert(&mut self, num: u32, entry: XRefEntry) {
        let index = num as usize;
        if index >= self.entries.len() {
            self.entries.resize_with(index + 1, XRefEntry::default);
        }
        self.entries[index] = entry;
    }

    /// Entry for `num`; `None` for 0 or anything past the end.
    pub fn get(&self, num: u32) -> Option<&XRefEntry> {
        if num == 0 {
            return None;
        }
        self.entries.get(num as usize)
    }
}

impl Default for CrossRefTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_has_reserved_entry() {
        let table = CrossRefTable::new();
        assert_eq!(table.len(), 1);
        assert!(table.is_empty());
        assert!(table.get(0).is_none());
    }

    #[test]
    fn test_insert_grows_table() {
        let mut table = CrossRefTable::new();
        table.insert(5, XRefEntry::object(0, Object::Integer(1)));
        assert_eq!(table.len(), 6);
        assert!(table.get(3).is_some());
        assert!(table.get(3).unwrap().obj.is_none());
        assert_eq!(table.get(5).unwrap().obj, Some(Object::Integer(1)));
        assert!(table.get(6).is_none());
    }

    #[test]
    fn test_stream_detection() {
        let offset = XRefEntry::stream(0, Dictionary::new(), 120);
        let buffered = XRefEntry::buffered(0, Dictionary::new(), &b"abc"[..]);
        let plain = XRefEntry::object(0, Object::Null);

        assert!(offset.is_stream());
        assert!(buffered.is_stream());
        assert!(!plain.is_stream());
    }
}
