//! A NUL-delimited, byte-offset indexed string table, as referenced by the
//! symbol records of an ELF dynamic symbol table.
//!
//! Offset 0 conventionally holds the empty string, which is what the
//! "no name" symbol at index 0 points at.

use crate::error;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str;
use scroll::{Pread, ctx};

/// A string table, constructed from a byte range handed over by whatever
/// located the section. All lookups are bounds checked; a bad offset yields
/// `None`, never a truncated read.
#[derive(Default, Clone, Copy)]
pub struct Strtab<'a> {
    bytes: &'a [u8],
}

impl<'a> Strtab<'a> {
    /// Wrap `bytes` as a string table
    pub fn new(bytes: &'a [u8]) -> Self {
        Strtab { bytes }
    }

    /// Parse a string table from `bytes` at `offset` spanning `len` bytes
    pub fn parse(bytes: &'a [u8], offset: usize, len: usize) -> error::Result<Strtab<'a>> {
        let (end, overflow) = offset.overflowing_add(len);
        if overflow || end > bytes.len() {
            return Err(error::Error::Malformed(
                format!("string table at {offset:#x} with size {len:#x} is out of bounds"),
            ));
        }
        Ok(Strtab::new(&bytes[offset..end]))
    }

    /// The size in bytes of this string table
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the string table is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get the string beginning at byte `offset`, or `None` if the offset is
    /// out of bounds or the string is not valid UTF-8
    pub fn get_at(&self, offset: usize) -> Option<&'a str> {
        self.bytes
            .pread_with::<&'a str>(offset, ctx::StrCtx::Delimiter(0))
            .ok()
    }

    /// The raw bytes of the string beginning at byte `offset`, up to but not
    /// including the NUL terminator. Name comparisons use this so that
    /// symbol names never need to be valid UTF-8 to be searchable.
    pub(crate) fn name_bytes_at(&self, offset: usize) -> Option<&'a [u8]> {
        if offset >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[offset..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => Some(&rest[..end]),
            None => Some(rest),
        }
    }

    /// Collect every string in the table, in offset order
    pub fn to_vec(&self) -> error::Result<Vec<&'a str>> {
        let len = self.bytes.len();
        let mut strings = Vec::new();
        let mut i = 0;
        while i < len {
            let string = self.get_at(i).ok_or_else(|| {
                error::Error::Malformed(format!("string table entry at {i:#x} is unreadable"))
            })?;
            i += string.len() + 1;
            strings.push(string);
        }
        Ok(strings)
    }
}

impl<'a> fmt::Debug for Strtab<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strtab")
            .field("len", &self.bytes.len())
            .field(
                "bytes",
                &str::from_utf8(self.bytes).unwrap_or("<invalid utf8>").to_string(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Strtab;

    #[test]
    fn to_vec_no_final_null() {
        let bytes = b"\0printf\0memmove\0busta";
        let strtab = Strtab::new(bytes);
        let vec = strtab.to_vec().unwrap();
        assert_eq!(vec.len(), 4);
        assert_eq!(vec, vec!["", "printf", "memmove", "busta"]);
    }

    #[test]
    fn to_vec_final_null() {
        let bytes = b"\0printf\0memmove\0busta\0";
        let strtab = Strtab::new(bytes);
        let vec = strtab.to_vec().unwrap();
        assert_eq!(vec.len(), 4);
        assert_eq!(vec, vec!["", "printf", "memmove", "busta"]);
    }

    #[test]
    fn get_at_oob_is_none() {
        let strtab = Strtab::new(b"\0foo\0");
        assert_eq!(strtab.get_at(0), Some(""));
        assert_eq!(strtab.get_at(1), Some("foo"));
        assert_eq!(strtab.get_at(5), None);
        assert_eq!(strtab.get_at(500), None);
    }

    #[test]
    fn name_bytes_stop_at_nul() {
        let strtab = Strtab::new(b"\0foo\0bar");
        assert_eq!(strtab.name_bytes_at(1), Some(&b"foo"[..]));
        // unterminated final string still yields its bytes
        assert_eq!(strtab.name_bytes_at(5), Some(&b"bar"[..]));
        assert_eq!(strtab.name_bytes_at(9), None);
    }
}
