//! Symbol records from the ELF dynamic symbol table.
//!
//! Both hash table kinds index into the same fixed-stride array of symbol
//! records. The 32- and 64-bit classes lay the same logical fields out with
//! different widths and orders, so [`Symtab`] decodes records on demand at
//! class-specific offsets instead of overlaying a struct on the bytes.

use core::fmt;
use core::result;

use scroll::{Pread, ctx};

use crate::container::Class;
use crate::error;

/// Undefined symbol index, also the SysV hash chain terminator
pub const STN_UNDEF: u32 = 0;

/// The size in bytes of a 32-bit class symbol record
pub const SIZEOF_SYM32: usize = 16;
/// The size in bytes of a 64-bit class symbol record
pub const SIZEOF_SYM64: usize = 24;

// === Sym bindings ===
/// Local symbol
pub const STB_LOCAL: u8 = 0;
/// Global symbol
pub const STB_GLOBAL: u8 = 1;
/// Weak symbol
pub const STB_WEAK: u8 = 2;
/// Number of defined types
pub const STB_NUM: u8 = 3;
/// Start of OS-specific
pub const STB_LOOS: u8 = 10;
/// Unique symbol
pub const STB_GNU_UNIQUE: u8 = 10;
/// End of OS-specific
pub const STB_HIOS: u8 = 12;
/// Start of processor-specific
pub const STB_LOPROC: u8 = 13;
/// End of processor-specific
pub const STB_HIPROC: u8 = 15;

// === Sym types ===
/// Symbol type is unspecified
pub const STT_NOTYPE: u8 = 0;
/// Symbol is a data object
pub const STT_OBJECT: u8 = 1;
/// Symbol is a code object
pub const STT_FUNC: u8 = 2;
/// Symbol associated with a section
pub const STT_SECTION: u8 = 3;
/// Symbol's name is file name
pub const STT_FILE: u8 = 4;
/// Symbol is a common data object
pub const STT_COMMON: u8 = 5;
/// Symbol is thread-local data object
pub const STT_TLS: u8 = 6;
/// Number of defined types
pub const STT_NUM: u8 = 7;
/// Start of OS-specific
pub const STT_LOOS: u8 = 10;
/// Symbol is indirect code object
pub const STT_GNU_IFUNC: u8 = 10;
/// End of OS-specific
pub const STT_HIOS: u8 = 12;
/// Start of processor-specific
pub const STT_LOPROC: u8 = 13;
/// End of processor-specific
pub const STT_HIPROC: u8 = 15;

// === Sym visibilities ===
/// Default symbol visibility rules
pub const STV_DEFAULT: u8 = 0;
/// Processor-specific hidden class
pub const STV_INTERNAL: u8 = 1;
/// Symbol unavailable in other modules
pub const STV_HIDDEN: u8 = 2;
/// Not preemptible, not exported
pub const STV_PROTECTED: u8 = 3;

/// Get the ST bind.
///
/// This is the first four bits of the info byte.
#[inline]
pub fn st_bind(info: u8) -> u8 {
    info >> 4
}

/// Get the ST type.
///
/// This is the last four bits of the info byte.
#[inline]
pub fn st_type(info: u8) -> u8 {
    info & 0xf
}

/// Get the ST visibility.
///
/// This is the last two bits of the other byte.
#[inline]
pub fn st_visibility(other: u8) -> u8 {
    other & 0x3
}

/// Get the string for some bind
#[inline]
pub fn bind_to_str(typ: u8) -> &'static str {
    match typ {
        STB_LOCAL => "LOCAL",
        STB_GLOBAL => "GLOBAL",
        STB_WEAK => "WEAK",
        STB_NUM => "NUM",
        STB_GNU_UNIQUE => "GNU_UNIQUE",
        _ => "UNKNOWN_STB",
    }
}

/// Get the string for some type
#[inline]
pub fn type_to_str(typ: u8) -> &'static str {
    match typ {
        STT_NOTYPE => "NOTYPE",
        STT_OBJECT => "OBJECT",
        STT_FUNC => "FUNC",
        STT_SECTION => "SECTION",
        STT_FILE => "FILE",
        STT_COMMON => "COMMON",
        STT_TLS => "TLS",
        STT_NUM => "NUM",
        STT_GNU_IFUNC => "GNU_IFUNC",
        _ => "UNKNOWN_STT",
    }
}

/// Get the string for some visibility
#[inline]
pub fn visibility_to_str(vis: u8) -> &'static str {
    match vis {
        STV_DEFAULT => "DEFAULT",
        STV_INTERNAL => "INTERNAL",
        STV_HIDDEN => "HIDDEN",
        STV_PROTECTED => "PROTECTED",
        _ => "UNKNOWN_STV",
    }
}

/// A unified symbol record, decoded from either class's on-disk layout
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct Sym {
    /// Offset of this symbol's name in the associated string table
    pub st_name: usize,
    /// Symbol type and binding
    pub st_info: u8,
    /// Symbol visibility
    pub st_other: u8,
    /// Index of the section this symbol is defined in
    pub st_shndx: usize,
    /// Symbol value
    pub st_value: u64,
    /// Symbol size
    pub st_size: u64,
}

impl Sym {
    /// The size in bytes of an on-disk symbol record for `class`
    #[inline]
    pub fn size(class: Class) -> usize {
        match class {
            Class::Elf32 => SIZEOF_SYM32,
            Class::Elf64 => SIZEOF_SYM64,
        }
    }

    /// Get the ST bind.
    ///
    /// This is the first four bits of the info byte.
    #[inline]
    pub fn st_bind(&self) -> u8 {
        self.st_info >> 4
    }

    /// Get the ST type.
    ///
    /// This is the last four bits of the info byte.
    #[inline]
    pub fn st_type(&self) -> u8 {
        self.st_info & 0xf
    }

    /// Get the ST visibility.
    ///
    /// This is the last two bits of the other byte.
    #[inline]
    pub fn st_visibility(&self) -> u8 {
        st_visibility(self.st_other)
    }

    /// Whether this symbol points at the conventional empty name at string
    /// table offset 0
    #[inline]
    pub fn is_empty_name(&self) -> bool {
        self.st_name == 0
    }

    /// Checks whether this `Sym` has `STB_GLOBAL`/`STB_WEAK` bind and a
    /// `st_value` of 0
    #[inline]
    pub fn is_import(&self) -> bool {
        let bind = self.st_bind();
        (bind == STB_GLOBAL || bind == STB_WEAK) && self.st_value == 0
    }

    /// Checks whether this `Sym` has type `STT_FUNC`
    #[inline]
    pub fn is_function(&self) -> bool {
        self.st_type() == STT_FUNC
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "st_name: {} {} {} {} st_shndx: {} st_value: {:x} st_size: {}",
            self.st_name,
            bind_to_str(self.st_bind()),
            type_to_str(self.st_type()),
            visibility_to_str(self.st_visibility()),
            self.st_shndx,
            self.st_value,
            self.st_size
        )
    }
}

impl<'a> ctx::TryFromCtx<'a, Class> for Sym {
    type Error = scroll::Error;
    fn try_from_ctx(src: &'a [u8], class: Class) -> result::Result<(Self, usize), Self::Error> {
        let offset = &mut 0;
        let sym = match class {
            Class::Elf32 => {
                let st_name = src.gread_with::<u32>(offset, scroll::LE)?;
                let st_value = src.gread_with::<u32>(offset, scroll::LE)? as u64;
                let st_size = src.gread_with::<u32>(offset, scroll::LE)? as u64;
                let st_info = src.gread_with::<u8>(offset, scroll::LE)?;
                let st_other = src.gread_with::<u8>(offset, scroll::LE)?;
                let st_shndx = src.gread_with::<u16>(offset, scroll::LE)?;
                Sym {
                    st_name: st_name as usize,
                    st_info,
                    st_other,
                    st_shndx: st_shndx as usize,
                    st_value,
                    st_size,
                }
            }
            Class::Elf64 => {
                let st_name = src.gread_with::<u32>(offset, scroll::LE)?;
                let st_info = src.gread_with::<u8>(offset, scroll::LE)?;
                let st_other = src.gread_with::<u8>(offset, scroll::LE)?;
                let st_shndx = src.gread_with::<u16>(offset, scroll::LE)?;
                let st_value = src.gread_with::<u64>(offset, scroll::LE)?;
                let st_size = src.gread_with::<u64>(offset, scroll::LE)?;
                Sym {
                    st_name: st_name as usize,
                    st_info,
                    st_other,
                    st_shndx: st_shndx as usize,
                    st_value,
                    st_size,
                }
            }
        };
        Ok((sym, *offset))
    }
}

/// A lazy, fixed-stride view over the dynamic symbol table.
///
/// Records are decoded on access; the view holds only a borrow of the
/// caller's bytes. The record count comes from the container metadata the
/// collaborator parsed (`sh_size / sh_entsize` of the `.dynsym` section, or
/// the `DT_SYMENT` equivalent from the dynamic array).
#[derive(Default, Clone, Copy)]
pub struct Symtab<'a> {
    bytes: &'a [u8],
    count: usize,
    class: Class,
}

impl<'a> Symtab<'a> {
    /// Parse a symbol table of `count` records from `bytes` starting at
    /// `offset`, laid out for `class`
    pub fn parse(
        bytes: &'a [u8],
        offset: usize,
        count: usize,
        class: Class,
    ) -> error::Result<Symtab<'a>> {
        let size = count.checked_mul(Sym::size(class)).ok_or_else(|| {
            error::Error::Malformed(format!("symbol table count {count} overflows"))
        })?;
        let (end, overflow) = offset.overflowing_add(size);
        if overflow || end > bytes.len() {
            return Err(error::Error::Malformed(format!(
                "symbol table at {offset:#x} with {count} entries is out of bounds"
            )));
        }
        Ok(Symtab { bytes: &bytes[offset..end], count, class })
    }

    /// The number of symbol records in this table
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table holds no records
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The ELF class these records are laid out for
    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Decode the record at `index`, or `None` if it is out of range
    pub fn get(&self, index: usize) -> Option<Sym> {
        if index >= self.count {
            return None;
        }
        self.bytes.pread_with(index * Sym::size(self.class), self.class).ok()
    }

    /// An iterator over every record in the table
    pub fn iter(&self) -> SymIterator<'a> {
        SymIterator { symtab: *self, index: 0 }
    }
}

impl<'a> fmt::Debug for Symtab<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symtab")
            .field("count", &self.count)
            .field("class", &self.class)
            .finish()
    }
}

impl<'a> IntoIterator for &'_ Symtab<'a> {
    type Item = Sym;
    type IntoIter = SymIterator<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the records of a [`Symtab`]
pub struct SymIterator<'a> {
    symtab: Symtab<'a>,
    index: usize,
}

impl<'a> Iterator for SymIterator<'a> {
    type Item = Sym;
    fn next(&mut self) -> Option<Sym> {
        let sym = self.symtab.get(self.index)?;
        self.index += 1;
        Some(sym)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.symtab.len() - self.index.min(self.symtab.len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SymIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sym64(name: u32, info: u8, other: u8, shndx: u16, value: u64, size: u64) -> [u8; 24] {
        let mut bytes = [0u8; 24];
        bytes[0..4].copy_from_slice(&name.to_le_bytes());
        bytes[4] = info;
        bytes[5] = other;
        bytes[6..8].copy_from_slice(&shndx.to_le_bytes());
        bytes[8..16].copy_from_slice(&value.to_le_bytes());
        bytes[16..24].copy_from_slice(&size.to_le_bytes());
        bytes
    }

    fn sym32(name: u32, info: u8, other: u8, shndx: u16, value: u32, size: u32) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&name.to_le_bytes());
        bytes[4..8].copy_from_slice(&value.to_le_bytes());
        bytes[8..12].copy_from_slice(&size.to_le_bytes());
        bytes[12] = info;
        bytes[13] = other;
        bytes[14..16].copy_from_slice(&shndx.to_le_bytes());
        bytes
    }

    #[test]
    fn decode_sym64() {
        let bytes = sym64(97, 0x12, 0, 12, 0x65a, 33);
        let symtab = Symtab::parse(&bytes, 0, 1, Class::Elf64).unwrap();
        let sym = symtab.get(0).unwrap();
        assert_eq!(sym.st_name, 97);
        assert_eq!(sym.st_bind(), STB_GLOBAL);
        assert_eq!(sym.st_type(), STT_FUNC);
        assert_eq!(sym.st_shndx, 12);
        assert_eq!(sym.st_value, 0x65a);
        assert_eq!(sym.st_size, 33);
        assert!(sym.is_function());
        assert!(!sym.is_import());
    }

    #[test]
    fn decode_sym32() {
        let bytes = sym32(5, 0x21, STV_HIDDEN, 7, 0x2018, 16);
        let symtab = Symtab::parse(&bytes, 0, 1, Class::Elf32).unwrap();
        let sym = symtab.get(0).unwrap();
        assert_eq!(sym.st_name, 5);
        assert_eq!(sym.st_bind(), STB_WEAK);
        assert_eq!(sym.st_type(), STT_OBJECT);
        assert_eq!(sym.st_visibility(), STV_HIDDEN);
        assert_eq!(sym.st_shndx, 7);
        assert_eq!(sym.st_value, 0x2018);
        assert_eq!(sym.st_size, 16);
    }

    #[test]
    fn out_of_range_record_is_none() {
        let bytes = sym64(0, 0, 0, 0, 0, 0);
        let symtab = Symtab::parse(&bytes, 0, 1, Class::Elf64).unwrap();
        assert!(symtab.get(0).is_some());
        assert!(symtab.get(1).is_none());
    }

    #[test]
    fn bad_extent_is_rejected() {
        let bytes = [0u8; 16];
        assert!(Symtab::parse(&bytes, 0, 1, Class::Elf64).is_err());
        assert!(Symtab::parse(&bytes, 0, 1, Class::Elf32).is_ok());
        assert!(Symtab::parse(&bytes, 8, 1, Class::Elf32).is_err());
        assert!(Symtab::parse(&bytes, 0, usize::MAX, Class::Elf64).is_err());
    }

    #[test]
    fn iterator_yields_every_record() {
        let mut bytes = Vec::new();
        for i in 0..4u32 {
            bytes.extend_from_slice(&sym64(i, 0, 0, 0, u64::from(i) * 0x10, 0));
        }
        let symtab = Symtab::parse(&bytes, 0, 4, Class::Elf64).unwrap();
        let names: Vec<usize> = symtab.iter().map(|sym| sym.st_name).collect();
        assert_eq!(names, &[0, 1, 2, 3]);
        assert_eq!(symtab.iter().len(), 4);
    }
}
