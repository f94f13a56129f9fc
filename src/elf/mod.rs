//! The ELF dynamic-symbol hash index: the two on-disk lookup structures a
//! dynamic loader uses to resolve a symbol name to a symbol table record.
//!
//! Which table a binary carries is the container's business: the
//! collaborator that walked the section headers or the dynamic array hands
//! this module the section bytes, a [`Symtab`] view and a
//! [`Strtab`](crate::strtab::Strtab), and gets back a decoded table. Wrap it
//! in a [`SymbolIndex`] and callers need not care which kind is answering.

pub mod gnu_hash;
pub mod hash;
pub mod sym;

pub use self::gnu_hash::GnuHash;
pub use self::hash::SysvHash;
pub use self::sym::{Sym, Symtab};

use crate::error;
use crate::strtab::Strtab;

/// Compare the name of the symbol record at `index` against `name`, byte
/// for byte (strcmp semantics; stored names need not be UTF-8).
pub(crate) fn symbol_name_matches(
    symtab: &Symtab<'_>,
    strtab: &Strtab<'_>,
    index: usize,
    name: &str,
) -> error::Result<bool> {
    let sym = symtab.get(index).ok_or_else(|| {
        error::Error::Malformed(format!(
            "symbol index {index} out of range of the symbol table ({})",
            symtab.len()
        ))
    })?;
    match strtab.name_bytes_at(sym.st_name) {
        Some(bytes) => Ok(bytes == name.as_bytes()),
        None => Err(error::Error::OutOfBounds { offset: sym.st_name, len: strtab.len() }),
    }
}

/// A uniform lookup interface over whichever hash table kind a binary
/// carries.
///
/// Purely a dispatching view: decode the table you found with
/// [`SysvHash::parse`] or [`GnuHash::parse`], wrap it, and query. No state
/// beyond the decoded table itself.
#[derive(Debug)]
pub enum SymbolIndex<'a> {
    /// A legacy `.hash` table backs this binary
    Sysv(SysvHash<'a>),
    /// A `.gnu.hash` table backs this binary
    Gnu(GnuHash<'a>),
}

impl<'a> SymbolIndex<'a> {
    /// Look up `name`, returning its symbol table index if present.
    ///
    /// `Ok(None)` means absent; `Err` means the table is corrupt and cannot
    /// be searched for this name.
    pub fn find(&self, name: &str) -> error::Result<Option<usize>> {
        match self {
            SymbolIndex::Sysv(table) => table.find(name),
            SymbolIndex::Gnu(table) => table.find(name),
        }
    }

    /// Look up `name` and decode the matching record
    pub fn find_sym(&self, name: &str) -> error::Result<Option<(usize, Sym)>> {
        match self.find(name)? {
            Some(index) => Ok(self.get(index).map(|sym| (index, sym))),
            None => Ok(None),
        }
    }

    /// Decode the symbol record at `index`
    pub fn get(&self, index: usize) -> Option<Sym> {
        self.symtab().get(index)
    }

    /// The number of hash buckets
    pub fn bucket_count(&self) -> usize {
        match self {
            SymbolIndex::Sysv(table) => table.bucket_count(),
            SymbolIndex::Gnu(table) => table.bucket_count(),
        }
    }

    /// Iterate the symbol table indices in bucket `n`
    pub fn bucket_iter(&self, n: usize) -> error::Result<BucketIter<'a>> {
        match self {
            SymbolIndex::Sysv(table) => Ok(BucketIter::Sysv(table.bucket_iter(n)?)),
            SymbolIndex::Gnu(table) => Ok(BucketIter::Gnu(table.bucket_iter(n)?)),
        }
    }

    /// The number of symbols in bucket `n`
    pub fn bucket_len(&self, n: usize) -> error::Result<usize> {
        match self {
            SymbolIndex::Sysv(table) => table.bucket_len(n),
            SymbolIndex::Gnu(table) => table.bucket_len(n),
        }
    }

    /// The number of symbol records the table covers
    pub fn len(&self) -> usize {
        match self {
            SymbolIndex::Sysv(table) => table.len(),
            SymbolIndex::Gnu(table) => table.len(),
        }
    }

    /// Whether the table covers no symbols
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The symbol table this index resolves into
    pub fn symtab(&self) -> &Symtab<'a> {
        match self {
            SymbolIndex::Sysv(table) => table.symtab(),
            SymbolIndex::Gnu(table) => table.symtab(),
        }
    }

    /// The string table symbol names live in
    pub fn strtab(&self) -> &Strtab<'a> {
        match self {
            SymbolIndex::Sysv(table) => table.strtab(),
            SymbolIndex::Gnu(table) => table.strtab(),
        }
    }
}

impl<'a> From<SysvHash<'a>> for SymbolIndex<'a> {
    fn from(table: SysvHash<'a>) -> Self {
        SymbolIndex::Sysv(table)
    }
}

impl<'a> From<GnuHash<'a>> for SymbolIndex<'a> {
    fn from(table: GnuHash<'a>) -> Self {
        SymbolIndex::Gnu(table)
    }
}

/// An iterator over one bucket of either table kind
pub enum BucketIter<'a> {
    /// A SysV chain walk
    Sysv(hash::SysvBucketIter<'a>),
    /// A GNU contiguous index range
    Gnu(gnu_hash::GnuBucketIter),
}

impl Iterator for BucketIter<'_> {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        match self {
            BucketIter::Sysv(iter) => iter.next(),
            BucketIter::Gnu(iter) => iter.next(),
        }
    }
}
