//! The SysV symbol hash table, `.hash`, pointed at by `DT_HASH`.
//!
//! The layout is two u32 counts followed by two u32 arrays:
//!
//!   1. nbucket
//!   2. nchain
//!   3. bucket\[nbucket\]
//!   4. chain\[nchain\]
//!
//! A bucket cell holds the symbol table index of the first symbol hashing to
//! that bucket, or [`STN_UNDEF`] if the bucket is empty. Each chain cell
//! holds the next symbol index sharing the same bucket, again terminated by
//! [`STN_UNDEF`]. `nchain` equals the number of dynamic symbol records, since
//! every symbol has a chain cell.

use log::{debug, warn};
use scroll::Pread;

use crate::elf::symbol_name_matches;
use crate::elf::sym::{STN_UNDEF, Symtab};
use crate::error;
use crate::strtab::Strtab;

/// The number of u32s before the bucket array
const SIZEOF_HEADER: usize = 8;

/// The classic ELF hash function: takes a symbol name and returns the u32
/// hash of that name
pub const fn hash(symbol: &str) -> u32 {
    let bytes = symbol.as_bytes();
    let mut hash: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        hash = (hash << 4).wrapping_add(bytes[i] as u32);
        let g = hash & 0xf000_0000;
        if g != 0 {
            hash ^= g >> 24;
        }
        hash &= !g;
        i += 1;
    }
    hash
}

/// A SysV hash table, decoded from the bytes of a `.hash` section.
///
/// Holds borrows of the hash bytes, the symbol table view and the string
/// table; nothing is copied, so lookups from several threads at once are
/// fine.
#[derive(Debug)]
pub struct SysvHash<'a> {
    nbucket: usize,
    nchain: usize,
    buckets: &'a [u8],
    chains: &'a [u8],
    symtab: Symtab<'a>,
    strtab: Strtab<'a>,
}

impl<'a> SysvHash<'a> {
    /// Decode a SysV hash table from `bytes`, which must span exactly the
    /// section contents. Fails if the header is truncated, `nbucket` is
    /// zero, or the declared arrays do not fit in `bytes`.
    pub fn parse(
        bytes: &'a [u8],
        symtab: Symtab<'a>,
        strtab: Strtab<'a>,
    ) -> error::Result<SysvHash<'a>> {
        let nbucket = bytes.pread_with::<u32>(0, scroll::LE)? as usize;
        let nchain = bytes.pread_with::<u32>(4, scroll::LE)? as usize;
        if nbucket == 0 {
            return Err(error::Error::Malformed("hash table has zero buckets".into()));
        }
        let buckets_size = nbucket
            .checked_mul(4)
            .ok_or_else(|| error::Error::Malformed(format!("nbucket {nbucket} overflows")))?;
        let chains_size = nchain
            .checked_mul(4)
            .ok_or_else(|| error::Error::Malformed(format!("nchain {nchain} overflows")))?;
        let chains_start = SIZEOF_HEADER
            .checked_add(buckets_size)
            .ok_or_else(|| error::Error::Malformed(format!("nbucket {nbucket} overflows")))?;
        let end = chains_start
            .checked_add(chains_size)
            .ok_or_else(|| error::Error::Malformed(format!("nchain {nchain} overflows")))?;
        if end > bytes.len() {
            return Err(error::Error::Malformed(format!(
                "hash table arrays (nbucket {nbucket}, nchain {nchain}) exceed section size {:#x}",
                bytes.len()
            )));
        }
        if nchain != symtab.len() {
            warn!(
                "hash table nchain {} disagrees with symbol table count {}",
                nchain,
                symtab.len()
            );
        }
        debug!("sysv hash table: {nbucket} buckets, {nchain} chain entries");
        Ok(SysvHash {
            nbucket,
            nchain,
            buckets: &bytes[SIZEOF_HEADER..chains_start],
            chains: &bytes[chains_start..end],
            symtab,
            strtab,
        })
    }

    /// The number of hash buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.nbucket
    }

    /// The number of symbol records covered by this table, which the format
    /// defines as `nchain`
    #[inline]
    pub fn len(&self) -> usize {
        self.nchain
    }

    /// Whether the table covers no symbols
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nchain == 0
    }

    /// The symbol table this hash table indexes into
    #[inline]
    pub fn symtab(&self) -> &Symtab<'a> {
        &self.symtab
    }

    /// The string table symbol names live in
    #[inline]
    pub fn strtab(&self) -> &Strtab<'a> {
        &self.strtab
    }

    fn bucket(&self, n: usize) -> error::Result<u32> {
        Ok(self.buckets.pread_with::<u32>(n * 4, scroll::LE)?)
    }

    fn chain(&self, index: usize) -> error::Result<u32> {
        let offset = index.checked_mul(4).ok_or(error::Error::OutOfBounds {
            offset: index,
            len: self.chains.len(),
        })?;
        Ok(self.chains.pread_with::<u32>(offset, scroll::LE)?)
    }

    /// Look up `name`, returning its symbol table index if present.
    ///
    /// `Ok(None)` means the name is not in the table. An `Err` means the
    /// table itself is not searchable: the chain walk ran out of bounds or
    /// failed to terminate within `nchain` steps.
    pub fn find(&self, name: &str) -> error::Result<Option<usize>> {
        let n = hash(name) as usize % self.nbucket;
        let mut index = self.bucket(n)?;
        let mut steps = 0;
        while index != STN_UNDEF {
            if steps >= self.nchain {
                return Err(error::Error::TraversalOverflow { limit: self.nchain });
            }
            steps += 1;
            if symbol_name_matches(&self.symtab, &self.strtab, index as usize, name)? {
                return Ok(Some(index as usize));
            }
            index = self.chain(index as usize)?;
        }
        Ok(None)
    }

    /// Iterate the symbol table indices reachable from bucket `n`, in chain
    /// order: the same sequence [`find`](Self::find) walks.
    ///
    /// The iterator is finite even on corrupt input; it stops early rather
    /// than looping if the chain is cyclic or runs out of bounds.
    pub fn bucket_iter(&self, n: usize) -> error::Result<SysvBucketIter<'a>> {
        if n >= self.nbucket {
            return Err(error::Error::Malformed(format!(
                "bucket index {n} out of range ({})",
                self.nbucket
            )));
        }
        Ok(SysvBucketIter {
            chains: self.chains,
            current: self.bucket(n)?,
            remaining: self.nchain,
        })
    }

    /// The number of symbols in bucket `n`
    pub fn bucket_len(&self, n: usize) -> error::Result<usize> {
        Ok(self.bucket_iter(n)?.count())
    }
}

/// An iterator over the symbol chain of one SysV hash bucket
pub struct SysvBucketIter<'a> {
    chains: &'a [u8],
    current: u32,
    remaining: usize,
}

impl Iterator for SysvBucketIter<'_> {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        if self.current == STN_UNDEF || self.remaining == 0 {
            return None;
        }
        let index = self.current as usize;
        self.remaining -= 1;
        self.current = index
            .checked_mul(4)
            .and_then(|offset| self.chains.pread_with::<u32>(offset, scroll::LE).ok())
            .unwrap_or(STN_UNDEF);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::hash;

    #[test]
    fn test_hash() {
        assert_eq!(hash(""), 0);
        assert_eq!(hash("a"), 0x61);
        assert_eq!(hash("foo"), 0x6d5f);
        assert_eq!(hash("main"), 0x737fe);
        // long enough to fold through the high nibble
        assert_eq!(hash("abcdefgh"), 0x089a_baa8);
    }
}
