//! The GNU symbol hash table, `.gnu.hash`, pointed at by `DT_GNU_HASH`.
//! For more about how it is constructed and how it resolves symbols, see:
//! <https://flapenguin.me/elf-dt-gnu-hash>
//!
//! A GNU hash table has 4 sections:
//!
//!   1. Header
//!   2. Bloom filter
//!   3. Hash buckets
//!   4. Chain (per-symbol hash values)
//!
//! The header is an array of four u32s:
//!
//!   1. nbucket
//!   2. symoffset
//!   3. bloom_size
//!   4. bloom_shift
//!
//! Bloom filter entries are machine words: 32 bits wide on a 32-bit class
//! binary, 64 bits on a 64-bit one. A bucket cell holds the symbol table
//! index of the first symbol hashing to that bucket (at least `symoffset`),
//! or 0 if the bucket is empty. The chain holds one u32 per symbol from
//! `symoffset` onward: the symbol's own hash, with the least significant bit
//! reused as an end-of-chain flag. The format requires symbols from
//! `symoffset` on to be sorted by bucket, which is what makes a bucket a
//! contiguous index range.

use log::debug;
use scroll::Pread;

use crate::container::Class;
use crate::elf::symbol_name_matches;
use crate::elf::sym::Symtab;
use crate::error;
use crate::strtab::Strtab;

/// The number of u32s in the header
const SIZEOF_HEADER: usize = 16;

/// GNU hash function: takes a symbol name and returns the u32 hash of that
/// name
pub const fn hash(symbol: &str) -> u32 {
    const HASH_SEED: u32 = 5381;
    let bytes = symbol.as_bytes();
    let mut hash = HASH_SEED;
    let mut i = 0;
    while i < bytes.len() {
        hash = hash.wrapping_mul(33).wrapping_add(bytes[i] as u32);
        i += 1;
    }
    hash
}

/// A GNU hash table, decoded from the bytes of a `.gnu.hash` section.
///
/// Holds borrows of the hash bytes, the symbol table view and the string
/// table; nothing is copied, so lookups from several threads at once are
/// fine. The symbol count comes from the [`Symtab`], i.e. from container
/// metadata; the table itself carries no authoritative count (see
/// [`scanned_len`](Self::scanned_len)).
#[derive(Debug)]
pub struct GnuHash<'a> {
    nbucket: usize,
    symindex: usize,
    shift2: u32,
    bloom_count: usize,
    bloom: &'a [u8],
    buckets: &'a [u8],
    chains: &'a [u8],
    chain_count: usize,
    symtab: Symtab<'a>,
    strtab: Strtab<'a>,
}

impl<'a> GnuHash<'a> {
    /// Decode a GNU hash table from `bytes`, which must span exactly the
    /// section contents. The bloom filter word width follows the class the
    /// symbol table was parsed with. Fails if the header is truncated,
    /// `nbucket` or `bloom_size` is zero, `symoffset` exceeds the symbol
    /// count, or the declared arrays do not fit in `bytes`.
    pub fn parse(
        bytes: &'a [u8],
        symtab: Symtab<'a>,
        strtab: Strtab<'a>,
    ) -> error::Result<GnuHash<'a>> {
        let nbucket = bytes.pread_with::<u32>(0, scroll::LE)? as usize;
        let symindex = bytes.pread_with::<u32>(4, scroll::LE)? as usize;
        let bloom_count = bytes.pread_with::<u32>(8, scroll::LE)? as usize;
        let shift2 = bytes.pread_with::<u32>(12, scroll::LE)?;
        if nbucket == 0 {
            return Err(error::Error::Malformed("gnu hash table has zero buckets".into()));
        }
        if bloom_count == 0 {
            return Err(error::Error::Malformed("gnu hash table has an empty bloom filter".into()));
        }
        if symindex > symtab.len() {
            return Err(error::Error::Malformed(format!(
                "gnu hash symoffset {symindex} exceeds symbol count {}",
                symtab.len()
            )));
        }
        let chain_count = symtab.len() - symindex;
        let bloom_size = bloom_count
            .checked_mul(symtab.class().word_size())
            .ok_or_else(|| error::Error::Malformed(format!("bloom_size {bloom_count} overflows")))?;
        let buckets_start = SIZEOF_HEADER
            .checked_add(bloom_size)
            .ok_or_else(|| error::Error::Malformed(format!("bloom_size {bloom_count} overflows")))?;
        let chains_start = nbucket
            .checked_mul(4)
            .and_then(|size| buckets_start.checked_add(size))
            .ok_or_else(|| error::Error::Malformed(format!("nbucket {nbucket} overflows")))?;
        let end = chain_count
            .checked_mul(4)
            .and_then(|size| chains_start.checked_add(size))
            .ok_or_else(|| error::Error::Malformed(format!("chain count {chain_count} overflows")))?;
        if end > bytes.len() {
            return Err(error::Error::Malformed(format!(
                "gnu hash arrays (nbucket {nbucket}, bloom_size {bloom_count}, {chain_count} chain \
                 entries) exceed section size {:#x}",
                bytes.len()
            )));
        }
        debug!(
            "gnu hash table: {nbucket} buckets, symoffset {symindex}, {bloom_count} bloom words, \
             shift {shift2}"
        );
        Ok(GnuHash {
            nbucket,
            symindex,
            shift2,
            bloom_count,
            bloom: &bytes[SIZEOF_HEADER..buckets_start],
            buckets: &bytes[buckets_start..chains_start],
            chains: &bytes[chains_start..end],
            chain_count,
            symtab,
            strtab,
        })
    }

    /// The number of hash buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.nbucket
    }

    /// The index of the first symbol the table hashes; earlier symbols
    /// (the null symbol, unexported locals) are not searchable
    #[inline]
    pub fn symbol_offset(&self) -> usize {
        self.symindex
    }

    /// The number of symbol records covered by this table, taken from the
    /// symbol table view it was constructed with
    #[inline]
    pub fn len(&self) -> usize {
        self.symtab.len()
    }

    /// Whether the table covers no symbols
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symtab.is_empty()
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

    #[inline]
    fn class(&self) -> Class {
        self.symtab.class()
    }

    fn bucket(&self, n: usize) -> error::Result<u32> {
        Ok(self.buckets.pread_with::<u32>(n * 4, scroll::LE)?)
    }

    fn chain(&self, position: usize) -> error::Result<u32> {
        Ok(self.chains.pread_with::<u32>(position * 4, scroll::LE)?)
    }

    /// Probe the bloom filter for `hash`.
    ///
    /// `false` means the hash is definitely absent and the buckets need not
    /// be consulted; `true` means it may be present. Every hash actually in
    /// the table passes, by construction of the filter.
    pub fn bloom_test(&self, hash: u32) -> bool {
        let bits = self.class().word_bits();
        let index = (hash / bits) as usize % self.bloom_count;
        let word = match self.class() {
            Class::Elf32 => {
                self.bloom.pread_with::<u32>(index * 4, scroll::LE).map(u64::from)
            }
            Class::Elf64 => self.bloom.pread_with::<u64>(index * 8, scroll::LE),
        };
        let Ok(word) = word else {
            // unreachable after parse validated the extent
            return false;
        };
        let hash2 = hash.checked_shr(self.shift2).unwrap_or(0);
        let mask = (1u64 << (hash % bits)) | (1u64 << (hash2 % bits));
        (word & mask) == mask
    }

    /// Look up `name`, returning its symbol table index if present.
    ///
    /// Names whose hash fails the bloom filter are rejected without touching
    /// the buckets. `Ok(None)` means the name is not in the table; an `Err`
    /// means the table is not searchable (a chain without an end flag, or an
    /// out-of-bounds name offset).
    pub fn find(&self, name: &str) -> error::Result<Option<usize>> {
        let hash = self::hash(name);
        if !self.bloom_test(hash) {
            return Ok(None);
        }
        self.lookup(name, hash)
    }

    fn lookup(&self, name: &str, hash: u32) -> error::Result<Option<usize>> {
        let n = hash as usize % self.nbucket;
        let start = self.bucket(n)? as usize;
        if start < self.symindex {
            // empty bucket
            return Ok(None);
        }
        let mut index = start;
        let mut position = start - self.symindex;
        loop {
            if position >= self.chain_count {
                return Err(error::Error::TraversalOverflow { limit: self.chain_count });
            }
            let chain = self.chain(position)?;
            if (chain | 1) == (hash | 1)
                && symbol_name_matches(&self.symtab, &self.strtab, index, name)?
            {
                return Ok(Some(index));
            }
            if chain & 1 == 1 {
                return Ok(None);
            }
            index += 1;
            position += 1;
        }
    }

    /// The symbol table index of the first symbol in bucket `n`.
    ///
    /// An empty bucket has no index range of its own; its begin is the next
    /// non-empty bucket's begin, bottoming out at [`len`](Self::len) when
    /// every later bucket is empty too.
    pub fn bucket_begin(&self, n: usize) -> error::Result<usize> {
        for m in n..self.nbucket {
            let start = self.bucket(m)? as usize;
            if start < self.symindex {
                continue;
            }
            if start >= self.len() {
                return Err(error::Error::Malformed(format!(
                    "bucket {m} starts at {start}, past the last symbol ({})",
                    self.len()
                )));
            }
            return Ok(start);
        }
        Ok(self.len())
    }

    /// One past the symbol table index of the last symbol in bucket `n`
    pub fn bucket_end(&self, n: usize) -> error::Result<usize> {
        self.bucket_begin(n + 1)
    }

    /// Iterate the symbol table indices of bucket `n`: the contiguous range
    /// `bucket_begin(n)..bucket_end(n)`.
    pub fn bucket_iter(&self, n: usize) -> error::Result<GnuBucketIter> {
        if n >= self.nbucket {
            return Err(error::Error::Malformed(format!(
                "bucket index {n} out of range ({})",
                self.nbucket
            )));
        }
        Ok(GnuBucketIter { range: self.bucket_begin(n)?..self.bucket_end(n)? })
    }

    /// The number of symbols in bucket `n`
    pub fn bucket_len(&self, n: usize) -> error::Result<usize> {
        Ok(self.bucket_iter(n)?.range.len())
    }

    /// Reconstruct the symbol count from the table alone: find the highest
    /// non-empty bucket and scan its chain to the first end-of-chain flag.
    ///
    /// The format has no authoritative end marker, so this is best-effort;
    /// it agrees with [`len`](Self::len) on well-formed tables but cannot
    /// see trailing symbols a corrupt table fails to chain. Prefer `len`,
    /// which reflects the count the container metadata declared.
    pub fn scanned_len(&self) -> error::Result<usize> {
        let mut last: Option<usize> = None;
        for n in 0..self.nbucket {
            let start = self.bucket(n)? as usize;
            if start >= self.symindex {
                last = Some(last.map_or(start, |highest| highest.max(start)));
            }
        }
        let Some(start) = last else {
            // no bucket hashes anything: only the unhashed prefix exists
            return Ok(self.symindex);
        };
        let mut position = start - self.symindex;
        loop {
            if position >= self.chain_count {
                return Err(error::Error::TraversalOverflow { limit: self.chain_count });
            }
            let chain = self.chain(position)?;
            position += 1;
            if chain & 1 == 1 {
                break;
            }
        }
        Ok(self.symindex + position)
    }
}

/// An iterator over the contiguous symbol index range of one GNU hash bucket
pub struct GnuBucketIter {
    range: core::ops::Range<usize>,
}

impl Iterator for GnuBucketIter {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        self.range.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for GnuBucketIter {}

#[cfg(test)]
mod tests {
    use super::hash;

    #[test]
    fn test_hash() {
        assert_eq!(hash(""), 0x0000_1505);
        assert_eq!(hash("printf"), 0x156b_2bb8);
        assert_eq!(hash("exit"), 0x7c96_7e3f);
        assert_eq!(hash("syscall"), 0xb105_41a0);
        assert_eq!(hash("flapenguin.me"), 0x8ae9_f18e);
    }
}
