//! # `dynsym`
//!
//! Decoding and lookup for the two hash tables ELF dynamic linking uses to
//! resolve symbol names: the legacy SysV table (`.hash`, `DT_HASH`) and the
//! bloom-filter accelerated GNU table (`.gnu.hash`, `DT_GNU_HASH`).
//!
//! This crate does what a dynamic loader does at lookup time, and only
//! that: given the raw bytes of a hash section, a view over the dynamic
//! symbol table and the associated string table, it answers
//! `find(name) -> symbol index` straight from the on-disk structures. It
//! never builds or mutates tables, resolves versioning, or touches a file;
//! locating the byte ranges inside a binary is the container parser's job.
//!
//! Everything is a borrowed view over caller-owned bytes. Reads are bounds
//! checked; there are no struct overlays or pointer casts, so corrupt and
//! adversarial input surfaces as errors instead of undefined behavior.
//! Decoded tables are immutable, making concurrent lookups safe without
//! locks.
//!
//! # Example
//!
//! ```rust
//! use dynsym::container::Class;
//! use dynsym::elf::{Symtab, SysvHash};
//! use dynsym::strtab::Strtab;
//!
//! # fn main() -> dynsym::error::Result<()> {
//! // A 64-bit dynamic symbol table: the null symbol, then `foo`
//! let mut symtab_bytes = vec![0u8; 24];
//! let mut foo = [0u8; 24];
//! foo[0..4].copy_from_slice(&1u32.to_le_bytes()); // st_name: "foo"
//! symtab_bytes.extend_from_slice(&foo);
//!
//! // The matching .hash section: nbucket 1, nchain 2, bucket[0] = 1,
//! // chain = [0, 0]
//! let mut hash_bytes = Vec::new();
//! for word in [1u32, 2, 1, 0, 0] {
//!     hash_bytes.extend_from_slice(&word.to_le_bytes());
//! }
//!
//! let symtab = Symtab::parse(&symtab_bytes, 0, 2, Class::Elf64)?;
//! let strtab = Strtab::new(b"\0foo\0");
//! let table = SysvHash::parse(&hash_bytes, symtab, strtab)?;
//! assert_eq!(table.find("foo")?, Some(1));
//! assert_eq!(table.find("bar")?, None);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
extern crate alloc;

pub mod container;
pub mod elf;
pub mod error;
pub mod strtab;
