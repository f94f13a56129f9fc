//! The ELF class a binary was built for, and the word widths that follow
//! from it.
//!
//! Every structure this crate decodes is laid out differently for 32- and
//! 64-bit binaries, so the class is threaded through each constructor as an
//! explicit parameter rather than inferred from the bytes.

/// The ELF class of a binary: 32- or 64-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// A 32-bit (`ELFCLASS32`) binary
    Elf32,
    /// A 64-bit (`ELFCLASS64`) binary
    Elf64,
}

impl Class {
    /// Whether this is the 64-bit class
    #[inline]
    pub fn is_64(self) -> bool {
        matches!(self, Class::Elf64)
    }

    /// The size in bytes of a natural machine word for this class.
    ///
    /// This is the width of a GNU hash bloom filter entry; reading bloom
    /// words at the wrong width corrupts both bit positions the filter
    /// checks.
    #[inline]
    pub fn word_size(self) -> usize {
        match self {
            Class::Elf32 => 4,
            Class::Elf64 => 8,
        }
    }

    /// The number of bits in a natural machine word for this class
    #[inline]
    pub fn word_bits(self) -> u32 {
        self.word_size() as u32 * 8
    }
}

impl Default for Class {
    fn default() -> Self {
        Class::Elf64
    }
}
