#![no_main]
use libfuzzer_sys::fuzz_target;

use dynsym::container::Class;
use dynsym::elf::{GnuHash, Sym, Symtab, gnu_hash};
use dynsym::strtab::Strtab;

fuzz_target!(|data: &[u8]| {
    for class in [Class::Elf32, Class::Elf64] {
        let count = data.len() / Sym::size(class);
        let Ok(symtab) = Symtab::parse(data, 0, count, class) else {
            continue;
        };
        let strtab = Strtab::new(data);
        if let Ok(table) = GnuHash::parse(data, symtab, strtab) {
            let _ = table.find("printf");
            let _ = table.find("");
            let _ = table.bloom_test(gnu_hash::hash("x"));
            let _ = table.scanned_len();
            for n in 0..table.bucket_count().min(16) {
                let _ = table.bucket_len(n);
                if let Ok(iter) = table.bucket_iter(n) {
                    let _ = iter.count();
                }
            }
        }
    }
});
