#![no_main]
use libfuzzer_sys::fuzz_target;

use dynsym::container::Class;
use dynsym::elf::{Sym, Symtab, SysvHash};
use dynsym::strtab::Strtab;

fuzz_target!(|data: &[u8]| {
    for class in [Class::Elf32, Class::Elf64] {
        let count = data.len() / Sym::size(class);
        let Ok(symtab) = Symtab::parse(data, 0, count, class) else {
            continue;
        };
        let strtab = Strtab::new(data);
        if let Ok(table) = SysvHash::parse(data, symtab, strtab) {
            let _ = table.find("printf");
            let _ = table.find("");
            let _ = table.len();
            for n in 0..table.bucket_count().min(16) {
                if let Ok(iter) = table.bucket_iter(n) {
                    let _ = iter.count();
                }
            }
        }
    }
});
