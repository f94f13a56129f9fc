#[macro_use]
extern crate afl;

use dynsym::container::Class;
use dynsym::elf::{GnuHash, Sym, Symtab, SysvHash};
use dynsym::strtab::Strtab;

fn main() {
    fuzz!(|data: &[u8]| {
        for class in [Class::Elf32, Class::Elf64] {
            let count = data.len() / Sym::size(class);
            let Ok(symtab) = Symtab::parse(data, 0, count, class) else {
                continue;
            };
            let strtab = Strtab::new(data);
            if let Ok(table) = SysvHash::parse(data, symtab, strtab) {
                let _ = table.find("printf");
                for n in 0..table.bucket_count().min(16) {
                    if let Ok(iter) = table.bucket_iter(n) {
                        let _ = iter.count();
                    }
                }
            }
            if let Ok(table) = GnuHash::parse(data, symtab, strtab) {
                let _ = table.find("printf");
                let _ = table.scanned_len();
                for n in 0..table.bucket_count().min(16) {
                    let _ = table.bucket_len(n);
                }
            }
        }
    });
}
