//! Entry-point resolution over a raw image buffer.

use crate::error::ImageError;
use crate::format::{elf, macho, pe, ELF_MAGIC, MACHO64_MAGIC, PE_DOS_MAGIC};

/// Where an image loads and where execution starts, as a relocatable pair.
///
/// `entry_offset` is kept relative to `load_address` so the result stays
/// meaningful for position-independent images: after the loader rebases the
/// image, the first instruction is still `entry_offset` past wherever the
/// primary segment actually landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPointResult {
    /// Virtual address of the primary code-bearing segment as recorded in
    /// the image, before any relocation.
    pub load_address: u64,
    /// Offset of the first instruction relative to `load_address`.
    pub entry_offset: u64,
}

impl EntryPointResult {
    /// Returns the absolute entry address the image itself declares.
    pub fn entry_address(&self) -> u64 {
        self.load_address.wrapping_add(self.entry_offset)
    }
}

/// Resolves the load address and entry offset of an executable image.
///
/// The container family is decided by magic prefix alone: once a prefix
/// matches, that family's decoder owns the buffer and any defect inside it
/// is reported in the family's own terms rather than falling through to
/// another format. A buffer matching no prefix fails with
/// [`ImageError::UnrecognizedFormat`].
///
/// The resolver only reads the buffer. Same bytes in, same result out.
pub fn resolve(data: &[u8]) -> Result<EntryPointResult, ImageError> {
    if data.starts_with(&MACHO64_MAGIC) {
        macho::resolve(data)
    } else if data.starts_with(&PE_DOS_MAGIC) {
        pe::resolve(data)
    } else if data.starts_with(&ELF_MAGIC) {
        elf::resolve(data)
    } else {
        Err(ImageError::UnrecognizedFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::elf::tests::{append_phdr32, append_phdr64, make_elf32, make_elf64};
    use crate::format::macho::tests::{append_main, append_segment64, make_macho};
    use crate::format::pe::tests::{make_pe32, make_pe64};

    const PT_LOAD: u32 = 1;

    fn sample_elf64() -> Vec<u8> {
        let mut image = make_elf64(0x0040_0120);
        append_phdr64(&mut image, PT_LOAD, 0x0040_0000);
        image
    }

    fn sample_macho() -> Vec<u8> {
        let mut image = make_macho();
        append_segment64(&mut image, b"__TEXT", 0x1_0000_0000, &[(b"__text", 0x500)]);
        append_main(&mut image, 0x1000);
        image
    }

    #[test]
    fn dispatches_each_family() {
        let entry = resolve(&sample_elf64()).unwrap();
        assert_eq!((entry.load_address, entry.entry_offset), (0x0040_0000, 0x120));

        let entry = resolve(&make_pe64(0x1_4000_0000, 0x1000)).unwrap();
        assert_eq!(
            (entry.load_address, entry.entry_offset),
            (0x1_4000_0000, 0x1000)
        );

        let entry = resolve(&sample_macho()).unwrap();
        assert_eq!(
            (entry.load_address, entry.entry_offset),
            (0x1_0000_0000, 0x1000)
        );
    }

    #[test]
    fn unknown_magic() {
        assert_eq!(resolve(b"#!/bin/sh\n"), Err(ImageError::UnrecognizedFormat));
        assert_eq!(resolve(&[]), Err(ImageError::UnrecognizedFormat));
        // Three bytes of a four-byte magic never match.
        assert_eq!(
            resolve(&[0xCF, 0xFA, 0xED]),
            Err(ImageError::UnrecognizedFormat)
        );
    }

    #[test]
    fn matched_family_owns_the_buffer() {
        // "MZ" alone is enough to commit to the PE decoder, whose first
        // required field is then out of range.
        assert_eq!(resolve(b"MZ"), Err(ImageError::TruncatedBuffer));
    }

    #[test]
    fn entry_address_round_trip() {
        let entry = EntryPointResult {
            load_address: 0x0040_0000,
            entry_offset: 0x120,
        };
        assert_eq!(entry.entry_address(), 0x0040_0120);

        let wrapped = EntryPointResult {
            load_address: u64::MAX,
            entry_offset: 2,
        };
        assert_eq!(wrapped.entry_address(), 1);
    }

    #[test]
    fn resolution_is_deterministic() {
        let image = sample_macho();
        assert_eq!(resolve(&image), resolve(&image));

        let garbage = b"\x00\x01\x02\x03";
        assert_eq!(resolve(garbage), resolve(garbage));
    }

    /// Every prefix of a valid image must either fail with a typed error or
    /// agree with the full resolution. Nothing may panic.
    fn truncation_is_clean(image: &[u8]) {
        let full = resolve(image);
        for len in 0..image.len() {
            if let Ok(partial) = resolve(&image[..len]) {
                assert_eq!(Ok(partial), full, "{len}-byte prefix disagrees");
            }
        }
    }

    #[test]
    fn truncation_is_clean_for_every_format() {
        truncation_is_clean(&sample_elf64());
        truncation_is_clean(&sample_macho());
        truncation_is_clean(&make_pe64(0x1_4000_0000, 0x1000));
        truncation_is_clean(&make_pe32(0x0040_0000, 0x1234));

        let mut elf32 = make_elf32(0x0804_8100);
        append_phdr32(&mut elf32, PT_LOAD, 0x0804_8000);
        truncation_is_clean(&elf32);
    }
}
