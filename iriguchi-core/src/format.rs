//! Container format classification.
//!
//! The family (Mach-O, PE, ELF) is read off the magic prefix alone; the PE
//! and ELF sub-variants need one more identification field each, so
//! classification shares the container-level failure modes of resolution.

use crate::error::ImageError;

pub(crate) mod elf;
pub(crate) mod macho;
pub(crate) mod pe;

/// Magic number of a little-endian 64-bit Mach-O image (`MH_MAGIC_64`).
pub(crate) const MACHO64_MAGIC: [u8; 4] = [0xCF, 0xFA, 0xED, 0xFE];

/// First two bytes of every DOS/PE image (`MZ`).
pub(crate) const PE_DOS_MAGIC: [u8; 2] = [0x4D, 0x5A];

/// First four bytes of every ELF image (`\x7f`, `'E'`, `'L'`, `'F'`).
pub(crate) const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// The container formats the resolver decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// 64-bit little-endian Mach-O.
    MachO64,
    /// PE with a 32-bit optional header (i386 machine type).
    Pe32,
    /// PE with a 64-bit optional header (x86-64 machine type).
    Pe64,
    /// 32-bit ELF.
    Elf32,
    /// 64-bit ELF.
    Elf64,
}

impl Format {
    /// Classifies a buffer without resolving its entry point.
    ///
    /// Telling PE32 from PE32+ (or ELF32 from ELF64) means reading past the
    /// magic, so a buffer cut short inside the identification fields fails
    /// with [`ImageError::TruncatedBuffer`] rather than classifying.
    pub fn detect(data: &[u8]) -> Result<Format, ImageError> {
        if data.starts_with(&MACHO64_MAGIC) {
            Ok(Format::MachO64)
        } else if data.starts_with(&PE_DOS_MAGIC) {
            pe::classify(data)
        } else if data.starts_with(&ELF_MAGIC) {
            elf::classify(data)
        } else {
            Err(ImageError::UnrecognizedFormat)
        }
    }

    /// Returns a short human-readable name, e.g. "ELF64" or "PE32+".
    pub fn name(self) -> &'static str {
        match self {
            Format::MachO64 => "Mach-O 64",
            Format::Pe32 => "PE32",
            Format::Pe64 => "PE32+",
            Format::Elf32 => "ELF32",
            Format::Elf64 => "ELF64",
        }
    }

    /// Returns true if this is a 64-bit format.
    pub fn is_64(self) -> bool {
        matches!(self, Format::MachO64 | Format::Pe64 | Format::Elf64)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
