//! ELF entry resolution, 32- and 64-bit, little-endian only.
//!
//! The two classes share one scan: validate the identification bytes, read
//! the class-specific header fields, then walk the program header table for
//! the first `PT_LOAD` entry. Its `p_vaddr` is the load address, and the
//! entry offset is `e_entry` made relative to it.
//!
//! Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)

use crate::entry::EntryPointResult;
use crate::error::ImageError;
use crate::format::Format;
use crate::read::{field, to_index, u16_at, u32_at, u64_at, u8_at};

/// `e_ident` index of the class (word size) byte.
const EI_CLASS: usize = 4;
/// `e_ident` index of the data encoding (byte order) byte.
const EI_DATA: usize = 5;
/// Class value for 32-bit objects.
const ELFCLASS32: u8 = 1;
/// Class value for 64-bit objects.
const ELFCLASS64: u8 = 2;
/// Encoding value for two's-complement little-endian.
const ELFDATA2LSB: u8 = 1;
/// Object file type: executable.
const ET_EXEC: u16 = 2;
/// Object file type: shared object, which covers PIE executables.
const ET_DYN: u16 = 3;
/// Program header type: loadable segment.
const PT_LOAD: u32 = 1;

/// Tells ELF32 from ELF64 by the class byte.
pub(crate) fn classify(data: &[u8]) -> Result<Format, ImageError> {
    match u8_at(data, EI_CLASS)? {
        ELFCLASS32 => Ok(Format::Elf32),
        ELFCLASS64 => Ok(Format::Elf64),
        _ => Err(ImageError::UnsupportedEncoding),
    }
}

/// Resolves the load address and entry offset of an ELF image.
///
/// The caller has already matched the `\x7fELF` magic.
pub(crate) fn resolve(data: &[u8]) -> Result<EntryPointResult, ImageError> {
    if u8_at(data, EI_DATA)? != ELFDATA2LSB {
        return Err(ImageError::UnsupportedEncoding);
    }

    let e_type = u16_at(data, 0x10)?;
    if e_type != ET_EXEC && e_type != ET_DYN {
        return Err(ImageError::UnsupportedImageType);
    }

    // Field offsets and widths differ by class; the program header scan
    // afterwards is shared.
    let (e_entry, e_phoff, e_phentsize, e_phnum, wide) = match u8_at(data, EI_CLASS)? {
        ELFCLASS32 => (
            u64::from(u32_at(data, 0x18)?),
            u64::from(u32_at(data, 0x1C)?),
            u16_at(data, 0x2A)?,
            u16_at(data, 0x2C)?,
            false,
        ),
        ELFCLASS64 => (
            u64_at(data, 0x18)?,
            u64_at(data, 0x20)?,
            u16_at(data, 0x36)?,
            u16_at(data, 0x38)?,
            true,
        ),
        _ => return Err(ImageError::UnsupportedEncoding),
    };
    log::debug!(
        "ELF header: e_entry={e_entry:#x} e_phoff={e_phoff:#x} \
         e_phentsize={e_phentsize} e_phnum={e_phnum}"
    );

    let load_address = first_load_vaddr(data, e_phoff, e_phentsize, e_phnum, wide)?;
    log::info!("First PT_LOAD segment at {load_address:#x}");

    Ok(EntryPointResult {
        load_address,
        // e_entry is absolute in the link-time address space; making it
        // relative keeps the pair valid after relocation. Wrapping keeps the
        // round trip exact even if e_entry sits below the load base.
        entry_offset: e_entry.wrapping_sub(load_address),
    })
}

/// Scans exactly `e_phnum` program headers and returns the `p_vaddr` of the
/// first `PT_LOAD` entry.
fn first_load_vaddr(
    data: &[u8],
    e_phoff: u64,
    e_phentsize: u16,
    e_phnum: u16,
    wide: bool,
) -> Result<u64, ImageError> {
    let mut offset = to_index(e_phoff)?;
    for _ in 0..e_phnum {
        if u32_at(data, offset)? == PT_LOAD {
            return if wide {
                u64_at(data, field(offset, 16)?)
            } else {
                u32_at(data, field(offset, 8)?).map(u64::from)
            };
        }
        offset = field(offset, usize::from(e_phentsize))?;
    }
    Err(ImageError::NoLoadSegment)
}
