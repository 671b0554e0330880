//! PE entry resolution for PE32 and PE32+ images.
//!
//! The DOS header is only a pointer: `e_lfanew` locates the COFF header,
//! and a 6-byte discriminator there (PE signature plus machine type) picks
//! the optional-header layout. `AddressOfEntryPoint` is already relative to
//! `ImageBase`, so unlike ELF no rebasing arithmetic happens here.
//!
//! Reference: [PE Format](https://learn.microsoft.com/en-us/windows/win32/debug/pe-format)

use crate::entry::EntryPointResult;
use crate::error::ImageError;
use crate::format::Format;
use crate::read::{bytes_at, field, to_index, u32_at, u64_at};

/// File offset of `e_lfanew`, the COFF header pointer in the DOS header.
const E_LFANEW_OFFSET: usize = 0x3C;
/// PE signature plus `IMAGE_FILE_MACHINE_AMD64`.
const PE64_DISCRIMINATOR: &[u8] = &[0x50, 0x45, 0x00, 0x00, 0x64, 0x86];
/// PE signature plus `IMAGE_FILE_MACHINE_I386`.
const PE32_DISCRIMINATOR: &[u8] = &[0x50, 0x45, 0x00, 0x00, 0x4C, 0x01];
/// `AddressOfEntryPoint`, relative to the COFF header in both layouts.
const ENTRY_POINT_OFFSET: usize = 0x28;
/// `ImageBase` in the PE32+ optional header, relative to the COFF header.
const IMAGE_BASE64_OFFSET: usize = 0x30;
/// `ImageBase` in the PE32 optional header, relative to the COFF header.
const IMAGE_BASE32_OFFSET: usize = 0x34;

/// Locates the COFF header and returns its offset plus whether the optional
/// header uses the PE32+ layout.
///
/// Any discriminator other than the two known ones, including a corrupt PE
/// signature, reports [`ImageError::UnsupportedMachine`].
fn coff_header(data: &[u8]) -> Result<(usize, bool), ImageError> {
    let coff = to_index(u64::from(u32_at(data, E_LFANEW_OFFSET)?))?;
    match bytes_at(data, coff, 6)? {
        d if d == PE64_DISCRIMINATOR => Ok((coff, true)),
        d if d == PE32_DISCRIMINATOR => Ok((coff, false)),
        _ => Err(ImageError::UnsupportedMachine),
    }
}

/// Tells PE32 from PE32+ by the COFF discriminator.
pub(crate) fn classify(data: &[u8]) -> Result<Format, ImageError> {
    let (_, wide) = coff_header(data)?;
    Ok(if wide { Format::Pe64 } else { Format::Pe32 })
}

/// Resolves the image base and entry RVA of a PE image.
///
/// The caller has already matched the `MZ` magic.
pub(crate) fn resolve(data: &[u8]) -> Result<EntryPointResult, ImageError> {
    let (coff, wide) = coff_header(data)?;
    log::debug!("COFF header at {coff:#x}, PE32+ layout: {wide}");

    let entry_offset = u64::from(u32_at(data, field(coff, ENTRY_POINT_OFFSET)?)?);
    let load_address = if wide {
        u64_at(data, field(coff, IMAGE_BASE64_OFFSET)?)?
    } else {
        u64::from(u32_at(data, field(coff, IMAGE_BASE32_OFFSET)?)?)
    };
    log::info!("PE image base at {load_address:#x}, entry RVA {entry_offset:#x}");

    Ok(EntryPointResult {
        load_address,
        entry_offset,
    })
}
