//! Mach-O entry resolution, 64-bit little-endian images only.
//!
//! The walk visits every load command once. `LC_SEGMENT_64` named `__TEXT`
//! supplies the load address and, through its section records, a fallback
//! entry offset from the `__text` section; `LC_MAIN` supplies the preferred
//! entry offset. Either mechanism alone is enough, and `LC_MAIN` wins when
//! both are present.
//!
//! Reference: [OS X ABI Mach-O File Format Reference](https://github.com/aidansteele/osx-abi-macho-file-format-reference)

use crate::entry::EntryPointResult;
use crate::error::ImageError;
use crate::read::{bytes_at, field, padded_name_is, u32_at, u64_at};

/// The only CPU type decoded (`CPU_TYPE_X86_64`).
const CPU_TYPE_X86_64: u32 = 0x0100_0007;
/// Load command tag for a 64-bit segment (`segment_command_64`).
const LC_SEGMENT_64: u32 = 0x19;
/// Load command tag for the entry point (`entry_point_command`).
const LC_MAIN: u32 = 0x8000_0028;
/// Offset of the first load command, directly after the 64-bit header.
const LOAD_COMMANDS_OFFSET: usize = 0x20;
/// Offset of the first `section_64` record from its segment command.
const SECTIONS_OFFSET: usize = 0x48;
/// Size of one `section_64` record.
const SECTION64_SIZE: usize = 0x50;

/// Resolves the load address and entry offset of a 64-bit Mach-O image.
///
/// The caller has already matched the `MH_MAGIC_64` magic.
pub(crate) fn resolve(data: &[u8]) -> Result<EntryPointResult, ImageError> {
    if u32_at(data, 4)? != CPU_TYPE_X86_64 {
        return Err(ImageError::UnsupportedMachine);
    }
    let ncmds = u32_at(data, 16)?;
    log::debug!("Mach-O header: ncmds={ncmds}");

    let mut vmaddr = None;
    let mut main_offset = None;
    let mut section_offset = None;
    let mut searched_sections = false;

    // Commands are variable-length; cmdsize is the only valid stride. The
    // walk never stops early, so damage anywhere in the command list is
    // reported even after the answer has been seen.
    let mut offset = LOAD_COMMANDS_OFFSET;
    for _ in 0..ncmds {
        let cmd = u32_at(data, offset)?;
        let cmdsize = u32_at(data, field(offset, 4)?)?;

        if cmd == LC_SEGMENT_64
            && padded_name_is(bytes_at(data, field(offset, 8)?, 16)?, b"__TEXT")
        {
            let addr = u64_at(data, field(offset, 24)?)?;
            log::info!("__TEXT segment mapped at {addr:#x}");
            vmaddr = Some(addr);

            let nsects = u32_at(data, field(offset, 64)?)?;
            searched_sections = nsects > 0;
            let mut sect = field(offset, SECTIONS_OFFSET)?;
            for _ in 0..nsects {
                if padded_name_is(bytes_at(data, sect, 16)?, b"__text") {
                    // File offset of the section contents.
                    section_offset = Some(u32_at(data, field(sect, 0x30)?)?);
                    break;
                }
                sect = field(sect, SECTION64_SIZE)?;
            }
        } else if cmd == LC_MAIN {
            main_offset = Some(u32_at(data, field(offset, 8)?)?);
        }

        offset = field(offset, cmdsize as usize)?;
    }

    let load_address = vmaddr.ok_or(ImageError::SegmentNotFound)?;

    let entry_offset = match (main_offset, section_offset) {
        (Some(entryoff), _) => u64::from(entryoff),
        (None, Some(fileoff)) => {
            log::warn!("No LC_MAIN command; using the __text section file offset");
            u64::from(fileoff)
        }
        (None, None) if searched_sections => return Err(ImageError::SectionNotFound),
        (None, None) => return Err(ImageError::EntryPointNotFound),
    };

    Ok(EntryPointResult {
        load_address,
        entry_offset,
    })
}
