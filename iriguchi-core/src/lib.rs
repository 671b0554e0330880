//! Finds where an executable image loads and where execution starts.
//!
//! Given the raw bytes of a Mach-O, PE, or ELF binary, [`resolve`] walks
//! just enough of the header tables to answer two questions: at which
//! virtual address the primary code segment is mapped, and how far past
//! that address the first instruction sits. The offset stays relative so
//! the pair survives relocation of position-independent images.
//!
//! ```
//! use iriguchi_core::{resolve, ImageError};
//!
//! fn declared_entry(image: &[u8]) -> Result<u64, ImageError> {
//!     Ok(resolve(image)?.entry_address())
//! }
//! ```

pub mod entry;
pub mod error;
pub mod format;
mod read;

pub use entry::*;
pub use error::*;
pub use format::*;
