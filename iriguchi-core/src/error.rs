use thiserror::Error;

/// Every way a resolution can fail.
///
/// The set is closed on purpose: callers match on it to decide whether a
/// buffer was the wrong kind of file (`UnrecognizedFormat`), a damaged file
/// (`TruncatedBuffer`), or a well-formed file the resolver does not decode
/// (the `Unsupported*` variants). Decoders never return partial results
/// alongside an error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    /// The buffer starts with none of the known magic numbers.
    #[error("unrecognized image format (no known magic number)")]
    UnrecognizedFormat,

    /// A header field lies wholly or partly past the end of the buffer.
    #[error("image truncated: header field out of range")]
    TruncatedBuffer,

    /// Recognized container, but a machine type the resolver does not decode.
    #[error("unsupported machine type")]
    UnsupportedMachine,

    /// Recognized container, but a byte order or word size the resolver does
    /// not decode. Only little-endian images are handled.
    #[error("unsupported data encoding")]
    UnsupportedEncoding,

    /// ELF image whose `e_type` is neither `ET_EXEC` nor `ET_DYN`.
    #[error("unsupported image type (want an executable or shared object)")]
    UnsupportedImageType,

    /// Mach-O image with no `__TEXT` segment among its load commands.
    #[error("segment __TEXT not found")]
    SegmentNotFound,

    /// Mach-O image whose `__TEXT` sections were searched without finding
    /// `__text`, with no `LC_MAIN` command to fall back on.
    #[error("section __text not found in segment __TEXT")]
    SectionNotFound,

    /// ELF image with no `PT_LOAD` entry in its program header table.
    #[error("no loadable segment (PT_LOAD) present")]
    NoLoadSegment,

    /// Mach-O image carrying neither an `LC_MAIN` command nor any `__TEXT`
    /// section to fall back on.
    #[error("no entry point recorded in the image")]
    EntryPointNotFound,
}
