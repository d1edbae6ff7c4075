#![doc = include_str!("../README.md")]

pub mod align;
pub mod read;
pub mod records;
pub mod reads;
pub mod sam;
pub mod write;

use std::{io, path::Path};

use thiserror::Error;

pub use align::{AlignmentReader, AlignmentWriter, VariationCounts};
pub use read::{ChunkIterator, EntryIterator, MessageChunk};
pub use reads::{ReadsReader, ReadsWriter};
pub use sam::SamHelper;
pub use write::ChunkWriter;

/// The 8-byte tag written in front of every chunk's length frame.
///
/// Readers skip these bytes unconditionally; the constant pattern exists so
/// that a future revision can carve a magic/version tag out of it without
/// breaking old readers.
pub const DELIMITER: [u8; 8] = [0xff; 8];

/// Bytes of framing per chunk: the delimiter plus a big-endian `i32` length.
pub const CHUNK_FRAME_LENGTH: usize = DELIMITER.len() + 4;

/// Number of records accumulated per chunk before the writers auto-flush.
pub const DEFAULT_ENTRIES_PER_CHUNK: usize = 10_000;

/// Sentinel marking "no quality byte" in reconstructed quality strings and
/// variation qualities.
pub const NO_QUAL: u8 = 0x00;

/// Extension of the chunked read-collection stream.
pub const READS_EXTENSION: &str = ".compact-reads";
/// Extension of the chunked alignment-collection stream.
pub const ENTRIES_EXTENSION: &str = ".entries";
/// Extension of the serialized alignment header sidecar.
pub const HEADER_EXTENSION: &str = ".header";
/// Extension of the chunked too-many-hits sidecar stream.
pub const TMH_EXTENSION: &str = ".tmh";
/// Extension of the text key/value statistics sidecar.
pub const STATS_EXTENSION: &str = ".stats";

const KNOWN_EXTENSIONS: [&str; 5] = [
    READS_EXTENSION,
    ENTRIES_EXTENSION,
    HEADER_EXTENSION,
    TMH_EXTENSION,
    STATS_EXTENSION,
];

/// Strips a recognized compact-format extension from `filename`, if present.
///
/// All files of one logical dataset share a basename; passing any of them
/// (or the bare basename itself) yields the same result.
pub fn basename(filename: &str) -> &str {
    for extension in KNOWN_EXTENSIONS {
        if let Some(stripped) = filename.strip_suffix(extension) {
            return stripped;
        }
    }
    filename
}

pub(crate) fn sidecar_path(basename: &Path, extension: &str) -> std::path::PathBuf {
    let mut name = basename.as_os_str().to_os_string();
    name.push(extension);
    std::path::PathBuf::from(name)
}

pub type GobyResult<T> = Result<T, GobyError>;

#[derive(Debug, Error)]
pub enum GobyError {
    #[error("Chunk at offset {offset} is truncated")]
    TruncatedChunk { offset: u64 },

    #[error("Chunk at offset {offset} declares a negative length ({length})")]
    NegativeChunkLength { offset: u64, length: i32 },

    #[error("Couldn't decompress chunk at offset {offset}: {source}")]
    BadCompression { offset: u64, source: io::Error },

    #[error("Couldn't parse the collection in chunk at offset {offset}: {source}")]
    BadCollection {
        offset: u64,
        source: prost::DecodeError,
    },

    #[error("Chunk payload is {length} bytes, too large for the length frame")]
    ChunkTooLarge { length: usize },

    #[error("No entry is in progress; call append_entry() first")]
    NoActiveEntry,

    #[error("Sequence variation read index went backwards: {last} then {current}")]
    NonMonotonicReadIndex { last: u32, current: u32 },

    #[error("Query aligned length {aligned} exceeds query length {length}")]
    BadAlignedLength { aligned: u32, length: u32 },

    #[error("Soft clip spans bytes {start}..{end} of a {len}-byte read")]
    BadSoftClip {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Query span {start}..{end} exceeds the {len}-byte aligned strings")]
    BadQuerySpan {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Aligned reference and query strings differ in length ({reference} vs {query})")]
    UnevenAlignedStrings { reference: usize, query: usize },

    #[error("Query length must be set before reverse-strand variations are derived")]
    MissingQueryLength,

    #[error("Couldn't parse the alignment header: {source}")]
    BadHeader { source: prost::DecodeError },

    #[error("Unrecognized CIGAR operation '{op}' in segment {segment}")]
    BadCigarOp { segment: usize, op: char },

    #[error("CIGAR string couldn't be parsed at byte {cursor}")]
    BadCigarString { cursor: usize },

    #[error("CIGAR segment {segment} consumes more query bases than were provided")]
    CigarQueryOverrun { segment: usize },

    #[error("MD tag exhausted at byte {cursor} while reconstructing CIGAR segment {segment}")]
    MdExhausted { segment: usize, cursor: usize },

    #[error("Expected {expected} at byte {cursor} of the MD tag in CIGAR segment {segment}")]
    MdUnexpected {
        segment: usize,
        cursor: usize,
        expected: &'static str,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_strips_known_extensions() {
        assert_eq!(basename("sample.compact-reads"), "sample");
        assert_eq!(basename("sample.entries"), "sample");
        assert_eq!(basename("sample.tmh"), "sample");
        assert_eq!(basename("sample"), "sample");
        assert_eq!(basename("sample.bam"), "sample.bam");
    }

    #[test]
    fn basename_strips_a_single_extension() {
        assert_eq!(basename("run.entries.entries"), "run.entries");
    }
}
