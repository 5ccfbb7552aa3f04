use std::io;

use thiserror::Error;

/// Errors that can occur while reading a region file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegionError {
    #[error("an I/O error occurred: {0}")]
    Io(#[from] io::Error),
    #[error("invalid chunk sector offset")]
    InvalidChunkSectorOffset,
    #[error("chunk is allocated, but stream is missing")]
    MissingChunkStream,
    #[error("chunk payload of {length} bytes does not fit in its {max} byte allocation")]
    InvalidChunkSize { length: usize, max: usize },
    #[error("invalid compression scheme number of {0}")]
    InvalidCompressionScheme(u8),
    #[error("failed to parse NBT: {0}")]
    Nbt(#[from] quarry_nbt::binary::Error),
    #[error("not all chunk NBT data was read")]
    TrailingNbtData,
}

/// Errors that can occur while sniffing the framing of an NBT stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SniffError {
    #[error("an I/O error occurred: {0}")]
    Io(#[from] io::Error),
    #[error("unrecognized leading byte `{0:#04x}`: not NBT and not a known compression format")]
    UnrecognizedFormat(u8),
}

/// Errors that can occur while reading `level.dat`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LevelError {
    #[error(transparent)]
    Sniff(#[from] SniffError),
    #[error("failed to parse NBT: {0}")]
    Nbt(#[from] quarry_nbt::binary::Error),
}

/// Errors that can occur while indexing into a paletted container.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[non_exhaustive]
pub enum PaletteError {
    #[error("index {index} is out of bounds of capacity {capacity}")]
    OutOfBounds { index: usize, capacity: usize },
    #[error("pre-1.16 contiguous palette packing is not supported")]
    UnsupportedPacking,
}
