use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use quarry_nbt::binary::{from_binary, from_reader};
use quarry_nbt::Compound;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::compression::Compression;
use crate::error::RegionError;

/// Size in bytes of a region file sector.
pub const SECTOR_SIZE: usize = 4096;

/// Amount of chunks in a region.
pub const CHUNKS_PER_REGION: usize = 1024;

/// A region file: up to 32x32 chunks of a world, individually
/// compressed, in sector-aligned slots behind two header tables.
#[derive(Debug)]
pub struct Region<S> {
    source: S,
    header: RegionHeader,
}

impl<S: Read + Seek> Region<S> {
    /// Reads the location and timestamp tables from the start of
    /// `source`.
    pub fn open(mut source: S) -> Result<Self, RegionError> {
        source.seek(SeekFrom::Start(0))?;
        let header = RegionHeader::parse(&mut source)?;

        debug!(
            present = header.locations.iter().filter(|l| !l.is_absent()).count(),
            "opened region file"
        );

        Ok(Self { source, header })
    }

    /// Returns the raw last-modified timestamp of the chunk at local
    /// coordinates `(x, z)`, exactly as stored in the header table.
    pub fn chunk_timestamp(&self, x: u8, z: u8) -> u32 {
        self.header.timestamps[slot(x, z)]
    }

    /// Reads and decodes the chunk at local coordinates `(x, z)`.
    ///
    /// Returns `Ok(None)` if the chunk is absent from the region.
    pub fn get_chunk(&mut self, x: u8, z: u8) -> Result<Option<RawChunk>, RegionError> {
        let mut buf = Vec::new();
        self.get_chunk_buffered(x, z, &mut buf)
    }

    /// Like [`Self::get_chunk`], reusing `decompress_buf` as scratch
    /// space for the decompressed payload.
    pub fn get_chunk_buffered(
        &mut self,
        x: u8,
        z: u8,
        decompress_buf: &mut Vec<u8>,
    ) -> Result<Option<RawChunk>, RegionError> {
        if !self.read_chunk_bytes(x, z, decompress_buf)? {
            return Ok(None);
        }

        let mut nbt_slice = decompress_buf.as_slice();
        let (data, _) = from_binary(&mut nbt_slice)?;

        if !nbt_slice.is_empty() {
            return Err(RegionError::TrailingNbtData);
        }

        Ok(Some(RawChunk {
            data,
            timestamp: self.chunk_timestamp(x, z),
        }))
    }

    /// Decodes the chunk at local coordinates `(x, z)` directly into a
    /// typed destination, binding compound children by wire name.
    pub fn get_chunk_as<T: DeserializeOwned>(
        &mut self,
        x: u8,
        z: u8,
    ) -> Result<Option<T>, RegionError> {
        let mut buf = Vec::new();
        if !self.read_chunk_bytes(x, z, &mut buf)? {
            return Ok(None);
        }

        let mut nbt_slice = buf.as_slice();
        let value = from_reader(&mut nbt_slice)?;

        if !nbt_slice.is_empty() {
            return Err(RegionError::TrailingNbtData);
        }

        Ok(Some(value))
    }

    /// Reads and decompresses the chunk payload into `buf`, replacing
    /// its contents. Returns false if the slot is absent.
    fn read_chunk_bytes(
        &mut self,
        x: u8,
        z: u8,
        buf: &mut Vec<u8>,
    ) -> Result<bool, RegionError> {
        let location = self.header.locations[slot(x, z)];

        if location.is_absent() {
            return Ok(false);
        }

        // A sector offset below 2 would put the chunk data inside the
        // header tables.
        if location.offset_sectors < 2 {
            return Err(RegionError::InvalidChunkSectorOffset);
        }

        trace!(x, z, offset_sectors = location.offset_sectors, "reading chunk");

        self.source.seek(SeekFrom::Start(location.offset()))?;

        let payload_len = self.source.read_u32::<BigEndian>()? as usize;
        if payload_len == 0 {
            return Err(RegionError::MissingChunkStream);
        }

        // The payload and its length field must fit in the sectors the
        // location table allocates to this chunk.
        let max_len = location.max_len();
        if payload_len.saturating_add(4) > max_len {
            return Err(RegionError::InvalidChunkSize {
                length: payload_len,
                max: max_len.saturating_sub(4),
            });
        }

        let scheme = self.source.read_u8()?;
        let compression =
            Compression::from_u8(scheme).ok_or(RegionError::InvalidCompressionScheme(scheme))?;

        // The length includes the compression scheme byte just read.
        let mut raw = vec![0_u8; payload_len - 1];
        self.source.read_exact(&mut raw)?;

        buf.clear();
        compression.decompress_to(&raw, buf)?;

        Ok(true)
    }
}

/// A chunk as stored on disk: the decoded compound plus the header
/// table's last-modified timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    pub data: Compound,
    pub timestamp: u32,
}

/// The two 4 KiB tables at the start of a region file.
#[derive(Clone, Debug)]
struct RegionHeader {
    locations: [ChunkLocation; CHUNKS_PER_REGION],
    timestamps: [u32; CHUNKS_PER_REGION],
}

impl RegionHeader {
    fn parse<R: Read>(source: &mut R) -> Result<Self, std::io::Error> {
        let mut table = [0_u8; SECTOR_SIZE];

        source.read_exact(&mut table)?;
        let mut locations = [ChunkLocation::default(); CHUNKS_PER_REGION];
        for (location, bytes) in locations.iter_mut().zip(table.chunks_exact(4)) {
            *location = ChunkLocation::load(bytes.try_into().unwrap());
        }

        source.read_exact(&mut table)?;
        let mut timestamps = [0_u32; CHUNKS_PER_REGION];
        for (timestamp, bytes) in timestamps.iter_mut().zip(table.chunks_exact(4)) {
            *timestamp = u32::from_be_bytes(bytes.try_into().unwrap());
        }

        Ok(Self {
            locations,
            timestamps,
        })
    }
}

/// The location of a chunk inside the region file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct ChunkLocation {
    /// Offset of the chunk's first sector, in sectors from file start.
    offset_sectors: u32,
    /// On-disk span of the chunk, in sectors.
    sector_count: u8,
}

impl ChunkLocation {
    fn load(bytes: [u8; 4]) -> Self {
        Self {
            offset_sectors: u32::from(bytes[0]) << 16
                | u32::from(bytes[1]) << 8
                | u32::from(bytes[2]),
            sector_count: bytes[3],
        }
    }

    /// An all-zero table entry means no chunk is stored in the slot.
    fn is_absent(self) -> bool {
        self.offset_sectors == 0 && self.sector_count == 0
    }

    fn offset(self) -> u64 {
        u64::from(self.offset_sectors) * SECTOR_SIZE as u64
    }

    fn max_len(self) -> usize {
        self.sector_count as usize * SECTOR_SIZE
    }
}

fn slot(x: u8, z: u8) -> usize {
    debug_assert!(x < 32, "region chunk x coordinate out of bounds");
    debug_assert!(z < 32, "region chunk z coordinate out of bounds");

    x as usize + z as usize * 32
}

/// A fully decoded region: 1024 chunk slots, present or absent, plus
/// the timestamp table verbatim.
#[derive(Debug, Clone)]
pub struct ParsedRegion {
    chunks: Vec<Option<RawChunk>>,
    timestamps: Vec<u32>,
}

impl ParsedRegion {
    /// Returns the chunk at local coordinates `(x, z)`, if present.
    pub fn chunk(&self, x: u8, z: u8) -> Option<&RawChunk> {
        self.chunks[slot(x, z)].as_ref()
    }

    /// Returns the raw last-modified timestamp of the slot at local
    /// coordinates `(x, z)`.
    pub fn timestamp(&self, x: u8, z: u8) -> u32 {
        self.timestamps[slot(x, z)]
    }

    /// Iterates over the present chunks together with their local
    /// coordinates.
    pub fn chunks(&self) -> impl Iterator<Item = (u8, u8, &RawChunk)> {
        self.chunks
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| ((i % 32) as u8, (i / 32) as u8, c)))
    }
}

/// Reads and decodes a whole region file.
///
/// The first error in any chunk fails the read; no partial region is
/// returned. Absent slots stay absent and cost nothing to skip.
pub fn read_region<S: Read + Seek>(source: S) -> Result<ParsedRegion, RegionError> {
    let mut region = Region::open(source)?;
    let mut decompress_buf = Vec::new();

    let mut chunks = Vec::with_capacity(CHUNKS_PER_REGION);
    for i in 0..CHUNKS_PER_REGION {
        let (x, z) = ((i % 32) as u8, (i / 32) as u8);
        chunks.push(region.get_chunk_buffered(x, z, &mut decompress_buf)?);
    }

    Ok(ParsedRegion {
        chunks,
        timestamps: region.header.timestamps.to_vec(),
    })
}

/// Like [`read_region`], but a chunk that fails to decode leaves its
/// slot absent and is reported alongside the region instead of failing
/// the whole read. Errors in the header tables still fail.
pub fn read_region_lenient<S: Read + Seek>(
    source: S,
) -> Result<(ParsedRegion, Vec<(usize, RegionError)>), RegionError> {
    let mut region = Region::open(source)?;
    let mut decompress_buf = Vec::new();

    let mut chunks = Vec::with_capacity(CHUNKS_PER_REGION);
    let mut errors = Vec::new();
    for i in 0..CHUNKS_PER_REGION {
        let (x, z) = ((i % 32) as u8, (i / 32) as u8);
        match region.get_chunk_buffered(x, z, &mut decompress_buf) {
            Ok(chunk) => chunks.push(chunk),
            Err(e) => {
                debug!(x, z, error = %e, "skipping unreadable chunk");
                errors.push((i, e));
                chunks.push(None);
            }
        }
    }

    Ok((
        ParsedRegion {
            chunks,
            timestamps: region.header.timestamps.to_vec(),
        },
        errors,
    ))
}
