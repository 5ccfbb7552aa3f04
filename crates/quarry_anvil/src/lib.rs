//! A reader for Minecraft: Java Edition's Anvil world format: the
//! region files under `region/r.<X>.<Z>.mca`, the chunks inside them,
//! the bit-packed palettes inside those, and the world's `level.dat`.
//!
//! [`Region`] reads one region file; [`read_region`] decodes all of
//! its chunks in one go. [`RegionFolder`] resolves absolute chunk
//! positions to region files and keeps a bounded number of them open.
//! Chunk NBT is decoded with [`quarry_nbt`], either into dynamic
//! compounds or into caller-defined types.

use std::fs::File;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use compression::{Compression, DecompressReader};
pub use error::{LevelError, PaletteError, RegionError, SniffError};
pub use level::{Level, LevelData, LevelVersion};
pub use palette::{palette_index, Packing, PalettedContainer};
pub use region::{
    read_region, read_region_lenient, ParsedRegion, RawChunk, Region, CHUNKS_PER_REGION,
    SECTOR_SIZE,
};

pub mod compression;
mod error;
pub mod level;
pub mod palette;
pub mod region;

const LRU_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => unreachable!(),
};

/// The `region` directory of a world: resolves absolute chunk
/// positions to `r.<X>.<Z>.mca` files. An LRU cache is used to limit
/// the number of open file handles.
#[derive(Debug)]
pub struct RegionFolder {
    regions: LruCache<RegionPos, RegionEntry>,
    /// Path to the "region" subdirectory in the world root.
    region_root: PathBuf,
    /// Scratch buffer for decompression.
    decompress_buf: Vec<u8>,
}

impl RegionFolder {
    pub fn new(region_root: impl Into<PathBuf>) -> Self {
        Self {
            regions: LruCache::new(LRU_CACHE_SIZE),
            region_root: region_root.into(),
            decompress_buf: Vec::new(),
        }
    }

    fn get_region<'a>(
        regions: &'a mut LruCache<RegionPos, RegionEntry>,
        region_root: &Path,
        region_x: i32,
        region_z: i32,
    ) -> Result<Option<&'a mut Region<File>>, RegionError> {
        // Need to double get the entry from the cache to make the
        // borrow checker happy.
        if regions.get_mut(&(region_x, region_z)).is_some() {
            match regions.get_mut(&(region_x, region_z)) {
                Some(RegionEntry::Occupied(region)) => return Ok(Some(region)),
                Some(RegionEntry::Vacant) => return Ok(None),
                None => unreachable!(),
            }
        }

        let path = region_root.join(format!("r.{region_x}.{region_z}.mca"));

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                regions.put((region_x, region_z), RegionEntry::Vacant);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        debug!(region_x, region_z, "opening region file");

        regions.try_get_or_insert((region_x, region_z), || {
            Region::open(file).map(|region| RegionEntry::Occupied(Box::new(region)))
        })?;
        let Some(RegionEntry::Occupied(region)) = regions.get_mut(&(region_x, region_z)) else {
            unreachable!()
        };
        Ok(Some(region))
    }

    /// Gets the chunk at the given absolute chunk position.
    ///
    /// Returns `Ok(None)` if the chunk, or the whole region file
    /// holding it, does not exist.
    pub fn get_chunk(&mut self, pos_x: i32, pos_z: i32) -> Result<Option<RawChunk>, RegionError> {
        let Some(region) = Self::get_region(
            &mut self.regions,
            &self.region_root,
            pos_x.div_euclid(32),
            pos_z.div_euclid(32),
        )?
        else {
            return Ok(None);
        };

        region.get_chunk_buffered(
            pos_x.rem_euclid(32) as u8,
            pos_z.rem_euclid(32) as u8,
            &mut self.decompress_buf,
        )
    }

    /// Like [`Self::get_chunk`], decoding the chunk directly into a
    /// typed destination.
    pub fn get_chunk_as<T: DeserializeOwned>(
        &mut self,
        pos_x: i32,
        pos_z: i32,
    ) -> Result<Option<T>, RegionError> {
        let Some(region) = Self::get_region(
            &mut self.regions,
            &self.region_root,
            pos_x.div_euclid(32),
            pos_z.div_euclid(32),
        )?
        else {
            return Ok(None);
        };

        region.get_chunk_as(pos_x.rem_euclid(32) as u8, pos_z.rem_euclid(32) as u8)
    }
}

/// X and Z positions of a region.
type RegionPos = (i32, i32);

#[derive(Debug)]
enum RegionEntry {
    /// There is a region file loaded here.
    Occupied(Box<Region<File>>),
    /// There is no region file at this position. Don't try to read it
    /// from the filesystem again.
    Vacant,
}
