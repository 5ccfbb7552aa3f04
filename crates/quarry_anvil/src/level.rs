use std::io::{Read, Seek};

use serde::Deserialize;
use tracing::debug;

use crate::compression::Compression;
use crate::error::LevelError;

/// Typed view of a world's `level.dat`.
///
/// The file is a single NBT stream, gzip-compressed by the game, whose
/// root compound is named `""` and holds everything under a `Data`
/// child. Fields not modeled here are skipped by the decoder.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Level {
    #[serde(rename = "Data")]
    pub data: LevelData,
}

/// The `Data` compound of `level.dat`.
///
/// Worlds from older versions miss some of these children, so every
/// field falls back to its default when absent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelData {
    #[serde(rename = "allowCommands")]
    pub allow_commands: bool,
    #[serde(rename = "BorderCenterX")]
    pub border_center_x: f64,
    #[serde(rename = "BorderCenterZ")]
    pub border_center_z: f64,
    #[serde(rename = "BorderDamagePerBlock")]
    pub border_damage_per_block: f64,
    #[serde(rename = "BorderSize")]
    pub border_size: f64,
    #[serde(rename = "BorderSafeZone")]
    pub border_safe_zone: f64,
    #[serde(rename = "BorderSizeLerpTarget")]
    pub border_size_lerp_target: f64,
    #[serde(rename = "BorderSizeLerpTime")]
    pub border_size_lerp_time: i64,
    #[serde(rename = "BorderWarningBlocks")]
    pub border_warning_blocks: f64,
    #[serde(rename = "BorderWarningTime")]
    pub border_warning_time: f64,
    #[serde(rename = "ClearWeatherTime")]
    pub clear_weather_time: i32,
    #[serde(rename = "DataVersion")]
    pub data_version: i32,
    #[serde(rename = "LevelName")]
    pub level_name: String,
    #[serde(rename = "SpawnX")]
    pub spawn_x: i32,
    #[serde(rename = "SpawnY")]
    pub spawn_y: i32,
    #[serde(rename = "SpawnZ")]
    pub spawn_z: i32,
    #[serde(rename = "Time")]
    pub time: i64,
    #[serde(rename = "Version")]
    pub version: LevelVersion,
    #[serde(rename = "WasModded")]
    pub was_modded: bool,
}

/// The `Version` compound naming the game version a world was last
/// saved with.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelVersion {
    #[serde(rename = "Id")]
    pub id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Snapshot")]
    pub snapshot: bool,
}

impl Level {
    /// Reads `level.dat` from `source`, sniffing the framing first:
    /// stock worlds write it gzip-compressed, but a bare or
    /// zlib-compressed stream decodes all the same.
    pub fn read_from<R: Read + Seek>(mut source: R) -> Result<Level, LevelError> {
        let compression = Compression::sniff(&mut source)?;

        debug!(?compression, "reading level.dat");

        Ok(quarry_nbt::binary::from_reader(compression.wrap(source))?)
    }
}
