use std::fs;
use std::io::Write;

use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use quarry_anvil::{RegionFolder, SECTOR_SIZE};
use quarry_nbt::Value;
use serde::Deserialize;

fn tag_named(out: &mut Vec<u8>, tag: u8, name: &str) {
    out.push(tag);
    put_str(out, name);
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend((s.len() as u16).to_be_bytes());
    out.extend(s.as_bytes());
}

fn chunk_nbt(x: i32, z: i32) -> Vec<u8> {
    let mut out = vec![0x0a, 0x00, 0x00];
    tag_named(&mut out, 0x08, "Status");
    put_str(&mut out, "full");
    tag_named(&mut out, 0x03, "xPos");
    out.extend(x.to_be_bytes());
    tag_named(&mut out, 0x03, "zPos");
    out.extend(z.to_be_bytes());
    out.push(0x00);
    out
}

/// A region file with a single gzip-compressed chunk in the given
/// slot.
fn region_with_chunk(slot: usize, payload: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(payload).unwrap();
    let compressed = encoder.finish().unwrap();

    let sectors = (compressed.len() + 5).div_ceil(SECTOR_SIZE);

    let mut file = vec![0_u8; SECTOR_SIZE * 2];
    file[slot * 4..][..4].copy_from_slice(&((2_u32 << 8) | sectors as u32).to_be_bytes());
    file[SECTOR_SIZE + slot * 4..][..4].copy_from_slice(&1_700_000_000_u32.to_be_bytes());

    file.resize((2 + sectors) * SECTOR_SIZE, 0);
    let start = 2 * SECTOR_SIZE;
    file[start..][..4].copy_from_slice(&((compressed.len() + 1) as u32).to_be_bytes());
    file[start + 4] = 1;
    file[start + 5..][..compressed.len()].copy_from_slice(&compressed);

    file
}

#[test]
fn folder_resolves_absolute_chunk_positions() {
    let dir = tempfile::tempdir().unwrap();
    let region_root = dir.path().join("region");
    fs::create_dir(&region_root).unwrap();

    // Chunk (1, 2) of region (0, 0) and chunk (-1, -1) of region
    // (-1, -1), which lives in that region's last slot.
    fs::write(
        region_root.join("r.0.0.mca"),
        region_with_chunk(1 + 2 * 32, &chunk_nbt(1, 2)),
    )
    .unwrap();
    fs::write(
        region_root.join("r.-1.-1.mca"),
        region_with_chunk(31 + 31 * 32, &chunk_nbt(-1, -1)),
    )
    .unwrap();

    let mut folder = RegionFolder::new(&region_root);

    let chunk = folder.get_chunk(1, 2).unwrap().unwrap();
    assert_eq!(chunk.data["xPos"], Value::Int(1));
    assert_eq!(chunk.data["zPos"], Value::Int(2));
    assert_eq!(chunk.timestamp, 1_700_000_000);

    let chunk = folder.get_chunk(-1, -1).unwrap().unwrap();
    assert_eq!(chunk.data["xPos"], Value::Int(-1));

    // A slot that exists in no region file.
    assert!(folder.get_chunk(5, 5).unwrap().is_none());

    // A region file that does not exist, asked for twice to also hit
    // the negative cache.
    assert!(folder.get_chunk(100, 100).unwrap().is_none());
    assert!(folder.get_chunk(100, 100).unwrap().is_none());
}

#[test]
fn folder_decodes_typed_chunks() {
    #[derive(PartialEq, Debug, Deserialize)]
    struct ChunkStub {
        #[serde(rename = "Status")]
        status: String,
        #[serde(rename = "zPos")]
        z_pos: i32,
    }

    let dir = tempfile::tempdir().unwrap();
    let region_root = dir.path().join("region");
    fs::create_dir(&region_root).unwrap();

    fs::write(
        region_root.join("r.0.0.mca"),
        region_with_chunk(0, &chunk_nbt(0, 0)),
    )
    .unwrap();

    let mut folder = RegionFolder::new(&region_root);

    let stub: ChunkStub = folder.get_chunk_as(0, 0).unwrap().unwrap();
    assert_eq!(
        stub,
        ChunkStub {
            status: "full".to_owned(),
            z_pos: 0,
        }
    );

    assert!(folder.get_chunk_as::<ChunkStub>(3, 3).unwrap().is_none());
}
