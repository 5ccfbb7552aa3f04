use serde::Deserialize;

use crate::error::PaletteError;

/// How palette indices are packed into the container's longs.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Packing {
    /// Indices never cross a long boundary; the low-order remainder of
    /// each long is padding. Used from data version 2556 (1.16) on.
    Aligned,
    /// Indices packed contiguously across long boundaries, as older
    /// worlds stored them. Not supported.
    Unaligned,
}

/// A paletted container from section NBT: a `palette` of distinct
/// entries plus bit-packed indices into it in `data`.
///
/// Sections whose palette has a single entry omit `data` entirely;
/// every index then resolves to 0.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct PalettedContainer<T> {
    #[serde(default)]
    pub palette: Vec<T>,
    #[serde(default, with = "quarry_nbt::long_array")]
    pub data: Vec<i64>,
}

impl<T> PalettedContainer<T> {
    /// Returns the palette index stored at position `i`.
    pub fn index(&self, i: usize, packing: Packing) -> Result<u64, PaletteError> {
        palette_index(self.palette.len(), &self.data, i, packing)
    }

    /// Resolves the palette entry stored at position `i`.
    pub fn get(&self, i: usize, packing: Packing) -> Result<&T, PaletteError> {
        let index = self.index(i, packing)? as usize;

        self.palette.get(index).ok_or(PaletteError::OutOfBounds {
            index,
            capacity: self.palette.len(),
        })
    }
}

/// Extracts the `i`-th palette index out of `data`.
///
/// Indices are `bit_width(palette_len - 1)` bits wide, at least one
/// bit. An empty `data` (or a palette of at most one entry) yields 0
/// for every position, matching sections that store a single value.
pub fn palette_index(
    palette_len: usize,
    data: &[i64],
    i: usize,
    packing: Packing,
) -> Result<u64, PaletteError> {
    if data.is_empty() || palette_len <= 1 {
        return Ok(0);
    }

    if packing == Packing::Unaligned {
        return Err(PaletteError::UnsupportedPacking);
    }

    let bits = bit_width(palette_len - 1).max(1);
    debug_assert!(bits <= 64);

    let idxs_per_long = 64 / bits;

    let long = *data
        .get(i / idxs_per_long)
        .ok_or(PaletteError::OutOfBounds {
            index: i,
            capacity: data.len() * idxs_per_long,
        })?;

    // The first index of each long sits in its most significant bits.
    let slot = i % idxs_per_long;
    let shift = 64 - (slot + 1) * bits;
    let mask = u64::MAX >> (64 - bits);

    Ok(((long as u64) >> shift) & mask)
}

/// Returns the minimum number of bits needed to represent the integer
/// `n`.
const fn bit_width(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as _
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn aligned_single_long() {
        // 16 palette entries make 4-bit indices, 16 to a long.
        let data = [0x0123_4567_89ab_cdef_i64];

        for i in 0..16 {
            assert_eq!(
                palette_index(16, &data, i, Packing::Aligned).unwrap(),
                i as u64
            );
        }
    }

    #[test]
    fn aligned_non_divisible_width() {
        // 33 palette entries make 6-bit indices, 10 to a long with 4
        // bits of padding.
        let data = [0x0410_4104_1041_0410_i64];

        for i in 0..10 {
            assert_eq!(palette_index(33, &data, i, Packing::Aligned).unwrap(), 1);
        }

        // Position 10 lives in a second long this data does not have.
        assert_eq!(
            palette_index(33, &data, 10, Packing::Aligned),
            Err(PaletteError::OutOfBounds {
                index: 10,
                capacity: 10,
            })
        );
    }

    #[test]
    fn empty_data_yields_zero() {
        for i in [0, 1, 100, 4095] {
            assert_eq!(palette_index(5, &[], i, Packing::Aligned).unwrap(), 0);
        }
    }

    #[test]
    fn single_entry_palette_yields_zero() {
        let data = [0x1234_i64];

        assert_eq!(palette_index(1, &data, 7, Packing::Aligned).unwrap(), 0);
        assert_eq!(palette_index(0, &data, 7, Packing::Aligned).unwrap(), 0);
    }

    #[test]
    fn unaligned_packing_is_refused() {
        let data = [0x1234_i64];

        assert_eq!(
            palette_index(16, &data, 0, Packing::Unaligned),
            Err(PaletteError::UnsupportedPacking)
        );
    }

    #[test]
    fn container_decodes_from_section_nbt() {
        fn put_str(out: &mut Vec<u8>, s: &str) {
            out.extend((s.len() as u16).to_be_bytes());
            out.extend(s.as_bytes());
        }

        // { palette: ["a", "b", "c"], data: [long] } under a root
        // compound. Three entries make 2-bit indices.
        let mut bytes = vec![0x0a, 0x00, 0x00];
        bytes.push(0x09);
        put_str(&mut bytes, "palette");
        bytes.push(0x08);
        bytes.extend(3_i32.to_be_bytes());
        for s in ["a", "b", "c"] {
            put_str(&mut bytes, s);
        }
        bytes.push(0x0c);
        put_str(&mut bytes, "data");
        bytes.extend(1_i32.to_be_bytes());
        // Slots from the most significant bits down: 2, 1, 0, 1, ...
        bytes.extend((0x9000_0000_0000_0000_u64 as i64).to_be_bytes());
        bytes.push(0x00);

        let container: PalettedContainer<String> =
            quarry_nbt::binary::from_reader(&mut bytes.as_slice()).unwrap();

        assert_eq!(container.palette, ["a", "b", "c"]);
        assert_eq!(container.index(0, Packing::Aligned).unwrap(), 2);
        assert_eq!(container.get(0, Packing::Aligned).unwrap().as_str(), "c");
        assert_eq!(container.get(1, Packing::Aligned).unwrap().as_str(), "b");
        assert_eq!(container.get(2, Packing::Aligned).unwrap().as_str(), "a");
    }

    #[test]
    fn container_without_data_resolves_to_first_entry() {
        let container = PalettedContainer {
            palette: vec!["air".to_owned()],
            data: Vec::new(),
        };

        assert_eq!(container.index(100, Packing::Aligned).unwrap(), 0);
        assert_eq!(container.get(100, Packing::Aligned).unwrap().as_str(), "air");
    }

    #[test]
    fn out_of_palette_index_is_caught_by_get() {
        let container = PalettedContainer {
            palette: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            data: vec![-1],
        };

        // Three entries make 2-bit indices, so all-ones data points at
        // entry 3, which the palette does not have.
        assert_eq!(
            container.get(0, Packing::Aligned),
            Err(PaletteError::OutOfBounds {
                index: 3,
                capacity: 3,
            })
        );
    }
}
