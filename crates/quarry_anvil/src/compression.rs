use std::io;
use std::io::{Read, Seek, SeekFrom};

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::SniffError;

/// The framings an NBT stream can be stored in: the region format's
/// per-chunk compression schemes, which standalone files like
/// `level.dat` share.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum Compression {
    Gzip = 1,
    #[default]
    Zlib = 2,
    None = 3,
}

impl Compression {
    /// Decodes a region file's per-chunk compression scheme byte.
    pub fn from_u8(compression: u8) -> Option<Compression> {
        match compression {
            1 => Some(Compression::Gzip),
            2 => Some(Compression::Zlib),
            3 => Some(Compression::None),
            _ => None,
        }
    }

    /// Classifies the framing of an NBT stream by peeking at the byte
    /// under the current position. The position is restored afterwards,
    /// so decoding can start from the same place the sniff looked at.
    pub fn sniff<R: Read + Seek>(source: &mut R) -> Result<Compression, SniffError> {
        let pos = source.stream_position()?;

        let mut first = [0_u8; 1];
        source.read_exact(&mut first)?;
        source.seek(SeekFrom::Start(pos))?;

        match first[0] {
            0x1f => Ok(Compression::Gzip),
            0x78 => Ok(Compression::Zlib),
            // A compound tag id; the stream is bare NBT.
            0x0a => Ok(Compression::None),
            b => Err(SniffError::UnrecognizedFormat(b)),
        }
    }

    /// Wraps `reader` in the decoder matching this framing.
    pub fn wrap<R: Read>(self, reader: R) -> DecompressReader<R> {
        match self {
            Compression::Gzip => DecompressReader::Gzip(GzDecoder::new(reader)),
            Compression::Zlib => DecompressReader::Zlib(ZlibDecoder::new(reader)),
            Compression::None => DecompressReader::None(reader),
        }
    }

    /// Decompresses `raw` to the end of `out`.
    pub(crate) fn decompress_to(self, raw: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
        match self {
            Compression::Gzip => {
                GzDecoder::new(raw).read_to_end(out)?;
            }
            Compression::Zlib => {
                ZlibDecoder::new(raw).read_to_end(out)?;
            }
            Compression::None => out.extend_from_slice(raw),
        }

        Ok(())
    }
}

/// Reader over an NBT stream in any of the three framings. Constructed
/// with [`Compression::wrap`].
pub enum DecompressReader<R: Read> {
    None(R),
    Gzip(GzDecoder<R>),
    Zlib(ZlibDecoder<R>),
}

impl<R: Read> Read for DecompressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            DecompressReader::None(r) => r.read(buf),
            DecompressReader::Gzip(r) => r.read(buf),
            DecompressReader::Zlib(r) => r.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Write};

    use flate2::write::{GzEncoder, ZlibEncoder};

    use super::Compression;
    use crate::error::SniffError;

    #[test]
    fn sniff_classifies_by_leading_byte() {
        let mut gzip = Cursor::new(vec![0x1f, 0x8b, 0x08]);
        assert_eq!(Compression::sniff(&mut gzip).unwrap(), Compression::Gzip);

        let mut zlib = Cursor::new(vec![0x78, 0x9c]);
        assert_eq!(Compression::sniff(&mut zlib).unwrap(), Compression::Zlib);

        let mut plain = Cursor::new(vec![0x0a, 0x00, 0x00, 0x00]);
        assert_eq!(Compression::sniff(&mut plain).unwrap(), Compression::None);

        let mut garbage = Cursor::new(vec![0x42]);
        assert!(matches!(
            Compression::sniff(&mut garbage),
            Err(SniffError::UnrecognizedFormat(0x42))
        ));
    }

    #[test]
    fn sniff_is_idempotent() {
        let mut source = Cursor::new(vec![0x1f, 0x8b, 0x08, 0x00]);

        let first = Compression::sniff(&mut source).unwrap();
        let second = Compression::sniff(&mut source).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.position(), 0);
    }

    #[test]
    fn wrap_round_trips_gzip() {
        let payload = b"some bytes that are not actually NBT";

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut source = Cursor::new(compressed);
        let compression = Compression::sniff(&mut source).unwrap();
        assert_eq!(compression, Compression::Gzip);

        let mut decompressed = Vec::new();
        compression
            .wrap(source)
            .read_to_end(&mut decompressed)
            .unwrap();

        assert_eq!(decompressed, payload);
    }

    #[test]
    fn decompress_to_handles_all_schemes() {
        let payload = b"payload";

        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(payload).unwrap();
        let zlib = encoder.finish().unwrap();

        let mut out = Vec::new();
        Compression::Zlib.decompress_to(&zlib, &mut out).unwrap();
        assert_eq!(out, payload);

        out.clear();
        Compression::None.decompress_to(payload, &mut out).unwrap();
        assert_eq!(out, payload);
    }
}
