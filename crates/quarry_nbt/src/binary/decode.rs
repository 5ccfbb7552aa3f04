use std::io::Read;
use std::mem;

use byteorder::{BigEndian, ReadBytesExt};
use cesu8::from_java_cesu8;
use smallvec::SmallVec;

use super::{Error, ErrorKind, DEFAULT_MAX_DEPTH};
use crate::conv::u8_vec_into_i8_vec;
use crate::{Compound, List, Tag, Value};

/// Caps applied to untrusted input while decoding.
///
/// Both length prefixes and nesting are attacker-controlled in NBT, so
/// decoding without limits can be made to allocate or recurse
/// arbitrarily. The defaults allow any well-formed vanilla world file.
#[derive(Clone, Copy, Debug)]
pub struct DecodeLimits {
    /// Maximum nesting depth of lists and compounds.
    pub max_depth: usize,
    /// Total bytes of length-prefixed payloads (strings, arrays and
    /// list backing storage) the decoder may allocate.
    pub max_alloc: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_alloc: usize::MAX,
        }
    }
}

/// Decodes uncompressed NBT binary data from the provided reader.
///
/// Only compounds are permitted at the top level, which is what every
/// file written by the game has. Returns the decoded compound together
/// with the name of the root tag.
///
/// The reader is left positioned directly after the root tag; trailing
/// bytes are not inspected.
pub fn from_binary<R: Read>(reader: &mut R) -> Result<(Compound, String), Error> {
    from_binary_with_limits(reader, DecodeLimits::default())
}

/// Like [`from_binary`], with an explicit decoding policy for untrusted
/// input.
pub fn from_binary_with_limits<R: Read>(
    reader: &mut R,
    limits: DecodeLimits,
) -> Result<(Compound, String), Error> {
    let mut state = DecodeState {
        reader,
        depth: 0,
        budget: limits.max_alloc,
        max_depth: limits.max_depth,
    };

    let root_tag = state.read_tag()?;

    if root_tag != Tag::Compound {
        return Err(ErrorKind::TypeMismatch {
            found: root_tag.name().into(),
            expected: "compound".into(),
        }
        .into());
    }

    let root_name = state.read_string()?;
    let root = state.check_depth(|st| st.read_compound())?;

    Ok((root, root_name))
}

struct DecodeState<'a, R: ?Sized> {
    reader: &'a mut R,
    depth: usize,
    /// Bytes left before the allocation budget is exhausted.
    budget: usize,
    max_depth: usize,
}

impl<R: Read + ?Sized> DecodeState<'_, R> {
    fn check_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.depth >= self.max_depth {
            return Err(ErrorKind::DepthLimit(self.max_depth).into());
        }

        self.depth += 1;
        let res = f(self);
        self.depth -= 1;

        res
    }

    fn charge_alloc(&mut self, bytes: usize) -> Result<(), Error> {
        if bytes > self.budget {
            return Err(ErrorKind::ResourceLimit {
                requested: bytes,
                remaining: self.budget,
            }
            .into());
        }

        self.budget -= bytes;
        Ok(())
    }

    fn read_tag(&mut self) -> Result<Tag, Error> {
        let id = self.reader.read_u8()?;
        Tag::from_u8(id).ok_or_else(|| ErrorKind::UnknownTagId(id).into())
    }

    fn read_len(&mut self) -> Result<usize, Error> {
        let len = self.reader.read_i32::<BigEndian>()?;

        if len < 0 {
            return Err(ErrorKind::MalformedLength(len).into());
        }

        Ok(len as usize)
    }

    fn read_value(&mut self, tag: Tag) -> Result<Value, Error> {
        Ok(match tag {
            Tag::End => unreachable!("invalid payload tag"),
            Tag::Byte => Value::Byte(self.reader.read_i8()?),
            Tag::Short => Value::Short(self.reader.read_i16::<BigEndian>()?),
            Tag::Int => Value::Int(self.reader.read_i32::<BigEndian>()?),
            Tag::Long => Value::Long(self.reader.read_i64::<BigEndian>()?),
            Tag::Float => Value::Float(self.reader.read_f32::<BigEndian>()?),
            Tag::Double => Value::Double(self.reader.read_f64::<BigEndian>()?),
            Tag::ByteArray => Value::ByteArray(self.read_byte_array()?),
            Tag::String => Value::String(self.read_string()?),
            Tag::List => Value::List(self.check_depth(|st| st.read_any_list())?),
            Tag::Compound => Value::Compound(self.check_depth(|st| st.read_compound())?),
            Tag::IntArray => Value::IntArray(self.read_int_array()?),
            Tag::LongArray => Value::LongArray(self.read_long_array()?),
        })
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let len = self.reader.read_i16::<BigEndian>()?;

        if len < 0 {
            return Err(ErrorKind::MalformedLength(len as i32).into());
        }

        if len == 0 {
            return Ok(String::new());
        }

        self.charge_alloc(len as usize)?;

        let mut buf = SmallVec::<[u8; 128]>::new();
        for _ in 0..len {
            buf.push(self.reader.read_u8()?);
        }

        match from_java_cesu8(&buf) {
            Ok(str) => Ok(str.into_owned()),
            Err(_) => Err(ErrorKind::InvalidString.into()),
        }
    }

    fn read_byte_array(&mut self) -> Result<Vec<i8>, Error> {
        let len = self.read_len()?;
        self.charge_alloc(len)?;

        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;

        Ok(u8_vec_into_i8_vec(buf))
    }

    fn read_int_array(&mut self) -> Result<Vec<i32>, Error> {
        let len = self.read_len()?;
        self.charge_alloc(len.saturating_mul(4))?;

        let mut buf = Vec::with_capacity(len);
        for _ in 0..len {
            buf.push(self.reader.read_i32::<BigEndian>()?);
        }

        Ok(buf)
    }

    fn read_long_array(&mut self) -> Result<Vec<i64>, Error> {
        let len = self.read_len()?;
        self.charge_alloc(len.saturating_mul(8))?;

        let mut buf = Vec::with_capacity(len);
        for _ in 0..len {
            buf.push(self.reader.read_i64::<BigEndian>()?);
        }

        Ok(buf)
    }

    fn read_any_list(&mut self) -> Result<List, Error> {
        let element_tag = self.read_tag()?;
        let len = self.read_len()?;

        Ok(match element_tag {
            Tag::End => {
                if len != 0 {
                    return Err(ErrorKind::Custom(
                        "list with end element type must have length zero".into(),
                    )
                    .into());
                }

                List::End
            }
            Tag::Byte => List::Byte(self.read_list(len, |st| Ok(st.reader.read_i8()?))?),
            Tag::Short => {
                List::Short(self.read_list(len, |st| Ok(st.reader.read_i16::<BigEndian>()?))?)
            }
            Tag::Int => List::Int(self.read_list(len, |st| Ok(st.reader.read_i32::<BigEndian>()?))?),
            Tag::Long => {
                List::Long(self.read_list(len, |st| Ok(st.reader.read_i64::<BigEndian>()?))?)
            }
            Tag::Float => {
                List::Float(self.read_list(len, |st| Ok(st.reader.read_f32::<BigEndian>()?))?)
            }
            Tag::Double => {
                List::Double(self.read_list(len, |st| Ok(st.reader.read_f64::<BigEndian>()?))?)
            }
            Tag::ByteArray => List::ByteArray(self.read_list(len, |st| st.read_byte_array())?),
            Tag::String => List::String(self.read_list(len, |st| st.read_string())?),
            Tag::List => List::List(
                self.read_list(len, |st| st.check_depth(|st| st.read_any_list()))?,
            ),
            Tag::Compound => List::Compound(
                self.read_list(len, |st| st.check_depth(|st| st.read_compound()))?,
            ),
            Tag::IntArray => List::IntArray(self.read_list(len, |st| st.read_int_array())?),
            Tag::LongArray => List::LongArray(self.read_list(len, |st| st.read_long_array())?),
        })
    }

    fn read_list<T>(
        &mut self,
        len: usize,
        mut read_elem: impl FnMut(&mut Self) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        self.charge_alloc(len.saturating_mul(mem::size_of::<T>()))?;

        let mut list = Vec::with_capacity(len);
        for i in 0..len {
            list.push(read_elem(self).map_err(|e| e.context(format!("list element {i}")))?);
        }

        Ok(list)
    }

    fn read_compound(&mut self) -> Result<Compound, Error> {
        let mut compound = Compound::new();

        loop {
            let tag = self.read_tag()?;

            if tag == Tag::End {
                return Ok(compound);
            }

            let name = self.read_string()?;
            let value = self
                .read_value(tag)
                .map_err(|e| e.context(format!("field `{name}`")))?;

            compound.insert(name, value);
        }
    }
}
