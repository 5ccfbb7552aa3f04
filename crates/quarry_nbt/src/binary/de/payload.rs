use std::borrow::Cow;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use cesu8::from_java_cesu8;
use serde::de::Visitor;
use serde::{de, forward_to_deserialize_any};
use smallvec::SmallVec;

use crate::binary::de::array::{ArrayType, EnumAccess};
use crate::binary::de::compound::MapAccess;
use crate::binary::de::list::SeqAccess;
use crate::binary::{Error, ErrorKind};
use crate::Tag;

pub(super) struct PayloadDeserializer<'w, R: ?Sized> {
    pub reader: &'w mut R,
    /// The type of payload to be deserialized.
    pub tag: Tag,
    /// Nesting levels left before decoding refuses to recurse further.
    pub remaining_depth: usize,
}

impl<'w, R: Read + ?Sized> PayloadDeserializer<'w, R> {
    fn recurse(&mut self) -> Result<usize, Error> {
        match self.remaining_depth.checked_sub(1) {
            Some(left) => Ok(left),
            None => Err(ErrorKind::DepthLimit(crate::binary::DEFAULT_MAX_DEPTH).into()),
        }
    }
}

impl<'de: 'w, 'w, R: Read + ?Sized> de::Deserializer<'de> for PayloadDeserializer<'w, R> {
    type Error = Error;

    forward_to_deserialize_any! {
        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }

    fn deserialize_any<V>(mut self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.tag {
            Tag::End => unreachable!("invalid payload tag"),
            Tag::Byte => visitor.visit_i8(self.reader.read_i8()?),
            Tag::Short => visitor.visit_i16(self.reader.read_i16::<BigEndian>()?),
            Tag::Int => visitor.visit_i32(self.reader.read_i32::<BigEndian>()?),
            Tag::Long => visitor.visit_i64(self.reader.read_i64::<BigEndian>()?),
            Tag::Float => visitor.visit_f32(self.reader.read_f32::<BigEndian>()?),
            Tag::Double => visitor.visit_f64(self.reader.read_f64::<BigEndian>()?),
            Tag::ByteArray => visitor.visit_enum(EnumAccess {
                reader: self.reader,
                array_type: ArrayType::Byte,
            }),
            Tag::String => {
                let len = self.reader.read_i16::<BigEndian>()?;
                if len < 0 {
                    return Err(ErrorKind::MalformedLength(len as i32).into());
                }

                let mut buf = SmallVec::<[u8; 128]>::new();
                for _ in 0..len {
                    buf.push(self.reader.read_u8()?);
                }

                match from_java_cesu8(&buf).map_err(|_| Error::from(ErrorKind::InvalidString))? {
                    Cow::Borrowed(s) => visitor.visit_str(s),
                    Cow::Owned(string) => visitor.visit_string(string),
                }
            }
            Tag::List => {
                let id = self.reader.read_u8()?;
                let element_tag = Tag::from_u8(id).ok_or(ErrorKind::UnknownTagId(id))?;

                let len = self.reader.read_i32::<BigEndian>()?;
                if len < 0 {
                    return Err(ErrorKind::MalformedLength(len).into());
                }

                if element_tag == Tag::End && len != 0 {
                    return Err(ErrorKind::Custom(
                        "list with end element type must have length zero".into(),
                    )
                    .into());
                }

                let remaining_depth = self.recurse()?;

                visitor.visit_seq(SeqAccess {
                    reader: self.reader,
                    element_tag,
                    remaining: len as u32,
                    index: 0,
                    remaining_depth,
                })
            }
            Tag::Compound => {
                let remaining_depth = self.recurse()?;

                visitor.visit_map(MapAccess::new(self.reader, remaining_depth))
            }
            Tag::IntArray => visitor.visit_enum(EnumAccess {
                reader: self.reader,
                array_type: ArrayType::Int,
            }),
            Tag::LongArray => visitor.visit_enum(EnumAccess {
                reader: self.reader,
                array_type: ArrayType::Long,
            }),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.tag == Tag::Byte {
            // Any nonzero byte counts as true, the way the game treats
            // boolean fields.
            visitor.visit_bool(self.reader.read_i8()? != 0)
        } else {
            self.deserialize_any(visitor)
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // A double never narrows into an f32 destination; the cast
        // would drop precision without anyone noticing.
        if self.tag == Tag::Double {
            return Err(ErrorKind::TypeMismatch {
                found: self.tag.name().into(),
                expected: "float".into(),
            }
            .into());
        }

        self.deserialize_any(visitor)
    }

    fn deserialize_struct<V>(
        mut self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.tag == Tag::Compound {
            let remaining_depth = self.recurse()?;

            visitor.visit_map(MapAccess::new(self.reader, remaining_depth))
        } else {
            self.deserialize_any(visitor)
        }
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}
