use std::borrow::Cow;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use cesu8::from_java_cesu8;
use serde::de;
use serde::de::{DeserializeSeed, IntoDeserializer};
use smallvec::SmallVec;

use crate::binary::de::payload::PayloadDeserializer;
use crate::binary::{Error, ErrorKind};
use crate::Tag;

pub(super) struct MapAccess<'r, R: ?Sized> {
    reader: &'r mut R,
    value_tag: Tag,
    /// The name of the child about to be decoded, kept so errors in the
    /// value can say which field they happened in.
    current_name: String,
    remaining_depth: usize,
}

impl<'r, R: Read + ?Sized> MapAccess<'r, R> {
    pub fn new(reader: &'r mut R, remaining_depth: usize) -> Self {
        Self {
            reader,
            value_tag: Tag::End,
            current_name: String::new(),
            remaining_depth,
        }
    }

    fn read_name(&mut self) -> Result<(), Error> {
        let len = self.reader.read_i16::<BigEndian>()?;
        if len < 0 {
            return Err(ErrorKind::MalformedLength(len as i32).into());
        }

        let mut buf = SmallVec::<[u8; 128]>::new();
        for _ in 0..len {
            buf.push(self.reader.read_u8()?);
        }

        match from_java_cesu8(&buf).map_err(|_| Error::from(ErrorKind::InvalidString))? {
            Cow::Borrowed(s) => s.clone_into(&mut self.current_name),
            Cow::Owned(s) => self.current_name = s,
        }

        Ok(())
    }
}

impl<'de: 'r, 'r, R: Read + ?Sized> de::MapAccess<'de> for MapAccess<'r, R> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let id = self.reader.read_u8()?;
        self.value_tag = Tag::from_u8(id).ok_or(ErrorKind::UnknownTagId(id))?;

        if self.value_tag == Tag::End {
            return Ok(None);
        }

        self.read_name()?;

        seed.deserialize(self.current_name.clone().into_deserializer())
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        if self.value_tag == Tag::End {
            return Err(ErrorKind::Custom("end of compound?".into()).into());
        }

        seed.deserialize(PayloadDeserializer {
            reader: self.reader,
            tag: self.value_tag,
            remaining_depth: self.remaining_depth,
        })
        .map_err(|e| e.context(format!("field `{}`", self.current_name)))
    }
}
