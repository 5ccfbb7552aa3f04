use std::io::Read;

use serde::de;
use serde::de::DeserializeSeed;

use crate::binary::de::payload::PayloadDeserializer;
use crate::binary::Error;
use crate::Tag;

pub(super) struct SeqAccess<'r, R: ?Sized> {
    pub reader: &'r mut R,
    pub element_tag: Tag,
    pub remaining: u32,
    pub index: u32,
    pub remaining_depth: usize,
}

impl<'de: 'r, 'r, R: Read + ?Sized> de::SeqAccess<'de> for SeqAccess<'r, R> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        if self.remaining > 0 {
            self.remaining -= 1;

            let index = self.index;
            self.index += 1;

            seed.deserialize(PayloadDeserializer {
                reader: self.reader,
                tag: self.element_tag,
                remaining_depth: self.remaining_depth,
            })
            .map(Some)
            .map_err(|e| e.context(format!("list element {index}")))
        } else {
            Ok(None)
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining as usize)
    }
}
