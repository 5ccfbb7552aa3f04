use std::fmt::Formatter;
use std::marker::PhantomData;

use serde::de::value::SeqAccessDeserializer;
use serde::de::{EnumAccess, IgnoredAny, SeqAccess, VariantAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// The name of the synthetic enum used to distinguish the array tags
/// from lists in the serde data model.
pub(crate) const ARRAY_ENUM_NAME: &str = "__array__";

pub(crate) const BYTE_ARRAY_VARIANT_NAME: &str = "__byte_array__";
pub(crate) const INT_ARRAY_VARIANT_NAME: &str = "__int_array__";
pub(crate) const LONG_ARRAY_VARIANT_NAME: &str = "__long_array__";

macro_rules! def_mod {
    ($mod_name:ident, $display_name:literal) => {
        /// Provides deserialization support for the NBT type
        #[doc = concat!(" \"", $display_name, "\".")]
        ///
        /// This module is intended to be the target of serde's
        /// `#[serde(with = "module")]` field attribute. Without it, the
        #[doc = concat!(" ", $display_name, " wire tag")]
        /// would not match a plain sequence destination.
        ///
        /// The target field must deserialize as a seq.
        ///
        /// # Examples
        ///
        /// ```
        /// use serde::Deserialize;
        ///
        /// #[derive(Deserialize)]
        /// struct MyStruct {
        ///     #[serde(with = "quarry_nbt::int_array")]
        ///     array: Vec<i32>,
        /// }
        /// ```
        pub mod $mod_name {
            use super::*;

            pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
            where
                T: Deserialize<'de>,
                D: Deserializer<'de>,
            {
                struct ArrayVisitor<T>(PhantomData<T>);

                impl<'de, T: Deserialize<'de>> Visitor<'de> for ArrayVisitor<T> {
                    type Value = T;

                    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                        write!(
                            formatter,
                            concat!("an NBT ", $display_name, " encoded as an enum or seq")
                        )
                    }

                    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
                    where
                        A: SeqAccess<'de>,
                    {
                        T::deserialize(SeqAccessDeserializer::new(seq))
                    }

                    fn visit_enum<A>(self, data: A) -> Result<Self::Value, A::Error>
                    where
                        A: EnumAccess<'de>,
                    {
                        // Ignore the variant name.
                        let (_, variant) = data.variant::<IgnoredAny>()?;

                        variant.newtype_variant()
                    }
                }

                let variants = &[
                    BYTE_ARRAY_VARIANT_NAME,
                    INT_ARRAY_VARIANT_NAME,
                    LONG_ARRAY_VARIANT_NAME,
                ];

                deserializer.deserialize_enum(ARRAY_ENUM_NAME, variants, ArrayVisitor(PhantomData))
            }
        }
    };
}

def_mod!(byte_array, "byte array");
def_mod!(int_array, "int array");
def_mod!(long_array, "long array");
