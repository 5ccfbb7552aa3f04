//! A decoder for Minecraft: Java Edition's [Named Binary Tag] (NBT)
//! binary format.
//!
//! [Named Binary Tag]: https://minecraft.wiki/w/NBT_format
//!
//! NBT data can be decoded two ways:
//!
//! - Dynamically, into the [`Value`] tree with [`binary::from_binary`].
//!   Compounds preserve the order their children appeared on the wire
//!   and numeric values keep their wire width.
//! - Statically, into any type implementing serde's `Deserialize` with
//!   [`binary::from_reader`] or [`binary::Deserializer`]. Compound
//!   children are matched to struct fields by wire name (use
//!   `#[serde(rename = "...")]` where the wire name is not a valid
//!   field name) and children without a matching field are skipped
//!   without being materialized.
//!
//! Decoding reads directly from the underlying stream, so compressed
//! files must be wrapped in a decompressing reader first.

pub use compound::Compound;
pub use list::List;
pub use tag::Tag;
pub use value::Value;

pub use crate::array::{byte_array, int_array, long_array};

mod array;
pub mod binary;
pub mod compound;
mod conv;
pub mod list;
mod tag;
pub mod value;


/// A convenience macro for constructing [`Compound`]s.
///
/// Key expressions must implement `Into<String>` while value expressions
/// must implement `Into<Value>`.
///
/// # Examples
///
/// ```
/// use quarry_nbt::{compound, List};
///
/// let c = compound! {
///     "byte" => 123_i8,
///     "list_of_int" => List::Int(vec![3, -7, 5]),
///     "string" => "aé日",
///     "compound" => compound! {
///         "foo" => 1,
///         "bar" => 2,
///     },
///     "int_array" => vec![5, -9, i32::MIN, 0, i32::MAX],
/// };
///
/// println!("{c:?}");
/// ```
#[macro_export]
macro_rules! compound {
    ($($key:expr => $value:expr),* $(,)?) => {
        <$crate::Compound as ::std::iter::FromIterator<(
            ::std::string::String,
            $crate::Value,
        )>>::from_iter([
            $(
                (
                    ::std::convert::Into::<::std::string::String>::into($key),
                    ::std::convert::Into::<$crate::Value>::into($value),
                ),
            )*
        ])
    };
}
