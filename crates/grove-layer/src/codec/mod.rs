//! Row codec: rows to tuples and back, plus the type allow-list.

mod convert;
mod tuple_codec;

pub use convert::{element_to_value, value_to_element};
pub use tuple_codec::{TupleRowCodec, TupleUsage};
