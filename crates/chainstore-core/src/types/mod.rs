mod bytes;
mod float;
mod int;

pub use bytes::{Hex, HexParseError};
pub use float::Float64;
pub use int::Int;
