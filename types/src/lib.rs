//! Pure helpers for kitbag.
//!
//! This crate contains small, independent utilities with no IO, no async, and
//! minimal dependencies. Everything here can be used from any layer.
//!
//! - **`text`**: truncation, character slicing, substring search, loose parsing
//! - **`collections`**: chunking, key-based deduplication, in-place moves
//! - **`lossy`** / **`flexible`**: forgiving serde decoding
//! - **`color`**, **`time`**, **`numeric`**, **`geo`**, **`locale`**

pub mod collections;
pub mod color;
pub mod flexible;
pub mod geo;
pub mod locale;
pub mod lossy;
pub mod numeric;
pub mod text;
pub mod time;

pub use collections::{SliceExt, VecExt};
pub use color::{HexColorError, Rgba};
pub use flexible::{Flexible, FlexibleError, FlexibleValue};
pub use geo::{BoundingBox, Coordinate};
pub use locale::emoji_flag;
pub use lossy::{LossyList, decode_values};
pub use numeric::{approx_eq, precised};
pub use text::{MatchOptions, StrExt, TruncationPosition};
pub use time::{DateTimeExt, parse_iso8601, parse_iso8601_with_fractional_seconds};
