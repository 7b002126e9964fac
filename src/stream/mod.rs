//! Async drivers that move Bone values over byte streams.
//!
//! No framing is added: the bytes on the stream are exactly the encoded
//! values, and value boundaries come from the completion rules alone.

pub mod reader;
pub mod writer;

pub use reader::ValueReader;
pub use writer::ValueWriter;
