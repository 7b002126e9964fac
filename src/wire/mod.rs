//! The Bone wire format.
//!
//! Every value starts with a one-byte type code, optionally preceded by
//! `0xFF` level markers. There is no outer framing: a stream is simply a
//! sequence of encoded values.

pub mod code;
pub mod decode;
pub mod encode;

pub use decode::{decode, Decoder};
pub use encode::{encode, encode_value, encode_values, try_encode};
