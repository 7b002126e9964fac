//! Bone — a self-describing binary value-interchange format.
//!
//! Each value carries a leading type code that fixes its shape: a fixed-size
//! block, an escaped null-terminated string, a fixed-arity tuple, or a
//! terminated list. Repeated `0xFF` markers before a code attach an integer
//! level to the value.
//!
//! # Architecture
//!
//! - **`types`** — the `Value` tree
//! - **`wire`** — type codes, the streaming `Decoder` and the encoder
//! - **`stream`** — async readers and writers over `tokio::io`
//! - **`error`** — error types

pub mod error;
pub mod stream;
pub mod types;
pub mod wire;

pub use error::{BoneError, PartialDecode};
pub use types::Value;
pub use wire::code::Kind;
pub use wire::{decode, encode, try_encode, Decoder};
