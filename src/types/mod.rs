//! Bone value model.

mod value;

pub use value::Value;
