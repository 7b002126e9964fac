//! Bone encoding: `Value` → bytes.
//!
//! Encoding walks the tree depth-first with an explicit stack, emitting each
//! value's level markers, code and payload on entry and its terminator (if
//! any) on exit. It is the exact inverse of [`decode`](fn@super::decode).

use bytes::{BufMut, BytesMut};

use super::code::{self, Kind};
use crate::error::BoneError;
use crate::types::Value;

/// A value being written and the index of its next unwritten child.
struct Frame<'a> {
    value: &'a Value,
    next: usize,
}

/// Encodes one value tree into the buffer.
///
/// The tree must be well-formed (see [`Value::validate`]); malformed trees
/// produce bytes that do not decode back to the same tree.
pub fn encode_value(buf: &mut BytesMut, value: &Value) {
    debug_assert!(value.validate().is_ok(), "encoding malformed value {value}");

    let mut stack = vec![Frame { value, next: 0 }];
    encode_head(buf, value);
    while let Some(top) = stack.last_mut() {
        if let Some(child) = top.value.children.get(top.next) {
            top.next += 1;
            encode_head(buf, child);
            stack.push(Frame {
                value: child,
                next: 0,
            });
            continue;
        }
        let value = top.value;
        stack.pop();
        encode_tail(buf, value);
    }
}

/// Encodes a sequence of top-level values, left to right.
pub fn encode_values(buf: &mut BytesMut, values: &[Value]) {
    for value in values {
        encode_value(buf, value);
    }
}

/// Encodes a sequence of top-level values into a fresh byte vector.
pub fn encode(values: &[Value]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    encode_values(&mut buf, values);
    buf.to_vec()
}

/// Like [`encode`], but rejects malformed trees instead of writing them.
pub fn try_encode(values: &[Value]) -> Result<Vec<u8>, BoneError> {
    for value in values {
        value.validate()?;
    }
    Ok(encode(values))
}

/// Writes level markers, code and payload.
fn encode_head(buf: &mut BytesMut, value: &Value) {
    buf.put_bytes(code::LEVEL_MARKER, value.level);
    buf.put_u8(value.code);
    match value.kind() {
        Some(Kind::String) => encode_string_payload(buf, &value.payload),
        _ => buf.put_slice(&value.payload),
    }
}

/// Writes the terminator closing strings and lists.
fn encode_tail(buf: &mut BytesMut, value: &Value) {
    if matches!(value.kind(), Some(Kind::String | Kind::List)) {
        buf.put_u8(code::TERMINATOR);
    }
}

/// Writes string bytes, escaping each `0x00` as `0x00 0x01`.
fn encode_string_payload(buf: &mut BytesMut, payload: &[u8]) {
    for chunk in payload.split_inclusive(|&b| b == 0x00) {
        buf.put_slice(chunk);
        if chunk.last() == Some(&0x00) {
            buf.put_u8(code::ESCAPE);
        }
    }
}
