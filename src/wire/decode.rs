//! Bone decoding: bytes → `Value`.
//!
//! The decoder is a push-driven stack machine. Each byte either extends the
//! innermost open value, closes it, bumps the pending level, or opens a new
//! value. Completed values collapse into their parent immediately, so the
//! stack only ever holds the chain of open ancestors.

use bytes::Buf;

use super::code::{self, Kind};
use crate::error::{BoneError, PartialDecode};
use crate::types::Value;

/// Whether the last byte of an open string was an unresolved `0x00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Nul {
    #[default]
    Clear,
    Pending,
}

/// A value under construction.
#[derive(Debug)]
struct Frame {
    value: Value,
    kind: Kind,
    nul: Nul,
}

impl Frame {
    fn is_complete(&self) -> bool {
        self.kind
            .is_complete(self.value.payload.len(), self.value.children.len())
    }

    /// Applies one string byte. A `0x00` is held back until the next byte
    /// tells whether it was a terminator or an escaped literal.
    fn push_string_byte(&mut self, byte: u8) {
        match (byte, self.nul) {
            (code::TERMINATOR, _) => self.nul = Nul::Pending,
            (code::ESCAPE, Nul::Pending) => {
                self.nul = Nul::Clear;
                self.value.payload.push(0x00);
            }
            _ => self.value.payload.push(byte),
        }
    }
}

/// Incremental Bone decoder.
///
/// Feed bytes with [`accept`](Self::accept) or [`feed`](Self::feed), then call
/// [`finish`](Self::finish) once the input is exhausted. Completed top-level
/// values accumulate in [`values`](Self::values). Errors are not recoverable:
/// decoding must restart on a fresh decoder.
#[derive(Debug, Default)]
pub struct Decoder {
    values: Vec<Value>,
    stack: Vec<Frame>,
    level: usize,
    offset: usize,
    max_depth: Option<usize>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how many values may be open at once.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Top-level values completed so far.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Removes and returns the completed top-level values.
    pub fn take_values(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.values)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Number of values currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Level markers seen since the last value started.
    pub fn pending_level(&self) -> usize {
        self.level
    }

    /// Number of bytes accepted so far, including a rejected one.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Processes one input byte.
    pub fn accept(&mut self, byte: u8) -> Result<(), BoneError> {
        self.offset += 1;
        self.terminate_string(byte);

        if let Some(top) = self.stack.last_mut() {
            let kind = top.kind;
            match kind {
                Kind::String => {
                    top.push_string_byte(byte);
                    return Ok(());
                }
                Kind::Block(_) => {
                    top.value.payload.push(byte);
                    self.collapse();
                    return Ok(());
                }
                Kind::List if byte == code::TERMINATOR => {
                    if self.level != 0 {
                        return Err(BoneError::ListTerminatedWithLevel(self.level));
                    }
                    self.close_top();
                    self.collapse();
                    return Ok(());
                }
                Kind::List | Kind::Tuple(_) | Kind::Reserved => {}
            }
        }

        if byte == code::LEVEL_MARKER {
            self.level += 1;
            return Ok(());
        }
        self.start_value(byte)
    }

    /// Feeds every remaining byte of `buf`, stopping at the first error.
    pub fn feed(&mut self, mut buf: impl Buf) -> Result<(), BoneError> {
        while buf.has_remaining() {
            self.accept(buf.get_u8())?;
        }
        Ok(())
    }

    /// Signals end of input. Seals a string whose terminator was the final
    /// byte, then fails if any value is still open or level markers are left
    /// over.
    pub fn finish(&mut self) -> Result<(), BoneError> {
        self.terminate_string(code::END_OF_INPUT);
        if !self.stack.is_empty() {
            return Err(BoneError::PartialValue(self.stack.len()));
        }
        if self.level != 0 {
            return Err(BoneError::PendingLevel(self.level));
        }
        Ok(())
    }

    /// Closes the open string if its last `0x00` turned out to be a
    /// terminator, i.e. the byte after it is anything but the escape.
    fn terminate_string(&mut self, lookahead: u8) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if lookahead == code::ESCAPE || top.nul != Nul::Pending {
            return;
        }
        top.nul = Nul::Clear;
        self.close_top();
        self.collapse();
    }

    fn start_value(&mut self, byte: u8) -> Result<(), BoneError> {
        let kind = Kind::of(byte).ok_or(BoneError::IllegalTypeCode(byte))?;
        if self.level > 0 && !code::accepts_level(byte) {
            return Err(BoneError::IllegalLevelExtension(byte));
        }
        if let Some(max) = self.max_depth {
            if self.stack.len() >= max {
                return Err(BoneError::DepthLimitExceeded(max));
            }
        }
        self.stack.push(Frame {
            value: Value::new(byte).with_level(self.level),
            kind,
            nul: Nul::Clear,
        });
        self.level = 0;
        self.collapse();
        Ok(())
    }

    /// Pops completed values off the stack, attaching each to its parent.
    fn collapse(&mut self) {
        while self.stack.last().is_some_and(Frame::is_complete) {
            self.close_top();
        }
    }

    /// Pops the innermost value and hands it to its parent, or emits it at
    /// top level.
    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut() {
            Some(parent) => parent.value.children.push(frame.value),
            None => {
                tracing::trace!(
                    code = frame.value.code,
                    level = frame.value.level,
                    offset = self.offset,
                    "decoded top-level value"
                );
                self.values.push(frame.value);
            }
        }
    }
}

/// Decodes a complete in-memory byte sequence.
///
/// On failure the returned [`PartialDecode`] holds the values that completed
/// before the offending byte.
pub fn decode(data: &[u8]) -> Result<Vec<Value>, PartialDecode> {
    let mut decoder = Decoder::new();
    for (offset, &byte) in data.iter().enumerate() {
        if let Err(error) = decoder.accept(byte) {
            return Err(PartialDecode {
                error,
                offset,
                values: decoder.into_values(),
            });
        }
    }
    if let Err(error) = decoder.finish() {
        return Err(PartialDecode {
            error,
            offset: data.len(),
            values: decoder.into_values(),
        });
    }
    Ok(decoder.into_values())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_ok(data: &[u8]) -> Vec<Value> {
        decode(data).expect("decode failed")
    }

    #[test]
    fn decode_false() {
        let values = decode_ok(&[0x20]);
        assert_eq!(values, vec![Value::new(0x20)]);
        assert_eq!(values[0].as_bool(), Some(false));
    }

    #[test]
    fn decode_leveled_true() {
        assert_eq!(decode_ok(&[0xFF, 0x21]), vec![Value::new(0x21).with_level(1)]);
    }

    #[test]
    fn decode_escaped_null() {
        assert_eq!(
            decode_ok(&[0x91, 0x00, 0x01, 0x00]),
            vec![Value::string(0x91, [0x00])]
        );
    }

    #[test]
    fn decode_single_tuple() {
        assert_eq!(
            decode_ok(&[0xA0, 0x20]),
            vec![Value::tuple(0xA0, vec![Value::new(0x20)])]
        );
    }

    #[test]
    fn decode_list() {
        assert_eq!(
            decode_ok(&[0xF0, 0x10, 0x20, 0x00]),
            vec![Value::list(0xF0, vec![Value::new(0x10), Value::new(0x20)])]
        );
    }

    #[test]
    fn illegal_type_codes() {
        for code in 0x00..=0x07u8 {
            let mut decoder = Decoder::new();
            assert!(
                matches!(decoder.accept(code), Err(BoneError::IllegalTypeCode(c)) if c == code),
                "code 0x{code:02X}"
            );
        }
        let failure = decode(&[0x00]).unwrap_err();
        assert!(matches!(failure.error, BoneError::IllegalTypeCode(0x00)));
        assert_eq!(failure.offset, 0);
    }

    #[test]
    fn truncated_block() {
        let failure = decode(&[0x0F]).unwrap_err();
        assert!(matches!(failure.error, BoneError::PartialValue(1)));
        assert_eq!(failure.offset, 1);
    }

    #[test]
    fn illegal_level_extensions() {
        let cases: &[&[u8]] = &[
            &[0xFF, 0x0F],
            &[0xFF, 0xFF, 0xFF, 0x1F],
            &[0xFF, 0x10],
        ];
        for bytes in cases {
            let failure = decode(bytes).unwrap_err();
            assert!(
                matches!(failure.error, BoneError::IllegalLevelExtension(_)),
                "{bytes:02X?}"
            );
            assert_eq!(failure.offset, bytes.len() - 1);
        }
        // The code check runs before the level check.
        let failure = decode(&[0xFF, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(failure.error, BoneError::IllegalTypeCode(0x00)));
    }

    #[test]
    fn blocks_of_every_length() {
        let data = [
            0x10, 0x17, 0x20, 0xFF, 0x21, 0xFF, 0xFF, 0x2F, // empty blocks
            0x0F, 0xAA, 0x18, 0xBB, 0xFF, 0x31, 0xDD, // one byte
            0x0E, 0x11, 0x22, 0x19, 0x33, 0x44, 0x40, 0x55, 0x66, // two bytes
            0x0D, 0x01, 0x02, 0x03, 0x1A, 0x04, 0x05, 0x06, // three bytes
            0xFF, 0x61, 0xDD, 0xEE, 0xFF, 0x00, // four bytes, 0xFF and 0x00 as payload
            0x08, 1, 2, 3, 4, 5, 6, 7, 8, 0x1F, 9, 10, 11, 12, 13, 14, 15, 16,
            0x80, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
        ];
        let expected = vec![
            Value::new(0x10),
            Value::new(0x17),
            Value::new(0x20),
            Value::new(0x21).with_level(1),
            Value::new(0x2F).with_level(2),
            Value::block(0x0F, [0xAA]),
            Value::block(0x18, [0xBB]),
            Value::block(0x31, [0xDD]).with_level(1),
            Value::block(0x0E, [0x11, 0x22]),
            Value::block(0x19, [0x33, 0x44]),
            Value::block(0x40, [0x55, 0x66]),
            Value::block(0x0D, [1, 2, 3]),
            Value::block(0x1A, [4, 5, 6]),
            Value::block(0x61, [0xDD, 0xEE, 0xFF, 0x00]).with_level(1),
            Value::block(0x08, [1, 2, 3, 4, 5, 6, 7, 8]),
            Value::block(0x1F, [9, 10, 11, 12, 13, 14, 15, 16]),
            Value::block(0x80, (0..16).collect::<Vec<u8>>()),
        ];
        assert_eq!(decode_ok(&data), expected);
    }

    #[test]
    fn nested_tuples() {
        let data = [
            0xA0, 0x20, // (false)
            0xFF, 0xA0, 0x21, // ^1 (true)
            0xA0, 0xA0, 0x21, // ((true))
            0xB0, 0x21, 0x21, // (true, true)
            0x21,
        ];
        let values = decode_ok(&data);
        assert_eq!(values.len(), 5);
        assert_eq!(values[0].children[0].as_bool(), Some(false));
        assert_eq!(values[1].level, 1);
        assert_eq!(values[1].children[0].as_bool(), Some(true));
        assert_eq!(values[2].children[0].children[0].as_bool(), Some(true));
        assert_eq!(values[3].children.len(), 2);
        assert_eq!(values[4], Value::new(0x21));
    }

    #[test]
    fn four_tuple_completes_on_last_child() {
        let mut decoder = Decoder::new();
        decoder.feed(&[0xD0, 0x20, 0x21, 0x20][..]).unwrap();
        assert!(decoder.values().is_empty());
        assert_eq!(decoder.depth(), 1);
        decoder.accept(0x21).unwrap();
        assert_eq!(decoder.depth(), 0);
        assert_eq!(decoder.values()[0].children.len(), 4);
    }

    #[test]
    fn tuple_never_overruns_arity() {
        let values = decode_ok(&[0xB0, 0x20, 0x21, 0x20]);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].children.len(), 2);
        assert_eq!(values[1], Value::new(0x20));
    }

    #[test]
    fn nested_lists() {
        let data = [0xF0, 0x00, 0xF0, 0xF0, 0x21, 0x00, 0x21, 0x00];
        let values = decode_ok(&data);
        assert_eq!(values[0], Value::list(0xF0, vec![]));
        assert_eq!(
            values[1],
            Value::list(
                0xF0,
                vec![Value::list(0xF0, vec![Value::new(0x21)]), Value::new(0x21)]
            )
        );
    }

    #[test]
    fn string_terminated_by_next_value() {
        let values = decode_ok(&[0x90, b'h', b'i', 0x00, 0x21]);
        assert_eq!(values, vec![Value::string(0x90, *b"hi"), Value::new(0x21)]);
    }

    #[test]
    fn string_terminated_at_end_of_input() {
        let mut decoder = Decoder::new();
        decoder.feed(&[0x90, b'a', 0x00][..]).unwrap();
        assert!(decoder.values().is_empty());
        decoder.finish().unwrap();
        assert_eq!(decoder.values(), &[Value::string(0x90, *b"a")]);
    }

    #[test]
    fn empty_string() {
        assert_eq!(decode_ok(&[0x9F, 0x00]), vec![Value::string(0x9F, Vec::new())]);
    }

    #[test]
    fn string_escapes() {
        // "\0\0" followed by an escape byte used as a literal.
        let data = [0x90, 0x00, 0x01, 0x00, 0x01, 0x01, 0xFF, 0x00];
        assert_eq!(
            decode_ok(&data),
            vec![Value::string(0x90, [0x00, 0x00, 0x01, 0xFF])]
        );
    }

    #[test]
    fn string_inside_list() {
        // The second 0x00 closes the string, the third closes the list.
        let data = [0xF0, 0x91, b'x', 0x00, 0x00];
        assert_eq!(
            decode_ok(&data),
            vec![Value::list(0xF0, vec![Value::string(0x91, *b"x")])]
        );
    }

    #[test]
    fn string_completes_tuple() {
        let data = [0xA0, 0x90, b'x', 0x00, 0x20];
        assert_eq!(
            decode_ok(&data),
            vec![
                Value::tuple(0xA0, vec![Value::string(0x90, *b"x")]),
                Value::new(0x20)
            ]
        );
    }

    #[test]
    fn list_terminator_after_level_marker() {
        let failure = decode(&[0xF0, 0x20, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(failure.error, BoneError::ListTerminatedWithLevel(1)));
        assert_eq!(failure.offset, 3);
    }

    #[test]
    fn trailing_level_markers() {
        let failure = decode(&[0x20, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(failure.error, BoneError::PendingLevel(2)));
        assert_eq!(failure.values, vec![Value::new(0x20)]);
    }

    #[test]
    fn failure_keeps_emitted_values() {
        let failure = decode(&[0x20, 0x30, 0x01, 0x05]).unwrap_err();
        assert!(matches!(failure.error, BoneError::IllegalTypeCode(0x05)));
        assert_eq!(failure.offset, 3);
        assert_eq!(
            failure.values,
            vec![Value::new(0x20), Value::block(0x30, [0x01])]
        );
    }

    #[test]
    fn reserved_codes_never_complete() {
        for data in [&[0xE0][..], &[0xE5, 0x20, 0x21][..], &[0xF0, 0xEF, 0x20][..]] {
            let failure = decode(data).unwrap_err();
            assert!(
                matches!(failure.error, BoneError::PartialValue(_)),
                "{data:02X?}"
            );
        }
    }

    #[test]
    fn open_list_at_end_of_input() {
        let failure = decode(&[0xF0, 0xF1, 0x20, 0x00]).unwrap_err();
        assert!(matches!(failure.error, BoneError::PartialValue(1)));
    }

    #[test]
    fn depth_limit() {
        let mut decoder = Decoder::new().with_max_depth(2);
        decoder.feed(&[0xA0, 0x20, 0xB0, 0x20, 0x21][..]).unwrap();
        assert_eq!(decoder.values().len(), 2);

        let mut decoder = Decoder::new().with_max_depth(2);
        let err = decoder.feed(&[0xA0, 0xA0, 0x20][..]).unwrap_err();
        assert!(matches!(err, BoneError::DepthLimitExceeded(2)));
    }

    #[test]
    fn decoder_state_accessors() {
        let mut decoder = Decoder::new();
        decoder.feed(&[0xF0, 0xFF, 0xFF][..]).unwrap();
        assert_eq!(decoder.depth(), 1);
        assert_eq!(decoder.pending_level(), 2);
        assert_eq!(decoder.offset(), 3);
        decoder.feed(&[0x21, 0x00, 0x20][..]).unwrap();
        assert_eq!(decoder.pending_level(), 0);
        let taken = decoder.take_values();
        assert_eq!(taken.len(), 2);
        assert!(decoder.values().is_empty());
    }
}
