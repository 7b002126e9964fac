//! Bone type-code constants and classification.
//!
//! The leading byte of every value selects its shape. Fixed-size blocks carry
//! their payload length in the code, tuples their arity; strings and lists are
//! closed by a `0x00` terminator.

// Terminator for strings and lists.
pub const TERMINATOR: u8 = 0x00;

// Follows a `0x00` inside a string to mark it as a literal byte.
pub const ESCAPE: u8 = 0x01;

// Repeatable prefix adding one to the level of the next value.
pub const LEVEL_MARKER: u8 = 0xFF;

// Lookahead fed to the string terminator check at end of input.
pub const END_OF_INPUT: u8 = 0xFF;

// Boolean blocks.
pub const FALSE: u8 = 0x20;
pub const TRUE: u8 = 0x21;

// Codes below this value never start a value.
pub const FIRST_LEGAL: u8 = 0x08;

// Codes below this value may not carry a level.
pub const FIRST_LEVELED: u8 = 0x20;

// First code of each range.
pub const STRING: u8 = 0x90;
pub const TUPLE_1: u8 = 0xA0;
pub const TUPLE_2: u8 = 0xB0;
pub const TUPLE_3: u8 = 0xC0;
pub const TUPLE_4: u8 = 0xD0;
pub const RESERVED: u8 = 0xE0;
pub const LIST: u8 = 0xF0;

/// The shape of a value, derived from its type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Fixed number of raw payload bytes.
    Block(usize),
    /// Escaped, null-terminated payload.
    String,
    /// Fixed number of children (1..=4).
    Tuple(usize),
    /// Any number of children followed by a terminator.
    List,
    /// 0xE0..=0xEF: no defined encoding, never completes.
    Reserved,
}

impl Kind {
    /// Classifies a type code. Returns `None` for 0x00..=0x07 and for the
    /// level marker, neither of which can start a value.
    pub const fn of(code: u8) -> Option<Kind> {
        let kind = match code {
            0x00..=0x07 | 0xFF => return None,
            0x08..=0x0F => Kind::Block(0x10 - code as usize),
            0x10..=0x17 => Kind::Block(0),
            0x18..=0x1F => Kind::Block(code as usize - 0x17),
            0x20..=0x2F => Kind::Block(0),
            0x30..=0x3F => Kind::Block(1),
            0x40..=0x4F => Kind::Block(2),
            0x50..=0x5F => Kind::Block(3),
            0x60..=0x6F => Kind::Block(4),
            0x70..=0x7F => Kind::Block(8),
            0x80..=0x8F => Kind::Block(16),
            0x90..=0x9F => Kind::String,
            0xA0..=0xAF => Kind::Tuple(1),
            0xB0..=0xBF => Kind::Tuple(2),
            0xC0..=0xCF => Kind::Tuple(3),
            0xD0..=0xDF => Kind::Tuple(4),
            0xE0..=0xEF => Kind::Reserved,
            0xF0..=0xFE => Kind::List,
        };
        Some(kind)
    }

    /// Whether a value of this kind with the given payload length and child
    /// count is complete.
    ///
    /// Strings and lists complete only on their terminator byte, so they never
    /// satisfy this predicate.
    pub const fn is_complete(self, payload_len: usize, child_count: usize) -> bool {
        match self {
            Kind::Block(len) => payload_len == len,
            Kind::Tuple(arity) => child_count == arity,
            Kind::String | Kind::List | Kind::Reserved => false,
        }
    }
}

pub const fn is_block(code: u8) -> bool {
    matches!(Kind::of(code), Some(Kind::Block(_)))
}

pub const fn is_string(code: u8) -> bool {
    matches!(Kind::of(code), Some(Kind::String))
}

pub const fn is_tuple(code: u8) -> bool {
    matches!(Kind::of(code), Some(Kind::Tuple(_)))
}

pub const fn is_list(code: u8) -> bool {
    matches!(Kind::of(code), Some(Kind::List))
}

pub const fn is_reserved(code: u8) -> bool {
    matches!(Kind::of(code), Some(Kind::Reserved))
}

/// Payload length of a block code.
pub const fn block_len(code: u8) -> Option<usize> {
    match Kind::of(code) {
        Some(Kind::Block(len)) => Some(len),
        _ => None,
    }
}

/// Child count of a tuple code.
pub const fn tuple_arity(code: u8) -> Option<usize> {
    match Kind::of(code) {
        Some(Kind::Tuple(arity)) => Some(arity),
        _ => None,
    }
}

/// Whether a value with this code may be preceded by level markers.
pub const fn accepts_level(code: u8) -> bool {
    code >= FIRST_LEVELED
}
