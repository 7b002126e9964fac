//! Bone value type.

use std::fmt;

use crate::error::BoneError;
use crate::wire::code::{self, Kind};

/// A single Bone value: a type code, a level, and either a payload or children.
///
/// Blocks and strings use `payload`; tuples and lists use `children`. The kind
/// is always derived from `code` and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Value {
    pub code: u8,
    /// Number of `0xFF` markers preceding the code on the wire.
    pub level: usize,
    pub payload: Vec<u8>,
    pub children: Vec<Value>,
}

impl Value {
    /// Creates an empty value with the given code and level 0.
    pub fn new(code: u8) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    pub fn block(code: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Creates a string value. The payload is raw bytes; escaping happens on
    /// the wire only.
    pub fn string(code: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self::block(code, payload)
    }

    pub fn tuple(code: u8, children: Vec<Value>) -> Self {
        Self {
            code,
            children,
            ..Self::default()
        }
    }

    pub fn list(code: u8, children: Vec<Value>) -> Self {
        Self::tuple(code, children)
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(if b { code::TRUE } else { code::FALSE })
    }

    /// Sets the level of this value.
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Returns the kind of this value, or `None` if `code` cannot start a value.
    pub fn kind(&self) -> Option<Kind> {
        Kind::of(self.code)
    }

    pub fn is_block(&self) -> bool {
        code::is_block(self.code)
    }

    pub fn is_string(&self) -> bool {
        code::is_string(self.code)
    }

    pub fn is_tuple(&self) -> bool {
        code::is_tuple(self.code)
    }

    pub fn is_list(&self) -> bool {
        code::is_list(self.code)
    }

    /// Whether the payload or children satisfy the length or arity rule of the
    /// code. Strings, lists and reserved codes always report `false`.
    pub fn is_complete(&self) -> bool {
        match self.kind() {
            Some(kind) => kind.is_complete(self.payload.len(), self.children.len()),
            None => {
                debug_assert!(false, "illegal type code 0x{:02X}", self.code);
                false
            }
        }
    }

    /// Returns the boolean carried by the `0x20`/`0x21` blocks.
    pub fn as_bool(&self) -> Option<bool> {
        match self.code {
            code::FALSE => Some(false),
            code::TRUE => Some(true),
            _ => None,
        }
    }

    /// Returns the payload of a string value as UTF-8, if it is valid.
    pub fn as_str(&self) -> Option<&str> {
        if !self.is_string() {
            return None;
        }
        std::str::from_utf8(&self.payload).ok()
    }

    /// Checks the whole tree against the encoding rules: legal codes, levels
    /// only on codes that allow them, exact block lengths and tuple arities.
    pub fn validate(&self) -> Result<(), BoneError> {
        let mut pending = vec![self];
        while let Some(v) = pending.pop() {
            let kind = v.kind().ok_or(BoneError::IllegalTypeCode(v.code))?;
            if v.level > 0 && !code::accepts_level(v.code) {
                return Err(BoneError::IllegalLevelExtension(v.code));
            }
            match kind {
                Kind::Block(len) => {
                    if v.payload.len() != len {
                        return Err(BoneError::Malformed(format!(
                            "block 0x{:02X} needs {len} payload bytes, has {}",
                            v.code,
                            v.payload.len()
                        )));
                    }
                    v.expect_no_children()?;
                }
                Kind::String => v.expect_no_children()?,
                Kind::Tuple(arity) => {
                    if v.children.len() != arity {
                        return Err(BoneError::Malformed(format!(
                            "tuple 0x{:02X} needs {arity} children, has {}",
                            v.code,
                            v.children.len()
                        )));
                    }
                    v.expect_no_payload()?;
                }
                Kind::List => v.expect_no_payload()?,
                Kind::Reserved => return Err(BoneError::ReservedTypeCode(v.code)),
            }
            pending.extend(v.children.iter());
        }
        Ok(())
    }

    fn expect_no_children(&self) -> Result<(), BoneError> {
        if self.children.is_empty() {
            Ok(())
        } else {
            Err(BoneError::Malformed(format!(
                "0x{:02X} cannot hold children",
                self.code
            )))
        }
    }

    fn expect_no_payload(&self) -> Result<(), BoneError> {
        if self.payload.is_empty() {
            Ok(())
        } else {
            Err(BoneError::Malformed(format!(
                "0x{:02X} cannot hold a payload",
                self.code
            )))
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.level > 0 {
            write!(f, "^{} ", self.level)?;
        }
        write!(f, "0x{:02X}", self.code)?;
        match self.kind() {
            Some(Kind::String) => write!(f, "\"{}\"", self.payload.escape_ascii()),
            Some(Kind::Tuple(_)) => write_children(f, &self.children, '(', ')'),
            Some(Kind::List) => write_children(f, &self.children, '[', ']'),
            _ if self.payload.is_empty() => Ok(()),
            _ => {
                write!(f, "<")?;
                for b in &self.payload {
                    write!(f, "{b:02X}")?;
                }
                write!(f, ">")
            }
        }
    }
}

fn write_children(
    f: &mut fmt::Formatter<'_>,
    children: &[Value],
    open: char,
    close: char,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, "{close}")
}
