//! Internal key layout shared with the host engine
//!
//! ```text
//! internal key: [user key ...][tag: u64 little-endian]
//! tag:          sequence << 8 | value type
//! ```

use crate::error::{Error, Result};

/// Sequence number assigned by the engine to every write
pub type SequenceNumber = u64;

/// Largest sequence number that fits in a tag
pub const MAX_SEQUENCE_NUMBER: SequenceNumber = (1 << 56) - 1;

/// Size of the trailing tag in an internal key
pub const TAG_SIZE: usize = 8;

/// Kind of write a tag records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// Tombstone
    Deletion = 0x0,
    /// Regular put
    Value = 0x1,
}

impl TryFrom<u8> for ValueType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        match byte {
            0x0 => Ok(ValueType::Deletion),
            0x1 => Ok(ValueType::Value),
            other => Err(Error::InvalidValueType(other)),
        }
    }
}

/// Packed (sequence, value type) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(u64);

impl Tag {
    /// Pack a sequence number and value type
    pub fn pack(sequence: SequenceNumber, kind: ValueType) -> Result<Self> {
        if sequence > MAX_SEQUENCE_NUMBER {
            return Err(Error::SequenceOverflow(sequence));
        }
        Ok(Tag((sequence << 8) | kind as u64))
    }

    /// Wrap a raw tag without validation
    pub const fn from_raw(raw: u64) -> Self {
        Tag(raw)
    }

    /// Raw packed value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Sequence number (high 56 bits)
    pub const fn sequence(self) -> SequenceNumber {
        self.0 >> 8
    }

    /// Value type (low byte)
    pub fn value_type(self) -> Result<ValueType> {
        ValueType::try_from((self.0 & 0xff) as u8)
    }

    /// Decode from the trailing bytes of an internal key
    pub fn from_le_bytes(bytes: [u8; TAG_SIZE]) -> Self {
        Tag(u64::from_le_bytes(bytes))
    }

    /// Encode as internal key trailer
    pub fn to_le_bytes(self) -> [u8; TAG_SIZE] {
        self.0.to_le_bytes()
    }
}

/// Internal key split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInternalKey<'a> {
    /// Bytes preceding the tag
    pub user_key: &'a [u8],
    /// Trailing tag
    pub tag: Tag,
}

/// Split an internal key into user key and tag
///
/// # Returns
/// * `Err(Error::KeyTooShort)` - fewer than 8 bytes
/// * `Err(Error::InvalidValueType)` - unknown kind byte in the tag
pub fn parse_internal_key(internal_key: &[u8]) -> Result<ParsedInternalKey<'_>> {
    let split = internal_key
        .len()
        .checked_sub(TAG_SIZE)
        .ok_or(Error::KeyTooShort(internal_key.len()))?;
    let (user_key, trailer) = internal_key.split_at(split);

    let mut raw = [0u8; TAG_SIZE];
    raw.copy_from_slice(trailer);
    let tag = Tag::from_le_bytes(raw);
    tag.value_type()?;

    Ok(ParsedInternalKey { user_key, tag })
}

/// Append `user_key ‖ tag(sequence, kind)` to `buf`
pub fn append_internal_key(
    buf: &mut Vec<u8>,
    user_key: &[u8],
    sequence: SequenceNumber,
    kind: ValueType,
) -> Result<()> {
    let tag = Tag::pack(sequence, kind)?;
    buf.reserve(user_key.len() + TAG_SIZE);
    buf.extend_from_slice(user_key);
    buf.extend_from_slice(&tag.to_le_bytes());
    Ok(())
}
