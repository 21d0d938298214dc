//! Recursive-descent bencode parser
//!
//! Dictionaries preserve source order as `Vec<(key, value)>` pairs; the
//! reader is lenient about key ordering (the format requires sorted keys
//! of writers, but real-world files disagree often enough that rejecting
//! them would be a compatibility bug). One grammar violation aborts the
//! whole parse; there are no partial results.

use crate::cursor::BinaryCursor;
use crate::torrent::error::{TorrentError, TorrentResult};

/// Maximum nesting depth before a parse fails `TooDeeplyNested`.
///
/// Recursion depth tracks document nesting, so an adversarially deep
/// document would otherwise exhaust the call stack.
pub const MAX_DEPTH: usize = 1000;

/// One bencoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BencodeValue {
    /// `i…e` integer
    Integer(i64),
    /// Length-prefixed byte string
    ByteString(Vec<u8>),
    /// `l…e` list
    List(Vec<BencodeValue>),
    /// `d…e` dictionary, in source order
    Dictionary(Vec<(Vec<u8>, BencodeValue)>),
}

impl BencodeValue {
    /// The integer payload, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The raw bytes, if this is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The items, if this is a list.
    pub fn as_list(&self) -> Option<&[BencodeValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The key/value pairs, if this is a dictionary.
    pub fn as_dictionary(&self) -> Option<&[(Vec<u8>, BencodeValue)]> {
        match self {
            Self::Dictionary(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// First value stored under `key`, if this is a dictionary.
    ///
    /// First-match: a duplicate key keeps its earliest occurrence, which
    /// is what a sorted-key writer would have produced anyway.
    pub fn get(&self, key: &[u8]) -> Option<&BencodeValue> {
        self.as_dictionary()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Parse a complete bencoded document.
///
/// The whole input must be one value; trailing bytes fail
/// [`TorrentError::TrailingData`].
pub fn parse(data: &[u8]) -> TorrentResult<BencodeValue> {
    let mut parser = Parser::new(data);
    let value = parser.parse_value()?;
    if !parser.is_at_end() {
        return Err(TorrentError::TrailingData {
            offset: parser.position(),
        });
    }
    Ok(value)
}

/// Incremental bencode parser over a borrowed buffer.
///
/// [`TorrentMetainfo`](crate::torrent::TorrentMetainfo) drives this
/// directly instead of going through [`parse`] so it can capture the raw
/// byte span of individual top-level values (the info-hash contract).
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: BinaryCursor<'a>,
}

impl<'a> Parser<'a> {
    /// Create a parser positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: BinaryCursor::new(data),
        }
    }

    /// Current absolute byte offset.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Whether every input byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.cursor.peek()
    }

    /// Consume one byte that must equal `expected`.
    pub(crate) fn expect(&mut self, expected: u8) -> TorrentResult<()> {
        let offset = self.position();
        let got = self.cursor.read_u8()?;
        if got != expected {
            return Err(TorrentError::InvalidFormat {
                offset,
                reason: format!("expected '{}', found 0x{got:02x}", expected as char),
            });
        }
        Ok(())
    }

    /// Parse one value of any kind.
    pub fn parse_value(&mut self) -> TorrentResult<BencodeValue> {
        self.value(0)
    }

    fn value(&mut self, depth: usize) -> TorrentResult<BencodeValue> {
        if depth >= MAX_DEPTH {
            return Err(TorrentError::TooDeeplyNested { limit: MAX_DEPTH });
        }
        let offset = self.position();
        match self.peek() {
            Some(b'i') => self.integer(),
            Some(b'l') => self.list(depth),
            Some(b'd') => self.dictionary(depth),
            Some(b'0'..=b'9') => Ok(BencodeValue::ByteString(self.byte_string()?)),
            Some(other) => Err(TorrentError::InvalidFormat {
                offset,
                reason: format!("unexpected byte 0x{other:02x} at start of value"),
            }),
            None => Err(TorrentError::InvalidFormat {
                offset,
                reason: "unexpected end of data where a value was expected".to_string(),
            }),
        }
    }

    fn integer(&mut self) -> TorrentResult<BencodeValue> {
        let offset = self.position();
        self.expect(b'i')?;

        let mut digits: Vec<u8> = Vec::new();
        loop {
            match self.cursor.read_u8()? {
                b'e' => break,
                byte => digits.push(byte),
            }
        }

        let body = digits.as_slice();
        let (negative, magnitude) = match body.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, body),
        };
        if magnitude.is_empty() || !magnitude.iter().all(u8::is_ascii_digit) {
            return Err(TorrentError::InvalidFormat {
                offset,
                reason: "integer is not a decimal number".to_string(),
            });
        }
        if negative && magnitude == b"0" {
            return Err(TorrentError::InvalidFormat {
                offset,
                reason: "negative zero is not a valid integer".to_string(),
            });
        }
        if magnitude.len() > 1 && magnitude[0] == b'0' {
            return Err(TorrentError::InvalidFormat {
                offset,
                reason: "integer has leading zeros".to_string(),
            });
        }

        let mut n: i64 = 0;
        for &digit in magnitude {
            n = n
                .checked_mul(10)
                .and_then(|n| {
                    let d = (digit - b'0') as i64;
                    if negative { n.checked_sub(d) } else { n.checked_add(d) }
                })
                .ok_or_else(|| TorrentError::InvalidFormat {
                    offset,
                    reason: "integer does not fit in 64 bits".to_string(),
                })?;
        }
        Ok(BencodeValue::Integer(n))
    }

    /// Parse a length-prefixed byte string.
    pub(crate) fn byte_string(&mut self) -> TorrentResult<Vec<u8>> {
        let offset = self.position();

        let mut len: usize = 0;
        let mut any_digit = false;
        loop {
            match self.cursor.read_u8()? {
                b':' if any_digit => break,
                digit @ b'0'..=b'9' => {
                    any_digit = true;
                    len = len
                        .checked_mul(10)
                        .and_then(|len| len.checked_add((digit - b'0') as usize))
                        .ok_or_else(|| TorrentError::InvalidFormat {
                            offset,
                            reason: "byte string length overflows".to_string(),
                        })?;
                }
                other => {
                    return Err(TorrentError::InvalidFormat {
                        offset,
                        reason: format!(
                            "expected byte string length then ':', found 0x{other:02x}"
                        ),
                    });
                }
            }
        }

        Ok(self.cursor.read_exact(len)?.to_vec())
    }

    fn list(&mut self, depth: usize) -> TorrentResult<BencodeValue> {
        self.expect(b'l')?;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(b'e') {
                self.expect(b'e')?;
                return Ok(BencodeValue::List(items));
            }
            items.push(self.value(depth + 1)?);
        }
    }

    fn dictionary(&mut self, depth: usize) -> TorrentResult<BencodeValue> {
        self.expect(b'd')?;
        let mut pairs = Vec::new();
        loop {
            match self.peek() {
                Some(b'e') => {
                    self.expect(b'e')?;
                    return Ok(BencodeValue::Dictionary(pairs));
                }
                Some(b'0'..=b'9') => {
                    let key = self.byte_string()?;
                    let value = self.value(depth + 1)?;
                    pairs.push((key, value));
                }
                Some(other) => {
                    return Err(TorrentError::InvalidFormat {
                        offset: self.position(),
                        reason: format!(
                            "dictionary key must be a byte string, found 0x{other:02x}"
                        ),
                    });
                }
                None => {
                    return Err(TorrentError::InvalidFormat {
                        offset: self.position(),
                        reason: "unterminated dictionary".to_string(),
                    });
                }
            }
        }
    }
}
