//! Codepoint boundaries for the supported encodings
//!
//! Substitution templates and zero-width advancement step over whole
//! characters, never single bytes, so every multi-byte encoding in the table
//! needs a lead-byte width rule.

use super::options::Encoding;

impl Encoding {
    /// Whether characters may span more than one byte.
    pub fn is_multibyte(self) -> bool {
        matches!(
            self,
            Encoding::Utf8
                | Encoding::EucJp
                | Encoding::EucTw
                | Encoding::EucKr
                | Encoding::EucCn
                | Encoding::Sjis
                | Encoding::Big5
        )
    }

    /// Byte length of the character starting at `bytes[0]`.
    ///
    /// Always at least 1 for non-empty input and never longer than `bytes`;
    /// truncated or malformed sequences degrade to what is left.
    pub fn char_len(self, bytes: &[u8]) -> usize {
        let Some(&lead) = bytes.first() else {
            return 0;
        };

        let width = match self {
            Encoding::Utf8 => match lead {
                0x00..=0x7f => 1,
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                _ => 1,
            },
            Encoding::EucJp => match lead {
                0x8e => 2,
                0x8f => 3,
                0xa1..=0xfe => 2,
                _ => 1,
            },
            Encoding::EucTw => match lead {
                0x8e => 4,
                0xa1..=0xfe => 2,
                _ => 1,
            },
            Encoding::EucKr | Encoding::EucCn => match lead {
                0xa1..=0xfe => 2,
                _ => 1,
            },
            Encoding::Sjis => match lead {
                0x81..=0x9f | 0xe0..=0xfc => 2,
                _ => 1,
            },
            Encoding::Big5 => match lead {
                0x81..=0xfe => 2,
                _ => 1,
            },
            _ => 1,
        };

        width.min(bytes.len())
    }

    /// Decode the character at the start of `bytes` into `(code, byte_len)`.
    ///
    /// UTF-8 yields Unicode scalar values; other multi-byte encodings yield
    /// the big-endian combination of their bytes. Returns `None` on empty input.
    pub fn decode(self, bytes: &[u8]) -> Option<(u32, usize)> {
        let len = self.char_len(bytes);
        if len == 0 {
            return None;
        }

        let raw = &bytes[..len];
        let code = match self {
            Encoding::Utf8 if len > 1 => std::str::from_utf8(raw)
                .ok()
                .and_then(|s| s.chars().next())
                .map(u32::from)
                .unwrap_or(u32::from(raw[0])),
            _ => raw
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
        };

        Some((code, len))
    }

    /// ASCII decimal digit test used for `\N` group references.
    pub fn is_digit_code(self, code: u32) -> bool {
        (u32::from(b'0')..=u32::from(b'9')).contains(&code)
    }

    /// Word-character test used to delimit `\<name>` references.
    pub fn is_word_code(self, code: u32) -> bool {
        if code < 0x80 {
            let b = code as u8;
            return b.is_ascii_alphanumeric() || b == b'_';
        }

        match self {
            Encoding::Utf8 => char::from_u32(code).is_some_and(char::is_alphanumeric),
            enc => enc.is_multibyte() && code > 0xff,
        }
    }

    /// Iterate over `(offset, char_len)` of each character in `bytes`.
    pub fn char_boundaries(self, bytes: &[u8]) -> CharBoundaries<'_> {
        CharBoundaries {
            encoding: self,
            bytes,
            pos: 0,
        }
    }
}

/// Iterator returned by [`Encoding::char_boundaries`]
#[derive(Debug, Clone)]
pub struct CharBoundaries<'a> {
    encoding: Encoding,
    bytes: &'a [u8],
    pos: usize,
}

impl Iterator for CharBoundaries<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.encoding.char_len(&self.bytes[self.pos..]);
        if len == 0 {
            return None;
        }
        let start = self.pos;
        self.pos += len;
        Some((start, len))
    }
}
