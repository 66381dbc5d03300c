//! Replacement template expansion
//!
//! Templates are literal text with backslash directives:
//!
//! | directive            | expands to                                   |
//! |----------------------|----------------------------------------------|
//! | `\0`..`\99`          | text of that group (nothing if unmatched)    |
//! | `\&`                 | the whole match                              |
//! | `` \` ``             | text before the match                        |
//! | `\'`                 | text after the match                         |
//! | `\+`                 | highest-numbered participating group         |
//! | `\<name>`, `\k<name>`| named group                                  |
//! | `\\`                 | a backslash                                  |
//!
//! Anything else after a backslash is copied literally along with the
//! backslash. Malformed directives never fail; they degrade to literal text.
//! The template is scanned character by character in the pattern's encoding,
//! once per match.

use super::matchdata::MatchData;
use super::options::Encoding;

const BACKSLASH: u32 = b'\\' as u32;

/// Append the expansion of `template` for match `m` to `dst`.
pub fn expand_template(template: &[u8], m: &MatchData<'_>, dst: &mut Vec<u8>) {
    let enc = m.encoding();
    let mut pos = 0;

    while let Some((code, len)) = enc.decode(&template[pos..]) {
        let escape_start = pos;
        pos += len;

        if code != BACKSLASH {
            dst.extend_from_slice(&template[escape_start..pos]);
            continue;
        }

        // dangling backslash
        let Some((next, next_len)) = enc.decode(&template[pos..]) else {
            dst.extend_from_slice(&template[escape_start..pos]);
            break;
        };

        if let Some((group, consumed)) = group_number(template, pos, enc) {
            pos += consumed;
            if let Some(text) = m.get(group) {
                dst.extend_from_slice(text);
            }
            continue;
        }

        match char::from_u32(next) {
            Some('\\') => {
                dst.extend_from_slice(&template[pos..pos + next_len]);
                pos += next_len;
            }
            Some('&') => {
                dst.extend_from_slice(m.as_bytes());
                pos += next_len;
            }
            Some('`') => {
                dst.extend_from_slice(m.pre_match());
                pos += next_len;
            }
            Some('\'') => {
                dst.extend_from_slice(m.post_match());
                pos += next_len;
            }
            Some('+') => {
                if let Some(text) = m.last_group() {
                    dst.extend_from_slice(text);
                }
                pos += next_len;
            }
            Some('<') => {
                pos = named_group(template, escape_start, pos + next_len, m, dst);
            }
            Some('k') if starts_with_char(template, pos + next_len, enc, '<') => {
                pos = named_group(template, escape_start, pos + next_len + 1, m, dst);
            }
            _ => {
                dst.extend_from_slice(&template[escape_start..pos + next_len]);
                pos += next_len;
            }
        }
    }
}

/// Parse one or two decimal digits at `pos`; returns `(group, bytes_consumed)`.
fn group_number(template: &[u8], pos: usize, enc: Encoding) -> Option<(usize, usize)> {
    let mut group = 0usize;
    let mut consumed = 0;
    let mut digits = 0;

    while digits < 2 {
        match enc.decode(&template[pos + consumed..]) {
            Some((code, len)) if enc.is_digit_code(code) => {
                group = group * 10 + (code - u32::from(b'0')) as usize;
                consumed += len;
                digits += 1;
            }
            _ => break,
        }
    }

    (digits > 0).then_some((group, consumed))
}

fn starts_with_char(template: &[u8], pos: usize, enc: Encoding, c: char) -> bool {
    matches!(enc.decode(&template[pos..]), Some((code, _)) if code == u32::from(c))
}

/// Expand `\<name>` / `\k<name>` whose name starts at `name_start`.
///
/// On a well-formed reference the group text is appended and the position
/// after `>` is returned. Otherwise the directive prefix up to and including
/// `<` is copied literally and scanning resumes right after it.
fn named_group(
    template: &[u8],
    escape_start: usize,
    name_start: usize,
    m: &MatchData<'_>,
    dst: &mut Vec<u8>,
) -> usize {
    let enc = m.encoding();
    let mut name_end = name_start;
    let mut terminated = false;

    while let Some((code, len)) = enc.decode(&template[name_end..]) {
        if code == u32::from(b'>') {
            terminated = true;
            break;
        }
        if !enc.is_word_code(code) {
            break;
        }
        name_end += len;
    }

    if !terminated || name_end == name_start {
        dst.extend_from_slice(&template[escape_start..name_start]);
        return name_start;
    }

    if let Some(text) = m.name(&template[name_start..name_end]) {
        dst.extend_from_slice(text);
    }
    name_end + 1
}
