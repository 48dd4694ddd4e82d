//! Digest Module
//!
//! Computes message ids. A message is serialized to a long canonical string
//! that is unique per distinct message, and the string is hashed with MD5.
//!
//! The canonical string, depth first over the parts:
//! - the escaped meaning (empty when absent); the comment never contributes,
//! - each text run as `ESC '` text `ESC .`,
//! - each tag pair as `ESC <` begin-name `,` type `ESC .`, then its own parts
//!   one level down, then `ESC >` end-name `,` type `ESC .`,
//! - after the ordered content of a level, one `ESC X` name `,` type `ESC .`
//!   token per distinct simple placeholder of that level, sorted by name.
//!
//! Simple placeholders may therefore move around within their level without
//! changing the id, while tag nesting is order sensitive.

use crate::config::HtmlWhitespace;
use crate::i18n::escaping::{collapse_whitespace, EscapingContext};
use crate::i18n::i18n_ast::{Message, Part, Placeholder, TagPair};
use std::collections::BTreeMap;

pub const ESCAPE_CHAR: char = '\u{10}';
const ESCAPE_END: &str = "\u{10}.";
const BEGIN_TEXT: &str = "\u{10}'";
const BEGIN_PH: &str = "\u{10}X";
const BEGIN_TAG: &str = "\u{10}<";
const END_TAG: &str = "\u{10}>";

/// Options that change how text contributes to the canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    pub context: EscapingContext,
    pub html_whitespace: HtmlWhitespace,
}

impl DigestOptions {
    pub fn new(context: EscapingContext, html_whitespace: HtmlWhitespace) -> Self {
        DigestOptions {
            context,
            html_whitespace,
        }
    }

    fn normalizes_whitespace(&self) -> bool {
        self.context.is_whitespace_insensitive() && self.html_whitespace == HtmlWhitespace::Collapse
    }
}

/// Recompute the id of a built message from its content.
pub fn digest(message: &Message, html_whitespace: HtmlWhitespace) -> String {
    compute_message_id(
        message.meaning(),
        message.parts(),
        DigestOptions::new(message.context(), html_whitespace),
    )
}

pub fn compute_message_id(meaning: Option<&str>, parts: &[Part], options: DigestOptions) -> String {
    md5_hex(canonical_string(meaning, parts, options).as_bytes())
}

/// The string hashed into a message id.
pub fn canonical_string(meaning: Option<&str>, parts: &[Part], options: DigestOptions) -> String {
    let mut out = escape_text_for_message_id(meaning.unwrap_or(""));
    let texts = normalized_texts(parts, options, true);
    serialize_level(parts, &texts, options, &mut out);
    out
}

fn escape_text_for_message_id(text: &str) -> String {
    let doubled = format!("{}{}", ESCAPE_CHAR, ESCAPE_CHAR);
    text.replace(ESCAPE_CHAR, &doubled)
}

/// The text of each `Part::Text` at one level as it enters the canonical
/// string, or `None` when it contributes nothing. At the outermost level of a
/// whitespace insensitive message, leading and trailing whitespace is dropped.
fn normalized_texts(parts: &[Part], options: DigestOptions, outermost: bool) -> Vec<Option<String>> {
    let mut texts: Vec<Option<String>> = parts
        .iter()
        .map(|part| match part {
            Part::Text(text) if options.normalizes_whitespace() => Some(collapse_whitespace(text)),
            Part::Text(text) => Some(text.clone()),
            _ => None,
        })
        .collect();

    if outermost && options.normalizes_whitespace() {
        if let Some(Some(first)) = texts.first_mut() {
            *first = first.trim_start().to_string();
        }
        if let Some(Some(last)) = texts.last_mut() {
            *last = last.trim_end().to_string();
        }
        for text in texts.iter_mut() {
            if text.as_deref() == Some("") {
                *text = None;
            }
        }
    }
    texts
}

fn serialize_level(parts: &[Part], texts: &[Option<String>], options: DigestOptions, out: &mut String) {
    let mut placeholders: BTreeMap<&str, &Placeholder> = BTreeMap::new();
    for (part, text) in parts.iter().zip(texts) {
        match part {
            Part::Text(_) => {
                if let Some(text) = text {
                    out.push_str(BEGIN_TEXT);
                    out.push_str(&escape_text_for_message_id(text));
                    out.push_str(ESCAPE_END);
                }
            }
            Part::Placeholder(ph) => {
                placeholders.insert(ph.name.as_str(), ph);
            }
            Part::TagPair(tag_pair) => serialize_tag_pair(tag_pair, options, out),
        }
    }
    for (name, ph) in placeholders {
        push_marker(out, BEGIN_PH, name, ph.kind.stable_type_name());
    }
}

fn serialize_tag_pair(tag_pair: &TagPair, options: DigestOptions, out: &mut String) {
    push_marker(
        out,
        BEGIN_TAG,
        &tag_pair.begin_placeholder.name,
        TagPair::STABLE_TYPE_NAME,
    );
    let texts = normalized_texts(&tag_pair.parts, options, false);
    serialize_level(&tag_pair.parts, &texts, options, out);
    push_marker(
        out,
        END_TAG,
        &tag_pair.end_placeholder.name,
        TagPair::STABLE_TYPE_NAME,
    );
}

fn push_marker(out: &mut String, begin: &str, name: &str, type_name: &str) {
    out.push_str(begin);
    out.push_str(name);
    out.push(',');
    out.push_str(type_name);
    out.push_str(ESCAPE_END);
}

/// MD5 of `bytes` as 32 lowercase hex digits.
///
/// Only used to derive stable ids. It is not fit for anything security related.
pub fn md5_hex(bytes: &[u8]) -> String {
    let [a, b, c, d] = md5(bytes);
    [a, b, c, d]
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

const MD5_SHIFTS: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

const MD5_K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee,
    0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be,
    0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa,
    0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed,
    0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c,
    0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05,
    0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039,
    0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1,
    0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

fn md5(bytes: &[u8]) -> [u32; 4] {
    let bit_len = (bytes.len() as u64).wrapping_mul(8);
    let mut padded = bytes.to_vec();
    padded.push(0x80);
    while padded.len() % 64 != 56 {
        padded.push(0);
    }
    padded.extend_from_slice(&bit_len.to_le_bytes());

    let mut a0 = 0x67452301u32;
    let mut b0 = 0xefcdab89u32;
    let mut c0 = 0x98badcfeu32;
    let mut d0 = 0x10325476u32;

    for chunk in padded.chunks_exact(64) {
        let words = bytes_to_words32(chunk);
        let (mut a, mut b, mut c, mut d) = (a0, b0, c0, d0);

        for i in 0..64 {
            let (f, g) = match i {
                0..=15 => ((b & c) | (!b & d), i),
                16..=31 => ((d & b) | (!d & c), (5 * i + 1) % 16),
                32..=47 => (b ^ c ^ d, (3 * i + 5) % 16),
                _ => (c ^ (b | !d), (7 * i) % 16),
            };
            let f = add32(add32(add32(f, a), MD5_K[i]), words[g]);
            a = d;
            d = c;
            c = b;
            b = add32(b, rol32(f, MD5_SHIFTS[i]));
        }

        a0 = add32(a0, a);
        b0 = add32(b0, b);
        c0 = add32(c0, c);
        d0 = add32(d0, d);
    }

    [a0, b0, c0, d0]
}

fn add32(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

fn rol32(a: u32, count: u32) -> u32 {
    a.rotate_left(count)
}

/// Little endian words of a 64 byte block.
fn bytes_to_words32(block: &[u8]) -> [u32; 16] {
    let mut words = [0u32; 16];
    for (word, bytes) in words.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    words
}
