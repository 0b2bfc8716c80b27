//! Legacy code page text handling.
//!
//! Every text-bearing DBF cell is stored in a single-byte (or UTF-8) code
//! page chosen by whoever wrote the file. The header carries at best an
//! advisory hint, so the caller names the code page explicitly and the
//! codec threads a resolved [`CodePage`] through every decode and encode.
//!
//! Decoding never fails: malformed input yields replacement characters and
//! an unknown code page degrades to a byte-for-byte pass-through.

use std::fmt;

use encoding_rs::{EncoderResult, Encoding};
use tracing::warn;

/// Code page labels offered to users, in display order.
pub const SUPPORTED_CODE_PAGES: &[&str] = &[
    "utf-8",
    "windows-1251",
    "windows-1252",
    "windows-1256",
    "koi8-r",
    "koi8-u",
    "iso-8859-1",
    "cp866",
    "ibm866",
    "cp1251",
    "cp1252",
];

/// Candidate order used when guessing the code page of unknown bytes.
pub const DEFAULT_DETECTION_ORDER: &[&str] =
    &["utf-8", "windows-1251", "windows-1252", "iso-8859-1"];

/// Replacement byte for characters the target code page cannot represent.
const UNMAPPABLE: u8 = b'?';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mapping {
    Encoding(&'static Encoding),
    /// Exact ISO-8859-1: byte value == code point.
    Latin1,
    /// Unknown label: bytes become Latin-1 chars, text becomes UTF-8 bytes.
    Passthrough,
}

/// A resolved code page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePage {
    label: String,
    mapping: Mapping,
}

impl CodePage {
    /// Resolve a code page label such as `windows-1251`, `cp866` or `koi8-u`.
    ///
    /// Labels are matched case-insensitively. Unknown labels resolve to a
    /// pass-through code page (see [`CodePage::is_supported`]).
    pub fn resolve(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase();
        let mapping = match normalized.as_str() {
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" | "cp819" => {
                Mapping::Latin1
            }
            other => match Encoding::for_label_no_replacement(other.as_bytes()) {
                Some(encoding) if is_byte_oriented(encoding) => Mapping::Encoding(encoding),
                _ => {
                    warn!(label = %label, "unsupported code page, passing bytes through");
                    Mapping::Passthrough
                }
            },
        };
        Self {
            label: normalized,
            mapping,
        }
    }

    /// UTF-8.
    #[must_use]
    pub fn utf8() -> Self {
        Self {
            label: "utf-8".to_string(),
            mapping: Mapping::Encoding(encoding_rs::UTF_8),
        }
    }

    /// Leave bytes unchanged: decode byte-per-char, encode as UTF-8.
    #[must_use]
    pub fn passthrough() -> Self {
        Self {
            label: String::new(),
            mapping: Mapping::Passthrough,
        }
    }

    /// Map a DBF language driver id to a code page.
    #[must_use]
    pub fn from_language_driver(id: u8) -> Option<Self> {
        let label = match id {
            0xC9 => "windows-1251",
            0x65 | 0x26 => "cp866",
            0x03 | 0x57 => "windows-1252",
            _ => return None,
        };
        Some(Self::resolve(label))
    }

    /// Language driver id written at header offset 29, if one is known.
    #[must_use]
    pub fn language_driver(&self) -> Option<u8> {
        match self.mapping {
            Mapping::Encoding(encoding) if encoding == encoding_rs::WINDOWS_1251 => Some(0xC9),
            Mapping::Encoding(encoding) if encoding == encoding_rs::IBM866 => Some(0x65),
            _ => None,
        }
    }

    /// The label this code page was resolved from (lowercased).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical name of the underlying mapping.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.mapping {
            Mapping::Encoding(encoding) => encoding.name(),
            Mapping::Latin1 => "ISO-8859-1",
            Mapping::Passthrough => "passthrough",
        }
    }

    /// False when the label was not recognised.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.mapping != Mapping::Passthrough
    }

    /// Decode bytes to text. Malformed sequences become U+FFFD.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.mapping {
            Mapping::Encoding(encoding) => {
                let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
                text.into_owned()
            }
            Mapping::Latin1 | Mapping::Passthrough => decode_latin1(bytes),
        }
    }

    /// Decode bytes, returning `None` if any sequence is malformed.
    #[must_use]
    pub fn decode_strict(&self, bytes: &[u8]) -> Option<String> {
        match self.mapping {
            Mapping::Encoding(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(std::borrow::Cow::into_owned),
            Mapping::Latin1 | Mapping::Passthrough => Some(decode_latin1(bytes)),
        }
    }

    /// Encode text. Characters the code page lacks become `?`.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self.mapping {
            Mapping::Encoding(encoding) if encoding == encoding_rs::UTF_8 => {
                text.as_bytes().to_vec()
            }
            Mapping::Encoding(encoding) => encode_with(encoding, text),
            Mapping::Latin1 => text
                .chars()
                .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(UNMAPPABLE))
                .collect(),
            Mapping::Passthrough => text.as_bytes().to_vec(),
        }
    }

    /// Encode the longest prefix of `text` that fits in `max_bytes`.
    ///
    /// Cuts happen between characters, never inside a multi-byte sequence.
    #[must_use]
    pub fn encode_within(&self, text: &str, max_bytes: usize) -> Vec<u8> {
        let encoded = self.encode(text);
        if encoded.len() <= max_bytes {
            return encoded;
        }

        // Every character takes at least one byte.
        let mut chars: Vec<char> = text.chars().take(max_bytes).collect();
        loop {
            let candidate: String = chars.iter().collect();
            let encoded = self.encode(&candidate);
            if encoded.len() <= max_bytes {
                return encoded;
            }
            chars.pop();
        }
    }
}

impl Default for CodePage {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decode bytes under the named code page.
///
/// Resolves `code_page` on every call; resolve once with
/// [`CodePage::resolve`] when decoding many values.
pub fn decode(bytes: &[u8], code_page: &str) -> String {
    CodePage::resolve(code_page).decode(bytes)
}

/// Encode text under the named code page.
pub fn encode(text: &str, code_page: &str) -> Vec<u8> {
    CodePage::resolve(code_page).encode(text)
}

/// Guess which candidate code page the sample bytes were written in.
///
/// Returns the first candidate that decodes every sample without errors
/// and produces at least one non-ASCII character. Pure ASCII samples read
/// the same under every candidate, so they yield `None`.
pub fn detect_code_page(samples: &[&[u8]], candidates: &[&str]) -> Option<CodePage> {
    if samples.iter().all(|sample| sample.is_ascii()) {
        return None;
    }
    candidates
        .iter()
        .map(|label| CodePage::resolve(label))
        .filter(CodePage::is_supported)
        .find(|code_page| {
            let mut non_ascii = false;
            for sample in samples {
                match code_page.decode_strict(sample) {
                    Some(text) => non_ascii |= !text.is_ascii(),
                    None => return false,
                }
            }
            non_ascii
        })
}

/// UTF-16 and the replacement encoding cannot represent DBF byte fields.
fn is_byte_oriented(encoding: &'static Encoding) -> bool {
    encoding != encoding_rs::UTF_16LE
        && encoding != encoding_rs::UTF_16BE
        && encoding.output_encoding() == encoding
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn encode_with(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let capacity = encoder
        .max_buffer_length_from_utf8_without_replacement(text.len())
        .unwrap_or(text.len());
    let mut out = Vec::with_capacity(capacity);
    let mut remaining = text;

    loop {
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut out, true);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => out.reserve(remaining.len().max(16)),
            EncoderResult::Unmappable(_) => out.push(UNMAPPABLE),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(CodePage::resolve("cp1251").name(), "windows-1251");
        assert_eq!(CodePage::resolve(" Windows-1251 ").name(), "windows-1251");
        assert_eq!(CodePage::resolve("cp866").name(), "IBM866");
        assert_eq!(CodePage::resolve("ibm866").name(), "IBM866");
        assert_eq!(CodePage::resolve("koi8-u").name(), "KOI8-U");
        assert_eq!(CodePage::resolve("KOI8-R").name(), "KOI8-R");
        assert_eq!(CodePage::resolve("windows-1256").name(), "windows-1256");
        assert_eq!(CodePage::resolve("iso-8859-1").name(), "ISO-8859-1");
        assert_eq!(CodePage::resolve("utf-8").name(), "UTF-8");
    }

    #[test]
    fn test_every_offered_label_is_supported() {
        for label in SUPPORTED_CODE_PAGES {
            assert!(CodePage::resolve(label).is_supported(), "{label}");
        }
    }

    #[test]
    fn test_cyrillic_roundtrip() {
        let cp = CodePage::resolve("windows-1251");
        let bytes = cp.encode("Привіт");
        assert_eq!(bytes, vec![0xCF, 0xF0, 0xE8, 0xE2, 0xB3, 0xF2]);
        assert_eq!(cp.decode(&bytes), "Привіт");

        let dos = CodePage::resolve("cp866");
        assert_eq!(dos.encode("Да"), vec![0x84, 0xA0]);
        assert_eq!(dos.decode(&[0x84, 0xA0]), "Да");
    }

    #[test]
    fn test_latin1_is_exact() {
        let cp = CodePage::resolve("latin1");
        assert_eq!(cp.decode(&[0x80, 0xE9]), "\u{80}é");
        assert_eq!(cp.encode("é€"), vec![0xE9, b'?']);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let cp = CodePage::resolve("windows-1251");
        assert_eq!(cp.encode("a中b"), b"a?b".to_vec());
    }

    #[test]
    fn test_encode_within_respects_char_boundaries() {
        let utf8 = CodePage::utf8();
        assert_eq!(utf8.encode_within("Київ", 5), "Ки".as_bytes().to_vec());
        assert_eq!(utf8.encode_within("abc", 10), b"abc".to_vec());

        let cp1251 = CodePage::resolve("windows-1251");
        assert_eq!(cp1251.encode_within("Київ", 3).len(), 3);
    }

    #[test]
    fn test_unknown_label_passes_through() {
        let cp = CodePage::resolve("utf-7");
        assert!(!cp.is_supported());
        assert_eq!(cp.decode(b"abc\xE9"), "abc\u{e9}");
        assert_eq!(cp.encode("abc"), b"abc".to_vec());
        assert_eq!(decode(b"plain", "no-such-page"), "plain");
    }

    #[test]
    fn test_malformed_utf8_is_replaced() {
        let text = CodePage::utf8().decode(&[b'a', 0xFF, b'b']);
        assert_eq!(text, "a\u{FFFD}b");
        assert!(CodePage::utf8().decode_strict(&[0xFF]).is_none());
    }

    #[test]
    fn test_language_driver() {
        assert_eq!(CodePage::resolve("windows-1251").language_driver(), Some(0xC9));
        assert_eq!(CodePage::resolve("cp866").language_driver(), Some(0x65));
        assert_eq!(CodePage::resolve("koi8-r").language_driver(), None);
        assert_eq!(
            CodePage::from_language_driver(0x26).map(|cp| cp.name().to_string()),
            Some("IBM866".to_string())
        );
        assert!(CodePage::from_language_driver(0x00).is_none());
    }

    #[test]
    fn test_detect_code_page() {
        let utf8 = "Київ".as_bytes();
        let detected = detect_code_page(&[utf8], DEFAULT_DETECTION_ORDER).unwrap();
        assert_eq!(detected.name(), "UTF-8");

        let cp1251 = CodePage::resolve("windows-1251").encode("Київ");
        let detected = detect_code_page(&[&cp1251], DEFAULT_DETECTION_ORDER).unwrap();
        assert_eq!(detected.name(), "windows-1251");

        assert!(detect_code_page(&[b"ascii only"], DEFAULT_DETECTION_ORDER).is_none());
    }
}
