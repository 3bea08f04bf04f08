//! Charset reinterpretation of engine strings.
//!
//! Archive formats without a reliable encoding flag store names and comments
//! as raw bytes. The engine hands such strings over with one byte per `char`
//! (all in `U+0000..=U+00FF`), so the caller can decode them once the real
//! charset is known.
//!
//! The check is a heuristic: a string whose characters all fit in one byte is
//! treated as disguised bytes. Genuine Latin-1 text is indistinguishable from
//! that and will be re-decoded too.
//!
//! # Example
//!
//! ```rust
//! use a7zip_core::charset::{self, GB18030};
//!
//! // "我是注释" in GB18030, one char per byte.
//! let disguised: String = [0xCEu8, 0xD2, 0xCA, 0xC7, 0xD7, 0xA2, 0xCA, 0xCD]
//!     .iter()
//!     .map(|&b| b as char)
//!     .collect();
//! assert_eq!(charset::reinterpret(&disguised, Some(GB18030)), "我是注释");
//! ```

use std::borrow::Cow;

pub use encoding_rs::{Encoding, GB18030, SHIFT_JIS, UTF_8, WINDOWS_1252};

/// A charset used to decode disguised bytes.
pub type Charset = &'static Encoding;

/// Look up a charset by its WHATWG label, e.g. `"gbk"` or `"shift_jis"`.
pub fn for_label(label: &str) -> Option<Charset> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Returns the raw bytes if every char of `value` fits in one byte.
pub fn disguised_bytes(value: &str) -> Option<Vec<u8>> {
    value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

/// Turn raw bytes into a string with one char per byte.
pub fn disguise(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Re-decode `value` under `charset` if it looks like disguised bytes.
///
/// Returns `value` unchanged when no charset is given or when any char is
/// above `U+00FF`. A byte order mark is kept as `U+FEFF`.
pub fn reinterpret(value: &str, charset: Option<Charset>) -> Cow<'_, str> {
    let Some(charset) = charset else {
        return Cow::Borrowed(value);
    };
    let Some(bytes) = disguised_bytes(value) else {
        return Cow::Borrowed(value);
    };
    let (decoded, _had_errors) = charset.decode_without_bom_handling(&bytes);
    Cow::Owned(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gb18030_disguised(text: &str) -> String {
        let (bytes, _, _) = GB18030.encode(text);
        disguise(&bytes)
    }

    #[test]
    fn test_no_charset_is_identity() {
        assert_eq!(reinterpret("caf\u{e9}", None), "caf\u{e9}");
    }

    #[test]
    fn test_wide_chars_are_identity() {
        let value = "\u{1F923}测试.txt";
        assert!(matches!(reinterpret(value, Some(GB18030)), Cow::Borrowed(_)));
        assert_eq!(reinterpret(value, Some(GB18030)), value);
    }

    #[test]
    fn test_gb18030() {
        let disguised = gb18030_disguised("新建文本文档.txt");
        assert_eq!(reinterpret(&disguised, Some(GB18030)), "新建文本文档.txt");
    }

    #[test]
    fn test_utf8_keeps_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("我是注释".as_bytes());
        let disguised = disguise(&bytes);
        assert_eq!(reinterpret(&disguised, Some(UTF_8)), "\u{FEFF}我是注释");
    }

    #[test]
    fn test_ascii_roundtrips() {
        assert_eq!(reinterpret("dump.txt", Some(GB18030)), "dump.txt");
    }

    #[test]
    fn test_for_label() {
        assert_eq!(for_label("GB18030"), Some(GB18030));
        assert_eq!(for_label(" utf-8 "), Some(UTF_8));
        assert_eq!(for_label("no-such-charset"), None);
    }
}
