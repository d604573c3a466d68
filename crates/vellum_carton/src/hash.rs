//! xxHash3 fingerprints of generated text.
//!
//! Two passes over the same document must yield the same virtual code, so
//! comparing fingerprints is enough to skip re-publishing unchanged output.

use xxhash_rust::xxh3::xxh3_64;

/// 64-bit fingerprint of `text`.
#[inline]
pub fn fingerprint(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

/// Fingerprint of `text` as 16 lowercase hex digits.
#[inline]
pub fn content_hash(text: &str) -> String {
    format!("{:016x}", fingerprint(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let code = "const __VLS_ctx = {};";
        assert_eq!(fingerprint(code), fingerprint(code));
        assert_ne!(fingerprint("__VLS_Slots"), fingerprint("__VLS_RootEl"));
    }

    #[test]
    fn test_content_hash_is_hex() {
        let hex = content_hash("type __VLS_RootEl = any;");
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(content_hash(""), format!("{:016x}", fingerprint("")));
    }

    #[test]
    fn test_blank_keeps_offsets() {
        let text = "<!-- x -->a";
        let blanked = format!("{}{}", crate::blank(10), &text[10..]);
        assert_eq!(blanked.len(), text.len());
        assert_eq!(blanked.find('a'), text.find('a'));
    }
}
