//! Content Fingerprint (C2) — hashing for change detection and dedup.
//!
//! Pure, allocation-light functions; no I/O, no provider trait. Any
//! collision-resistant 256-bit digest satisfies the spec, so plain
//! `sha2::Sha256` is used directly rather than behind an abstraction.

use sha2::{Digest, Sha256};

/// Collapse runs of whitespace to a single space and trim the ends, so that
/// formatting-only differences (trailing newline, re-indentation of a whole
/// block) don't change the fingerprint.
fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = true; // true so leading whitespace is dropped
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn hex_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Document fingerprint: hex digest of whitespace-normalized markdown.
/// Used to decide whether an already-known URL needs re-processing
/// (§4.2, §4.5 step 2d).
#[must_use]
pub fn document_fingerprint(markdown_content: &str) -> String {
    hex_sha256(normalize_whitespace(markdown_content).as_bytes())
}

/// Snippet fingerprint: hex digest of the code after trimming leading and
/// trailing whitespace. Deliberately does *not* fold in the language, so
/// identical code under two declared languages still collides within one
/// document (§4.2).
#[must_use]
pub fn snippet_fingerprint(code: &str) -> String {
    hex_sha256(code.trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_code_same_hash_regardless_of_surrounding_whitespace() {
        let a = snippet_fingerprint("print(1)\n");
        let b = snippet_fingerprint("  print(1)  ");
        assert_eq!(a, b);
    }

    #[test]
    fn different_code_different_hash() {
        assert_ne!(snippet_fingerprint("print(1)"), snippet_fingerprint("print(2)"));
    }

    #[test]
    fn document_fingerprint_ignores_whitespace_formatting_changes() {
        let a = document_fingerprint("# Title\n\nSome   text.\n");
        let b = document_fingerprint("# Title\nSome text.");
        assert_eq!(a, b);
    }

    #[test]
    fn document_fingerprint_changes_on_real_edits() {
        let a = document_fingerprint("# Title\n\nSome text.\n");
        let b = document_fingerprint("# Title\n\nOther text.\n");
        assert_ne!(a, b);
    }

    #[test]
    fn hex_output_is_lowercase_hex() {
        let digest = snippet_fingerprint("x");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
