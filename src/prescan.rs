//! Structural pre-scanner.
//!
//! A single linear sweep that records the byte offset of every structural
//! byte (`{ } ; " # ( ) = / \n \`) plus a bitmap of which bytes fall inside a
//! quoted or raw string literal. [`Lexer`](crate::lexer::Lexer) can consult
//! this index (when built with [`Strategy::StructuralIndex`](crate::parser::Strategy))
//! to jump straight to the next structural byte instead of scanning string
//! bodies one character at a time.
//!
//! The scanner is conservative: anything that would require it to fully
//! understand escape sequences or nested comments (which only the tokenizer
//! does) makes it bail out with [`None`] rather than guess: the contract is
//! that with or without the index, tokenization produces an identical
//! stream of tokens.

use alloc::vec::Vec;

/// The result of a successful structural pre-scan.
#[derive(Debug, Clone, Default)]
pub struct StructuralIndex {
    /// Byte offsets of every structural byte, in ascending order.
    pub offsets: Vec<u32>,
    /// One bit per byte of the source: set when that byte lies inside a
    /// quoted or raw string literal's body (not counting the delimiters).
    in_string: Vec<bool>,
}

impl StructuralIndex {
    /// True if the byte at `offset` lies inside a string literal's body.
    pub fn in_string(&self, offset: usize) -> bool {
        self.in_string.get(offset).copied().unwrap_or(false)
    }
}

/// Attempt a structural pre-scan of `source`. Returns `None` ("scan failed")
/// on anything the fast scanner doesn't model precisely enough to trust;
/// callers fall back to the scalar tokenizer path in that case.
pub fn scan(source: &str) -> Option<StructuralIndex> {
    let bytes = source.as_bytes();
    let mut offsets = Vec::new();
    let mut in_string = alloc::vec![false; bytes.len()];

    let mut i = 0;
    let mut depth_quote = false;
    let mut hash_run = 0usize;
    let mut raw_hash_count: Option<usize> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if depth_quote {
            in_string[i] = true;
            if b == b'\\' && raw_hash_count.is_none() {
                // Escape: skip the next byte too, so we never misread an
                // escaped quote as a terminator.
                offsets.push(i as u32);
                i += 1;
                if i < bytes.len() {
                    in_string[i] = true;
                    i += 1;
                }
                continue;
            }
            if b == b'"' {
                let needed = raw_hash_count.unwrap_or(0);
                let mut j = i + 1;
                let mut seen = 0usize;
                while seen < needed && bytes.get(j) == Some(&b'#') {
                    j += 1;
                    seen += 1;
                }
                if seen == needed {
                    offsets.push(i as u32);
                    in_string[i] = false;
                    depth_quote = false;
                    raw_hash_count = None;
                    i = j;
                    continue;
                }
            }
            i += 1;
            continue;
        }

        match b {
            b'#' => {
                hash_run += 1;
                offsets.push(i as u32);
                i += 1;
            }
            b'"' => {
                offsets.push(i as u32);
                if hash_run > 0 {
                    raw_hash_count = Some(hash_run);
                }
                hash_run = 0;
                depth_quote = true;
                i += 1;
            }
            b'{' | b'}' | b';' | b'(' | b')' | b'=' | b'\n' | b'\\' | b'/' => {
                offsets.push(i as u32);
                hash_run = 0;
                i += 1;
            }
            _ => {
                hash_run = 0;
                i += 1;
            }
        }
    }

    if depth_quote {
        // Unterminated string: let the scalar tokenizer produce the proper
        // `UnterminatedString`/`UnterminatedRawString` error with full context.
        crate::debug!("structural pre-scan bailed out: unterminated string, falling back to scalar tokenizer");
        return None;
    }

    Some(StructuralIndex { offsets, in_string })
}
