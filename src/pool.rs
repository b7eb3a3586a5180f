//! Append-only string arena with content-hash interning.

use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};
use rustc_hash::{FxHashMap, FxHasher};

/// Opaque handle to an interned or source-borrowed string.
///
/// The high bit of the packed representation discriminates pool-backed
/// refs from source-backed ones. Never
/// construct this directly; obtain one from [`StringPool::intern`] or
/// [`StringRef::borrowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef {
    offset: u32,
    len: u32,
    origin: Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Origin {
    Pool,
    Source,
}

impl StringRef {
    /// A ref into the original source buffer (zero-copy mode).
    pub const fn borrowed(offset: u32, len: u32) -> Self {
        StringRef {
            offset,
            len,
            origin: Origin::Source,
        }
    }

    const fn pooled(offset: u32, len: u32) -> Self {
        StringRef {
            offset,
            len,
            origin: Origin::Pool,
        }
    }

    /// True if this ref addresses the string pool rather than the source buffer.
    pub const fn is_pooled(&self) -> bool {
        matches!(self.origin, Origin::Pool)
    }

    /// Resolve this ref to its string content, given the pool and the
    /// original source buffer it was created against.
    pub fn resolve<'a>(&self, pool: &'a StringPool, source: &'a str) -> &'a str {
        let buf = match self.origin {
            Origin::Pool => pool.arena.as_str(),
            Origin::Source => source,
        };
        &buf[self.offset as usize..(self.offset as usize + self.len as usize)]
    }
}

/// Append-only byte arena mapping interned string content to `StringRef` handles.
///
/// Interning is content-addressed: interning the same text twice returns
/// the same `StringRef`, so the pool never grows for duplicate node names,
/// property keys, or repeated string arguments.
#[derive(Debug, Default)]
pub struct StringPool {
    arena: String,
    index: FxHashMap<u64, Vec<StringRef>>,
}

impl StringPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        StringPool {
            arena: String::new(),
            index: FxHashMap::default(),
        }
    }

    fn hash_of(s: &str) -> u64 {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern `s`, returning a pool-backed `StringRef`. Returns an existing
    /// ref if this exact content was already interned.
    pub fn intern(&mut self, s: &str) -> StringRef {
        let hash = Self::hash_of(s);
        if let Some(candidates) = self.index.get(&hash) {
            for &candidate in candidates {
                if candidate.resolve(self, s) == s {
                    return candidate;
                }
            }
        }
        let offset = self.arena.len() as u32;
        self.arena.push_str(s);
        let r = StringRef::pooled(offset, s.len() as u32);
        self.index.entry(hash).or_default().push(r);
        r
    }

    /// Number of bytes currently stored in the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Direct access to the underlying arena text (used by the merger when
    /// rewriting refs from one pool into another).
    pub fn as_str(&self) -> &str {
        &self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_dedups_identical_content() {
        let mut pool = StringPool::new();
        let a = pool.intern("hello");
        let b = pool.intern("hello");
        assert_eq!(a, b);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn intern_distinguishes_different_content() {
        let mut pool = StringPool::new();
        let a = pool.intern("hello");
        let b = pool.intern("world");
        assert_ne!(a, b);
        assert_eq!(a.resolve(&pool, ""), "hello");
        assert_eq!(b.resolve(&pool, ""), "world");
    }

    #[test]
    fn borrowed_ref_resolves_against_source() {
        let pool = StringPool::new();
        let source = "node argument";
        let r = StringRef::borrowed(5, 8);
        assert_eq!(r.resolve(&pool, source), "argument");
        assert!(!r.is_pooled());
    }

    #[test]
    fn hash_collision_falls_back_to_content_compare() {
        // Even with a degenerate hasher the linear scan inside the bucket
        // must still disambiguate different strings.
        let mut pool = StringPool::new();
        let refs: Vec<_> = (0..50).map(|i| pool.intern(&alloc::format!("k{i}"))).collect();
        for (i, r) in refs.iter().enumerate() {
            assert_eq!(r.resolve(&pool, ""), alloc::format!("k{i}"));
        }
    }
}
