//! String interning for symbol atoms.
//!
//! Board files repeat the same handful of tags (`segment`, `layer`, net
//! names, ...) tens of thousands of times. The interner stores each distinct
//! string once in an append-only buffer and hands out small copyable handles
//! that compare in O(1) and work as map keys.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

/// Handle to an interned string. Two handles are equal iff their contents
/// are byte-equal and they come from the same [`Interner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Advises the interner how large its backing buffer should become when it
/// must grow; receives the current buffer length in bytes and returns the
/// desired total capacity.
pub type ProvisioningPolicy = fn(usize) -> usize;

/// Per-step growth ceiling of [`default_provisioning_policy`], in bytes.
pub const DEFAULT_GROWTH_CAP: usize = 1 << 20;

/// Doubling with a cap: small buffers double, large buffers grow by at most
/// [`DEFAULT_GROWTH_CAP`] per step.
pub fn default_provisioning_policy(current: usize) -> usize {
    current
        .saturating_mul(2)
        .clamp(4096, current.saturating_add(DEFAULT_GROWTH_CAP))
}

pub struct Interner {
    buf: String,
    spans: Vec<(u32, u32)>,
    table: FxHashMap<u64, Vec<Symbol>>,
    policy: ProvisioningPolicy,
}

impl Default for Interner {
    fn default() -> Self {
        Self {
            buf: String::new(),
            spans: Vec::new(),
            table: FxHashMap::default(),
            policy: default_provisioning_policy,
        }
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the growth advisor used when the backing buffer fills up.
    pub fn set_provisioning_policy(&mut self, policy: ProvisioningPolicy) {
        self.policy = policy;
    }

    /// Interns `text`, returning the existing handle when an equal string
    /// was interned before. Amortized O(1).
    pub fn intern(&mut self, text: &str) -> Symbol {
        let hash = hash_str(text);
        if let Some(candidates) = self.table.get(&hash) {
            for &sym in candidates {
                if self.resolve(sym) == text {
                    return sym;
                }
            }
        }

        if self.buf.len() + text.len() > self.buf.capacity() {
            let target = (self.policy)(self.buf.len()).max(self.buf.len() + text.len());
            self.buf.reserve(target - self.buf.len());
        }

        let start = self.buf.len() as u32;
        self.buf.push_str(text);
        let sym = Symbol(self.spans.len() as u32);
        self.spans.push((start, start + text.len() as u32));
        self.table.entry(hash).or_default().push(sym);
        sym
    }

    /// Looks up a previously interned string without inserting it.
    pub fn get(&self, text: &str) -> Option<Symbol> {
        let candidates = self.table.get(&hash_str(text))?;
        candidates
            .iter()
            .copied()
            .find(|&sym| self.resolve(sym) == text)
    }

    /// Returns the contents of `sym`. O(1).
    pub fn resolve(&self, sym: Symbol) -> &str {
        let (start, end) = self.spans[sym.index()];
        &self.buf[start as usize..end as usize]
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn hash_str(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}
