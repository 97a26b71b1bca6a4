use std::cmp::Ordering;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::bigram::{bigrams_of, Bigram};
use crate::bigrams::BigramSet;

/// Ordered bigram bag: one element per occurrence, kept sorted.
///
/// Heavier than the counted [`Bigrams`](crate::Bigrams) form but with the
/// simplest possible semantics; intersection cardinality falls out of plain
/// sorted-sequence intersection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BigramMultiset {
    items: Vec<Bigram>,
}

impl BigramMultiset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for [`BigramSet::from_text`].
    #[must_use]
    pub fn of(text: &str) -> Self {
        <Self as BigramSet>::from_text(text)
    }

    /// Every bigram occurrence, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = Bigram> + '_ {
        self.items.iter().copied()
    }
}

impl<'a> IntoIterator for &'a BigramMultiset {
    type Item = Bigram;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Bigram>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter().copied()
    }
}

impl BigramSet for BigramMultiset {
    fn from_text(text: &str) -> Self {
        let mut items: Vec<Bigram> = Vec::with_capacity(text.len().saturating_sub(1));
        items.extend(bigrams_of(text));
        items.sort_unstable();
        Self { items }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn merge(&mut self, other: &Self) {
        if other.items.is_empty() {
            return;
        }
        if self.items.is_empty() {
            *self = other.clone();
            return;
        }

        let mut merged = Vec::with_capacity(self.items.len() + other.items.len());
        let (mut l, mut r) = (0, 0);
        while l < self.items.len() && r < other.items.len() {
            if self.items[l] <= other.items[r] {
                merged.push(self.items[l]);
                l += 1;
            } else {
                merged.push(other.items[r]);
                r += 1;
            }
        }
        merged.extend_from_slice(&self.items[l..]);
        merged.extend_from_slice(&other.items[r..]);
        self.items = merged;
    }

    fn intersect_len(a: &Self, b: &Self) -> usize {
        let mut size = 0;
        let (mut l, mut r) = (0, 0);
        while l < a.items.len() && r < b.items.len() {
            match a.items[l].cmp(&b.items[r]) {
                Ordering::Less => l += 1,
                Ordering::Greater => r += 1,
                Ordering::Equal => {
                    size += 1;
                    l += 1;
                    r += 1;
                }
            }
        }
        size
    }
}

impl fmt::Display for BigramMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bigram_multiset(size: {}, {{", self.items.len())?;
        let mut separator = "";
        for bigram in &self.items {
            write!(f, "{separator}{bigram}")?;
            separator = ", ";
        }
        write!(f, "}})")
    }
}

/// Hashed bigram bag: per-bigram occurrence counts keyed by the packed
/// bigram value (see [`Bigram::packed`]).
///
/// Iteration and rendering order are unspecified; everything else agrees
/// with the ordered representations.
#[derive(Clone, Debug, Default)]
pub struct UnorderedBigramMultiset {
    counts: FxHashMap<Bigram, usize>,
    size: usize,
}

impl UnorderedBigramMultiset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for [`BigramSet::from_text`].
    #[must_use]
    pub fn of(text: &str) -> Self {
        <Self as BigramSet>::from_text(text)
    }

    /// Distinct bigrams with their counts, in unspecified order.
    #[must_use]
    pub fn iter(&self) -> UnorderedIter<'_> {
        UnorderedIter {
            inner: self.counts.iter(),
        }
    }
}

/// Iterator over the distinct bigram counts of an
/// [`UnorderedBigramMultiset`].
pub struct UnorderedIter<'a> {
    inner: std::collections::hash_map::Iter<'a, Bigram, usize>,
}

impl Iterator for UnorderedIter<'_> {
    type Item = (Bigram, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&bigram, &count)| (bigram, count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a UnorderedBigramMultiset {
    type Item = (Bigram, usize);
    type IntoIter = UnorderedIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for UnorderedBigramMultiset {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl Eq for UnorderedBigramMultiset {}

impl BigramSet for UnorderedBigramMultiset {
    fn from_text(text: &str) -> Self {
        let mut counts = FxHashMap::default();
        let mut size = 0;
        for bigram in bigrams_of(text) {
            *counts.entry(bigram).or_insert(0) += 1;
            size += 1;
        }
        Self { counts, size }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn merge(&mut self, other: &Self) {
        if other.size == 0 {
            return;
        }
        if self.size == 0 {
            *self = other.clone();
            return;
        }

        for (&bigram, &count) in &other.counts {
            *self.counts.entry(bigram).or_insert(0) += count;
        }
        self.size += other.size;
    }

    fn intersect_len(a: &Self, b: &Self) -> usize {
        // Walk the smaller map, probe the larger one
        let (small, large) = if a.counts.len() <= b.counts.len() {
            (a, b)
        } else {
            (b, a)
        };
        small
            .counts
            .iter()
            .filter_map(|(bigram, &count)| large.counts.get(bigram).map(|&c| count.min(c)))
            .sum()
    }
}

impl fmt::Display for UnorderedBigramMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unordered_bigram_multiset(size: {}, {{", self.size)?;
        let mut separator = "";
        for (bigram, count) in &self.counts {
            for _ in 0..*count {
                write!(f, "{separator}{bigram}")?;
                separator = ", ";
            }
        }
        write!(f, "}})")
    }
}
