use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use crate::bigram::{bigrams_of, Bigram};

/// Behavioural contract shared by every bigram profile representation.
///
/// A profile is a multiset of [`Bigram`]s summarising a string (or a union
/// of such multisets). Implementations differ in storage only; they must
/// agree on cardinality, union, intersection cardinality and the
/// Sørensen–Dice coefficient for the same inputs.
pub trait BigramSet: Clone + Default {
    /// Profile of all adjacent character pairs of `text`.
    ///
    /// A text of `n >= 2` characters produces a profile of cardinality
    /// `n - 1`; shorter texts produce an empty profile.
    #[must_use]
    fn from_text(text: &str) -> Self;

    /// Multiset cardinality (sum of per-bigram counts).
    #[must_use]
    fn len(&self) -> usize;

    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-place multiset union: adds all of `other`'s bigrams with their
    /// multiplicities, so `self.len()` grows by `other.len()`.
    fn merge(&mut self, other: &Self);

    /// Union as a fresh profile.
    #[must_use]
    fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Union of arbitrarily many profiles.
    ///
    /// A left fold of [`merge`](Self::merge); union is commutative and
    /// associative, so the traversal order does not matter.
    #[must_use]
    fn unite<'a, I>(sets: I) -> Self
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        let mut result = Self::default();
        for set in sets {
            result.merge(set);
        }
        result
    }

    /// Intersection cardinality: `Σ min(count_a(b), count_b(b))` over all
    /// bigrams `b`. The intersection itself is never materialised.
    #[must_use]
    fn intersect_len(a: &Self, b: &Self) -> usize;

    /// Sørensen–Dice coefficient: `2·|a ∩ b| / (|a| + |b|)` when the
    /// intersection is non-empty, else 0 (which also covers either profile
    /// being empty). Always within `[0, 1]`.
    #[must_use]
    fn sorensen_dice_coef(a: &Self, b: &Self) -> f64 {
        let isect = Self::intersect_len(a, b);
        if isect == 0 {
            0.0
        } else {
            2.0 * isect as f64 / (a.len() + b.len()) as f64
        }
    }
}

/// Counted bigram profile: strictly ascending `(bigram, count)` runs.
///
/// The compact default representation. Token profiles are tiny (a token of
/// `n` characters has at most `n - 1` runs), so the runs live inline until
/// unions outgrow the buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bigrams {
    runs: SmallVec<[(Bigram, usize); 8]>,
    size: usize,
}

impl Bigrams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for [`BigramSet::from_text`].
    #[must_use]
    pub fn of(text: &str) -> Self {
        <Self as BigramSet>::from_text(text)
    }

    /// Distinct bigrams with their counts, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (Bigram, usize)> + '_ {
        self.runs.iter().copied()
    }

    /// Number of distinct bigrams.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub(crate) fn run(&self, index: usize) -> Option<(Bigram, usize)> {
        self.runs.get(index).copied()
    }
}

impl<'a> IntoIterator for &'a Bigrams {
    type Item = (Bigram, usize);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (Bigram, usize)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter().copied()
    }
}

impl BigramSet for Bigrams {
    fn from_text(text: &str) -> Self {
        let mut raw: SmallVec<[Bigram; 16]> =
            SmallVec::with_capacity(text.len().saturating_sub(1));
        raw.extend(bigrams_of(text));
        if raw.is_empty() {
            return Self::default();
        }
        raw.sort_unstable();

        let mut runs: SmallVec<[(Bigram, usize); 8]> = SmallVec::new();
        for bigram in raw.iter().copied() {
            match runs.last_mut() {
                Some((last, count)) if *last == bigram => *count += 1,
                _ => runs.push((bigram, 1)),
            }
        }
        Self {
            runs,
            size: raw.len(),
        }
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

        let mut merged: SmallVec<[(Bigram, usize); 8]> =
            SmallVec::with_capacity(self.runs.len() + other.runs.len());
        let (mut l, mut r) = (0, 0);
        while l < self.runs.len() && r < other.runs.len() {
            let (lhs, lhs_count) = self.runs[l];
            let (rhs, rhs_count) = other.runs[r];
            match lhs.cmp(&rhs) {
                Ordering::Less => {
                    merged.push((lhs, lhs_count));
                    l += 1;
                }
                Ordering::Greater => {
                    merged.push((rhs, rhs_count));
                    r += 1;
                }
                Ordering::Equal => {
                    merged.push((lhs, lhs_count + rhs_count));
                    l += 1;
                    r += 1;
                }
            }
        }
        merged.extend_from_slice(&self.runs[l..]);
        merged.extend_from_slice(&other.runs[r..]);

        self.runs = merged;
        self.size += other.size;
    }

    fn intersect_len(a: &Self, b: &Self) -> usize {
        let mut size = 0;
        let (mut l, mut r) = (0, 0);
        while l < a.runs.len() && r < b.runs.len() {
            let (lhs, lhs_count) = a.runs[l];
            let (rhs, rhs_count) = b.runs[r];
            match lhs.cmp(&rhs) {
                Ordering::Less => l += 1,
                Ordering::Greater => r += 1,
                Ordering::Equal => {
                    size += lhs_count.min(rhs_count);
                    l += 1;
                    r += 1;
                }
            }
        }
        size
    }
}

impl fmt::Display for Bigrams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bigrams(size: {}, {{", self.size)?;
        let mut separator = "";
        for (bigram, count) in &self.runs {
            write!(f, "{separator}{bigram}: {count}")?;
            separator = ", ";
        }
        write!(f, "}})")
    }
}
