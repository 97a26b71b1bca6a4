use std::fmt;

use rustc_hash::FxHashSet;

use crate::bigrams::{BigramSet, Bigrams};
use crate::matches::Matches;

#[allow(unused_macros)]
#[cfg(test)]
macro_rules! trace {
    ($($arg:tt)*) => { println!($($arg)*); };
}
#[allow(unused_macros)]
#[cfg(not(test))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Lazily materialised profile of one contiguous token window.
///
/// A cell only ever moves forward: `Empty` to `SizeOnly` to `Full` (or
/// straight to `Full`); the stored profile is never replaced.
pub(crate) enum Cell<B> {
    Empty,
    SizeOnly(usize),
    Full(B),
}

/// Split window `(i, j)` into the two adjacent sub-windows whose union it
/// is: `i / 2 + 1` tokens on the left, the remaining tokens on the right.
const fn split(i: usize, j: usize) -> ((usize, usize), (usize, usize)) {
    let i1 = i / 2;
    let i2 = i - i1 - 1;
    ((i1, j), (i2, j + i1 + 1))
}

/// Fuzzy phrase matcher over a sequence of pre-split tokens.
///
/// The matcher keeps an upper-triangular matrix over the token sequence:
/// cell `(i, j)` stands for the window of `i + 1` consecutive tokens
/// starting at `j` and caches that window's bigram profile, or just the
/// profile's cardinality. Row 0 holds the per-token profiles supplied at
/// append time; any other cell is the union of two adjacent sub-windows
/// (half the tokens rounded down on the left, the rest on the right),
/// computed on demand and memoised.
///
/// Windows are scored against a query profile with the Sørensen–Dice
/// coefficient. Since `SDC(a, b) <= 2·min(|a|,|b|) / (|a| + |b|)`, a score
/// threshold `t` forces `max(|a|,|b|) / min(|a|,|b|) <= 2/t - 1` for any
/// viable match, and window cardinalities are available without building
/// profiles. Enumeration therefore checks the cardinality ratio first and
/// touches actual profiles only for windows that can still reach the
/// threshold; once a window overshoots the ratio on the long side, its
/// start index is abandoned altogether, as extension only grows it further.
///
/// Tokens flagged as *strip* (typically whitespace and punctuation) may sit
/// inside a match but never start or end one.
pub struct SequenceMatcher<B: BigramSet = Bigrams> {
    /// Upper-triangular matrix; `rows[i][j]` covers tokens `j ..= j + i`.
    rows: Vec<Vec<Cell<B>>>,
    /// Token indices that may not begin or end a reported match.
    strip: FxHashSet<usize>,
}

impl<B: BigramSet> SequenceMatcher<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            strip: FxHashSet::default(),
        }
    }

    /// Hint that `tokens` more tokens will be appended.
    ///
    /// Purely an allocation hint; observable behaviour is unchanged.
    pub fn reserve(&mut self, tokens: usize) {
        self.rows.reserve(tokens);
        self.strip.reserve(tokens);
    }

    /// Number of tokens appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extend the matrix for one more token: a new row, and later one new
    /// cell per existing row (done by the caller).
    fn add_row(&mut self) {
        let back = self.rows.len();
        self.rows.push(Vec::new());
        let capacity = self.rows.capacity();
        if capacity > back {
            // Rows narrow as they go down; grant the new row the width it
            // would need if the reserved sequence length is reached.
            self.rows[back].reserve(capacity - back);
        }
    }

    /// Append a pre-built token profile.
    ///
    /// A `strip` token may not begin or end any reported match. Token
    /// indices are assigned in append order and stay stable for the
    /// matcher's lifetime.
    pub fn push(&mut self, bigrams: B, strip: bool) {
        if strip {
            self.strip.insert(self.len());
        }
        self.add_row();
        self.rows[0].push(Cell::Full(bigrams));
        for row in &mut self.rows[1..] {
            row.push(Cell::Empty);
        }
    }

    /// Append a token given as text; equivalent to
    /// `push(B::from_text(text), strip)`.
    pub fn push_text(&mut self, text: &str, strip: bool) {
        self.push(B::from_text(text), strip);
    }

    /// Begin lazy enumeration of all contiguous token windows whose profile
    /// scores at least `threshold` against `query`, ascending by
    /// `(begin, length)`.
    ///
    /// The iterator borrows the matcher exclusively: enumeration fills the
    /// cell cache in place, and the sequence must not change mid-scan.
    ///
    /// # Panics
    ///
    /// Panics unless `threshold > 0`. Thresholds above 1 are accepted and
    /// match nothing, as the coefficient never exceeds 1.
    #[must_use]
    pub fn matches<'q>(&mut self, query: &'q B, threshold: f64) -> Matches<'_, 'q, B> {
        Matches::new(self, query, threshold)
    }

    pub(crate) fn is_strip(&self, index: usize) -> bool {
        self.strip.contains(&index)
    }

    /// Cardinality of the window profile at `(i, j)`, memoised.
    ///
    /// Never materialises a profile: unknown sizes are derived from the
    /// recursive split and stored as `SizeOnly`.
    pub(crate) fn union_len(&mut self, i: usize, j: usize) -> usize {
        match &self.rows[i][j] {
            Cell::SizeOnly(size) => *size,
            Cell::Full(bigrams) => bigrams.len(),
            Cell::Empty => {
                let ((i1, j1), (i2, j2)) = split(i, j);
                let size = self.union_len(i1, j1) + self.union_len(i2, j2);
                self.rows[i][j] = Cell::SizeOnly(size);
                size
            }
        }
    }

    /// Window profile at `(i, j)`, memoised; upgrades a size-only cell.
    pub(crate) fn union_bigrams(&mut self, i: usize, j: usize) -> &B {
        if !matches!(self.rows[i][j], Cell::Full(_)) {
            let ((i1, j1), (i2, j2)) = split(i, j);
            let mut union = self.union_bigrams(i1, j1).clone();
            let right = self.union_bigrams(i2, j2);
            union.merge(right);
            self.rows[i][j] = Cell::Full(union);
        }
        match &self.rows[i][j] {
            Cell::Full(bigrams) => bigrams,
            _ => unreachable!("cell was just materialised"),
        }
    }

    /// Scan forward from `(i, j)` for the next window whose SDC against
    /// `query` reaches `threshold`.
    ///
    /// Leaves the cursor on the match and returns its score, or exhausts at
    /// `(0, len)` and returns `None`. The caller guarantees a non-empty
    /// query; a cardinality ratio against an empty profile has no meaning.
    pub(crate) fn seek(
        &mut self,
        query: &B,
        threshold: f64,
        ratio_bound: f64,
        i: &mut usize,
        j: &mut usize,
    ) -> Option<f64> {
        let query_len = query.len();
        while *j < self.len() {
            // Windows may not start on a strip token...
            if !self.is_strip(*j) {
                while *i < self.len() - *j {
                    // ...nor end on one
                    if self.is_strip(*j + *i) {
                        *i += 1;
                        continue;
                    }

                    let window_len = self.union_len(*i, *j);
                    let mut ratio = window_len as f64 / query_len as f64;
                    let window_short = ratio < 1.0;
                    if window_short {
                        ratio = ratio.recip();
                    }

                    if ratio > ratio_bound {
                        trace!(
                            "  prune ({i}, {j}): |window| = {window_len}, ratio {ratio:.3} > {ratio_bound:.3}"
                        );
                        if window_short {
                            // A longer window may still qualify
                            *i += 1;
                            continue;
                        }
                        // Extending only inflates the ratio further
                        break;
                    }

                    let sdc = B::sorensen_dice_coef(self.union_bigrams(*i, *j), query);
                    trace!("  score ({i}, {j}): SDC = {sdc:.3}");
                    if sdc >= threshold {
                        return Some(sdc);
                    }
                    *i += 1;
                }
            }
            *i = 0;
            *j += 1;
        }
        None
    }
}

impl<B: BigramSet> Default for SequenceMatcher<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BigramSet> fmt::Debug for SequenceMatcher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceMatcher")
            .field("len", &self.len())
            .field("strip", &self.strip)
            .finish_non_exhaustive()
    }
}
