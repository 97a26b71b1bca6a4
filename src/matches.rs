use std::fmt;
use std::iter::FusedIterator;

use crate::bigrams::BigramSet;
use crate::matcher::SequenceMatcher;

/// One reported match: a contiguous token window scored against the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Index of the first token of the window.
    pub begin: usize,
    /// Just past the index of the last token of the window.
    pub end: usize,
    /// Sørensen–Dice coefficient of the window profile vs. the query.
    pub sdc: f64,
}

impl Match {
    /// Number of tokens in the window.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Always `false`; a match spans at least one token.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.begin
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "match(begin: {}, end: {}, size: {}, SDC: {})",
            self.begin,
            self.end,
            self.len(),
            self.sdc
        )
    }
}

/// Lazy iterator over matching token windows, ascending by
/// `(begin, length)`.
///
/// Created by [`SequenceMatcher::matches`]. Holds an exclusive borrow of
/// the matcher for its whole life: finding and dereferencing matches fills
/// the matcher's cell cache in place. Advancement resumes right after the
/// previously reported window, so enumeration makes strict forward
/// progress.
pub struct Matches<'m, 'q, B: BigramSet> {
    matcher: &'m mut SequenceMatcher<B>,
    query: &'q B,
    threshold: f64,
    /// `2/threshold - 1`: the largest large-to-small cardinality ratio at
    /// which the SDC can still reach `threshold`.
    ratio_bound: f64,
    i: usize,
    j: usize,
    /// Matrix position of the most recently yielded match.
    current: Option<(usize, usize)>,
}

impl<'m, 'q, B: BigramSet> Matches<'m, 'q, B> {
    pub(crate) fn new(
        matcher: &'m mut SequenceMatcher<B>,
        query: &'q B,
        threshold: f64,
    ) -> Self {
        assert!(threshold > 0.0, "SDC threshold must be positive");
        // An empty query has no meaningful cardinality ratio; it matches
        // nothing.
        let j = if query.is_empty() { matcher.len() } else { 0 };
        Self {
            matcher,
            query,
            threshold,
            ratio_bound: 2.0 / threshold - 1.0,
            i: 0,
            j,
            current: None,
        }
    }

    /// Full bigram profile of the most recently yielded match,
    /// materialising the backing cell if only its cardinality was known so
    /// far. `None` before the first match is yielded.
    pub fn bigrams(&mut self) -> Option<&B> {
        let (i, j) = self.current?;
        Some(self.matcher.union_bigrams(i, j))
    }

    /// Score threshold this enumeration was started with.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl<B: BigramSet> Iterator for Matches<'_, '_, B> {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        let sdc = self.matcher.seek(
            self.query,
            self.threshold,
            self.ratio_bound,
            &mut self.i,
            &mut self.j,
        )?;
        let matched = Match {
            begin: self.j,
            end: self.j + self.i + 1,
            sdc,
        };
        self.current = Some((self.i, self.j));
        self.i += 1; // resume just past the reported window
        Some(matched)
    }
}

impl<B: BigramSet> FusedIterator for Matches<'_, '_, B> {}
