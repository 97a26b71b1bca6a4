use std::fmt;
use std::hash::{Hash, Hasher};

/// Ordered pair of adjacent characters drawn from a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bigram(pub char, pub char);

impl Bigram {
    /// Bit-packed concatenation of the two code points.
    ///
    /// Two `char`s always fit a `u64`, so the packed form doubles as the
    /// bigram's hash; it is stable for the lifetime of the process.
    #[inline]
    #[must_use]
    pub const fn packed(self) -> u64 {
        (self.1 as u64) << 32 | self.0 as u64
    }
}

impl Hash for Bigram {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.packed());
    }
}

impl fmt::Display for Bigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

/// All adjacent character pairs of `text`, in text order.
///
/// A string of fewer than 2 characters yields nothing.
pub(crate) fn bigrams_of(text: &str) -> impl Iterator<Item = Bigram> + '_ {
    text.chars()
        .zip(text.chars().skip(1))
        .map(|(c1, c2)| Bigram(c1, c2))
}
