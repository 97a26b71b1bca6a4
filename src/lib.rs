//! Fuzzy phrase matching in tokenised text using the Sørensen–Dice
//! coefficient over multisets of character bigrams.
//!
//! [`Bigrams`] summarises a string as a counted multiset of its adjacent
//! character pairs; [`SequenceMatcher`] owns a sequence of token profiles
//! and lazily enumerates every contiguous token window whose joint profile
//! scores at least a caller-supplied threshold against a query profile,
//! pruning whole families of windows by a cardinality bound before any
//! profile is built.
//!
//! ```rust
//! use dice_matcher::{Bigrams, SequenceMatcher};
//!
//! let mut matcher = SequenceMatcher::new();
//! for token in ["Hello", " ", "world"] {
//!     matcher.push_text(token, token.trim().is_empty());
//! }
//!
//! let query = Bigrams::of("Helo world");
//! let found = matcher.matches(&query, 0.5).next().unwrap();
//! assert_eq!((found.begin, found.end), (0, 3));
//! ```
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss, clippy::module_name_repetitions)]

mod bigram;
mod bigrams;
pub mod ffi;
mod matcher;
mod matches;
mod multiset;
#[cfg(test)]
mod tests;

pub use bigram::Bigram;
pub use bigrams::{BigramSet, Bigrams};
pub use matcher::SequenceMatcher;
pub use matches::{Match, Matches};
pub use multiset::{BigramMultiset, UnorderedBigramMultiset, UnorderedIter};
