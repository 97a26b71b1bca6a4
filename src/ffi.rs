//! C-compatible binding surface for bigram profiles and the sequence
//! matcher.
//!
//! Mirrors the library API as a flat function set over opaque handles so
//! the crate can be embedded in managed runtimes through the `cdylib` and
//! plain C FFI (e.g. Python's ctypes). Strings cross the boundary as
//! NUL-terminated UTF-8; characters are read back as Unicode code points.
//!
//! # Memory ownership
//!
//! Every pointer returned by a constructor-like function is owned by the
//! caller and must be released with the matching `*_free` function.
//! Accessors and rendering never transfer ownership. There is no
//! process-wide state.
//!
//! # Safety
//!
//! Handles must originate from this module and must not be used after
//! free. A matcher handle must outlive every match cursor created from it,
//! and the sequence must not be mutated while a cursor is live; this is the
//! exclusive borrow of the safe API, which raw pointers cannot enforce.
//! Null handles are tolerated by read accessors (they return zero values)
//! and by the `*_free` functions.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::bigrams::{BigramSet, Bigrams};
use crate::matcher::SequenceMatcher;
use crate::matches::Match;

/// The matcher type exported over the C ABI (counted-profile backed).
pub type Matcher = SequenceMatcher<Bigrams>;

/// Cursor over the distinct `(bigram, count)` runs of a profile.
pub struct BigramsIter {
    bigrams: *const Bigrams,
    index: usize,
}

/// Cursor over matching windows; replicates the begin/end iterator
/// protocol of the safe [`Matches`](crate::Matches) enumeration for
/// bindings that cannot express borrowed iterators.
pub struct MatchIter {
    matcher: *mut Matcher,
    query: *const Bigrams,
    threshold: f64,
    ratio_bound: f64,
    i: usize,
    j: usize,
    sdc: f64,
}

impl MatchIter {
    /// Advance the cursor to the next window at or after `(i, j)` that
    /// meets the threshold, or to the end position `(0, len)`.
    unsafe fn seek(&mut self) {
        let matcher = &mut *self.matcher;
        let query = &*self.query;
        self.sdc = matcher
            .seek(query, self.threshold, self.ratio_bound, &mut self.i, &mut self.j)
            .unwrap_or(0.0);
    }
}

/// Truncating copy of `rendered` into the caller's buffer.
///
/// Returns the number of bytes written; no NUL terminator is appended.
unsafe fn write_str(rendered: &str, buffer: *mut c_char, capacity: usize) -> usize {
    if buffer.is_null() {
        return 0;
    }
    let bytes = rendered.as_bytes();
    let len = bytes.len().min(capacity);
    ptr::copy_nonoverlapping(bytes.as_ptr(), buffer.cast::<u8>(), len);
    len
}

/* -------------------------------------------------------------------------
 *  Bigram profile
 * ---------------------------------------------------------------------- */

/// New empty profile.
#[no_mangle]
pub extern "C" fn bigrams_new() -> *mut Bigrams {
    Box::into_raw(Box::new(Bigrams::new()))
}

/// New profile of all adjacent character pairs of `text`.
///
/// # Safety
///
/// `text` must be null or a valid NUL-terminated string; invalid UTF-8
/// sequences are replaced. A null `text` produces an empty profile.
#[no_mangle]
pub unsafe extern "C" fn bigrams_from_str(text: *const c_char) -> *mut Bigrams {
    if text.is_null() {
        return bigrams_new();
    }
    let text = CStr::from_ptr(text).to_string_lossy();
    Box::into_raw(Box::new(Bigrams::of(&text)))
}

/// New copy of an existing profile.
///
/// # Safety
///
/// `bigrams` must be a valid profile handle.
#[no_mangle]
pub unsafe extern "C" fn bigrams_clone(bigrams: *const Bigrams) -> *mut Bigrams {
    if bigrams.is_null() {
        return bigrams_new();
    }
    Box::into_raw(Box::new((*bigrams).clone()))
}

/// Release a profile handle.
///
/// # Safety
///
/// `bigrams` must be null or a profile handle not used afterwards.
#[no_mangle]
pub unsafe extern "C" fn bigrams_free(bigrams: *mut Bigrams) {
    if !bigrams.is_null() {
        drop(Box::from_raw(bigrams));
    }
}

/// Multiset cardinality of the profile.
///
/// # Safety
///
/// `bigrams` must be null or a valid profile handle.
#[no_mangle]
pub unsafe extern "C" fn bigrams_len(bigrams: *const Bigrams) -> usize {
    if bigrams.is_null() {
        return 0;
    }
    (*bigrams).len()
}

/// Cursor at the profile's first `(bigram, count)` run.
///
/// # Safety
///
/// `bigrams` must be a valid profile handle outliving the cursor.
#[no_mangle]
pub unsafe extern "C" fn bigrams_iter_new(bigrams: *const Bigrams) -> *mut BigramsIter {
    Box::into_raw(Box::new(BigramsIter { bigrams, index: 0 }))
}

/// Cursor just past the profile's last `(bigram, count)` run.
///
/// # Safety
///
/// `bigrams` must be a valid profile handle outliving the cursor.
#[no_mangle]
pub unsafe extern "C" fn bigrams_iter_end(bigrams: *const Bigrams) -> *mut BigramsIter {
    Box::into_raw(Box::new(BigramsIter {
        bigrams,
        index: (*bigrams).run_count(),
    }))
}

/// Compare two profile cursors; nonzero when they differ.
///
/// # Safety
///
/// Both arguments must be valid cursors over the same profile.
#[no_mangle]
pub unsafe extern "C" fn bigrams_iter_ne(
    iter1: *const BigramsIter,
    iter2: *const BigramsIter,
) -> c_int {
    c_int::from((*iter1).index != (*iter2).index)
}

/// Read the cursor's current run: both code points plus the count.
///
/// # Safety
///
/// `iter` must be a valid, non-end cursor; the out pointers must be valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn bigrams_iter_deref(
    iter: *const BigramsIter,
    ch1: *mut u32,
    ch2: *mut u32,
    count: *mut usize,
) {
    let iter = &*iter;
    if let Some((bigram, run_count)) = (*iter.bigrams).run(iter.index) {
        *ch1 = u32::from(bigram.0);
        *ch2 = u32::from(bigram.1);
        *count = run_count;
    }
}

/// Step the cursor to the next run.
///
/// # Safety
///
/// `iter` must be a valid cursor.
#[no_mangle]
pub unsafe extern "C" fn bigrams_iter_advance(iter: *mut BigramsIter) {
    (*iter).index += 1;
}

/// Release a profile cursor.
///
/// # Safety
///
/// `iter` must be null or a cursor handle not used afterwards.
#[no_mangle]
pub unsafe extern "C" fn bigrams_iter_free(iter: *mut BigramsIter) {
    if !iter.is_null() {
        drop(Box::from_raw(iter));
    }
}

/// In-place union: adds all of `other`'s bigrams to `bigrams`.
///
/// Returns `bigrams` for call chaining.
///
/// # Safety
///
/// Both arguments must be valid, distinct profile handles.
#[no_mangle]
pub unsafe extern "C" fn bigrams_merge(
    bigrams: *mut Bigrams,
    other: *const Bigrams,
) -> *mut Bigrams {
    (*bigrams).merge(&*other);
    bigrams
}

/// Fresh profile equal to the union of the two arguments.
///
/// # Safety
///
/// Both arguments must be valid profile handles.
#[no_mangle]
pub unsafe extern "C" fn bigrams_union(
    bigrams1: *const Bigrams,
    bigrams2: *const Bigrams,
) -> *mut Bigrams {
    Box::into_raw(Box::new((*bigrams1).union(&*bigrams2)))
}

/// Intersection cardinality of the two profiles.
///
/// # Safety
///
/// Both arguments must be valid profile handles.
#[no_mangle]
pub unsafe extern "C" fn bigrams_intersect_len(
    bigrams1: *const Bigrams,
    bigrams2: *const Bigrams,
) -> usize {
    Bigrams::intersect_len(&*bigrams1, &*bigrams2)
}

/// Sørensen–Dice coefficient of the two profiles.
///
/// # Safety
///
/// Both arguments must be valid profile handles.
#[no_mangle]
pub unsafe extern "C" fn bigrams_sorensen_dice_coef(
    bigrams1: *const Bigrams,
    bigrams2: *const Bigrams,
) -> f64 {
    Bigrams::sorensen_dice_coef(&*bigrams1, &*bigrams2)
}

/// Render the profile into the caller's buffer as UTF-8.
///
/// Returns the number of bytes written (truncated to `capacity`; no NUL
/// terminator is appended).
///
/// # Safety
///
/// `bigrams` must be a valid profile handle and `buffer` must be valid for
/// `capacity` bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn bigrams_render(
    bigrams: *const Bigrams,
    buffer: *mut c_char,
    capacity: usize,
) -> usize {
    write_str(&(*bigrams).to_string(), buffer, capacity)
}

/* -------------------------------------------------------------------------
 *  Sequence matcher
 * ---------------------------------------------------------------------- */

/// New matcher with an empty token sequence.
#[no_mangle]
pub extern "C" fn sequence_matcher_new() -> *mut Matcher {
    Box::into_raw(Box::new(Matcher::new()))
}

/// Release a matcher handle.
///
/// # Safety
///
/// `matcher` must be null or a matcher handle not used afterwards; no
/// match cursor over it may be used afterwards either.
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_free(matcher: *mut Matcher) {
    if !matcher.is_null() {
        drop(Box::from_raw(matcher));
    }
}

/// Hint that `tokens` more tokens will be appended.
///
/// # Safety
///
/// `matcher` must be a valid matcher handle.
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_reserve(matcher: *mut Matcher, tokens: usize) {
    (*matcher).reserve(tokens);
}

/// Number of tokens appended so far.
///
/// # Safety
///
/// `matcher` must be null or a valid matcher handle.
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_len(matcher: *const Matcher) -> usize {
    if matcher.is_null() {
        return 0;
    }
    (*matcher).len()
}

/// Append a copy of the given profile as the next token.
///
/// A nonzero `strip` flag forbids the token from beginning or ending any
/// reported match.
///
/// # Safety
///
/// `matcher` and `bigrams` must be valid handles; `bigrams` stays owned by
/// the caller.
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_push(
    matcher: *mut Matcher,
    bigrams: *const Bigrams,
    strip: c_int,
) {
    (*matcher).push((*bigrams).clone(), strip != 0);
}

/// Append a token given as text; its profile is built in place.
///
/// # Safety
///
/// `matcher` must be a valid matcher handle; `text` must be null or a
/// valid NUL-terminated string (null appends an empty token).
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_push_text(
    matcher: *mut Matcher,
    text: *const c_char,
    strip: c_int,
) {
    let text = if text.is_null() {
        String::new().into()
    } else {
        CStr::from_ptr(text).to_string_lossy()
    };
    (*matcher).push_text(&text, strip != 0);
}

/// Begin match enumeration; the cursor is positioned on the first match
/// (or at the end when there is none).
///
/// Returns null when `threshold <= 0` or any handle is null.
///
/// # Safety
///
/// `matcher` and `query` must be valid handles outliving the cursor; the
/// matcher must not be mutated while the cursor is live.
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_matches_begin(
    matcher: *mut Matcher,
    query: *const Bigrams,
    threshold: f64,
) -> *mut MatchIter {
    if matcher.is_null() || query.is_null() || threshold.is_nan() || threshold <= 0.0 {
        return ptr::null_mut();
    }
    let mut iter = MatchIter {
        matcher,
        query,
        threshold,
        ratio_bound: 2.0 / threshold - 1.0,
        i: 0,
        j: 0,
        sdc: 0.0,
    };
    if (*query).is_empty() {
        iter.j = (*matcher).len(); // empty query matches nothing
    } else {
        iter.seek();
    }
    Box::into_raw(Box::new(iter))
}

/// End-of-enumeration sentinel cursor, at position `(0, len)`.
///
/// # Safety
///
/// `matcher` must be a valid matcher handle outliving the cursor.
#[no_mangle]
pub unsafe extern "C" fn sequence_matcher_matches_end(matcher: *mut Matcher) -> *mut MatchIter {
    Box::into_raw(Box::new(MatchIter {
        matcher,
        query: ptr::null(),
        threshold: 0.0,
        ratio_bound: 0.0,
        i: 0,
        j: (*matcher).len(),
        sdc: 0.0,
    }))
}

/// Compare two match cursors by position; nonzero when they differ.
///
/// A cursor that has exhausted the sequence compares equal to the end
/// sentinel.
///
/// # Safety
///
/// Both arguments must be valid cursors over the same matcher.
#[no_mangle]
pub unsafe extern "C" fn match_iter_ne(iter1: *const MatchIter, iter2: *const MatchIter) -> c_int {
    let (iter1, iter2) = (&*iter1, &*iter2);
    c_int::from(iter1.i != iter2.i || iter1.j != iter2.j)
}

/// Fresh owned profile of the cursor's current window, materialising it if
/// needed. Returns null on an exhausted cursor.
///
/// # Safety
///
/// `iter` must be a valid cursor whose matcher is still alive.
#[no_mangle]
pub unsafe extern "C" fn match_iter_deref(iter: *mut MatchIter) -> *mut Bigrams {
    let iter = &mut *iter;
    let matcher = &mut *iter.matcher;
    if iter.j >= matcher.len() {
        return ptr::null_mut();
    }
    Box::into_raw(Box::new(matcher.union_bigrams(iter.i, iter.j).clone()))
}

/// First token index of the current window.
///
/// # Safety
///
/// `iter` must be a valid cursor.
#[no_mangle]
pub unsafe extern "C" fn match_iter_begin(iter: *const MatchIter) -> usize {
    (*iter).j
}

/// Just-past-the-last token index of the current window.
///
/// # Safety
///
/// `iter` must be a valid cursor.
#[no_mangle]
pub unsafe extern "C" fn match_iter_end_index(iter: *const MatchIter) -> usize {
    let iter = &*iter;
    iter.j + iter.i + 1
}

/// Number of tokens in the current window.
///
/// # Safety
///
/// `iter` must be a valid cursor.
#[no_mangle]
pub unsafe extern "C" fn match_iter_len(iter: *const MatchIter) -> usize {
    (*iter).i + 1
}

/// Sørensen–Dice score of the current window against the query.
///
/// # Safety
///
/// `iter` must be a valid cursor.
#[no_mangle]
pub unsafe extern "C" fn match_iter_sdc(iter: *const MatchIter) -> f64 {
    (*iter).sdc
}

/// Advance the cursor to the next matching window.
///
/// # Safety
///
/// `iter` must be a valid, non-sentinel cursor whose matcher is still
/// alive.
#[no_mangle]
pub unsafe extern "C" fn match_iter_advance(iter: *mut MatchIter) {
    let iter = &mut *iter;
    if iter.query.is_null() || iter.j >= (*iter.matcher).len() {
        return; // sentinel and exhausted cursors do not move
    }
    iter.i += 1;
    iter.seek();
}

/// Release a match cursor.
///
/// # Safety
///
/// `iter` must be null or a cursor handle not used afterwards.
#[no_mangle]
pub unsafe extern "C" fn match_iter_free(iter: *mut MatchIter) {
    if !iter.is_null() {
        drop(Box::from_raw(iter));
    }
}

/// Render the cursor's current match into the caller's buffer as UTF-8.
///
/// Returns the number of bytes written (truncated to `capacity`; no NUL
/// terminator is appended).
///
/// # Safety
///
/// `iter` must be a valid cursor and `buffer` must be valid for `capacity`
/// bytes of writes.
#[no_mangle]
pub unsafe extern "C" fn match_iter_render(
    iter: *const MatchIter,
    buffer: *mut c_char,
    capacity: usize,
) -> usize {
    let iter = &*iter;
    let matched = Match {
        begin: iter.j,
        end: iter.j + iter.i + 1,
        sdc: iter.sdc,
    };
    write_str(&matched.to_string(), buffer, capacity)
}
