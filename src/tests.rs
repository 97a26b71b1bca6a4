/* -------------------------------------------------------------------------
 *  Tests
 * ---------------------------------------------------------------------- */
use crate::{
    Bigram, BigramMultiset, BigramSet, Bigrams, Match, SequenceMatcher, UnorderedBigramMultiset,
};

/// Oracle: score every admissible window directly from per-token profiles,
/// in the order the lazy iterator promises.
fn naive_matches(tokens: &[(&str, bool)], query: &Bigrams, threshold: f64) -> Vec<(usize, usize)> {
    let n = tokens.len();
    let mut found = Vec::new();
    for j in 0..n {
        if tokens[j].1 {
            continue;
        }
        for i in 0..n - j {
            if tokens[j + i].1 {
                continue;
            }
            let profiles: Vec<Bigrams> = tokens[j..=j + i]
                .iter()
                .map(|&(text, _)| Bigrams::of(text))
                .collect();
            let window = Bigrams::unite(&profiles);
            if Bigrams::sorensen_dice_coef(&window, query) >= threshold {
                found.push((j, j + i + 1));
            }
        }
    }
    found
}

fn matcher_of(tokens: &[(&str, bool)]) -> SequenceMatcher {
    let mut matcher = SequenceMatcher::new();
    matcher.reserve(tokens.len());
    for &(text, strip) in tokens {
        matcher.push_text(text, strip);
    }
    matcher
}

#[test]
fn empty_profile() {
    let bgrms = Bigrams::new();
    assert_eq!(bgrms.len(), 0);
    assert!(bgrms.is_empty());
    assert_eq!(bgrms.to_string(), "bigrams(size: 0, {})");
    assert_eq!(Bigrams::sorensen_dice_coef(&bgrms, &bgrms), 0.0);

    assert_eq!(Bigrams::of("").len(), 0);
    assert_eq!(Bigrams::of("a").len(), 0); // single char makes no bigram
}

#[test]
fn tiny_profiles() {
    let abcd = Bigrams::of("abcd");
    assert_eq!(abcd.len(), 3); // {ab, bc, cd}

    let bcd = Bigrams::of("bcd");
    assert_eq!(bcd.len(), 2); // {bc, cd}

    assert_eq!(Bigrams::intersect_len(&abcd, &bcd), 2);
    assert_eq!(Bigrams::sorensen_dice_coef(&abcd, &bcd), 0.8); // 2·2/(3+2)
}

#[test]
fn union_with_repetition() {
    let union = Bigrams::of("abcd").union(&Bigrams::of("bcd"));
    assert_eq!(union.len(), 5);
    let runs: Vec<(Bigram, usize)> = union.iter().collect();
    assert_eq!(
        runs,
        vec![
            (Bigram('a', 'b'), 1),
            (Bigram('b', 'c'), 2),
            (Bigram('c', 'd'), 2),
        ]
    );
    assert_eq!(union.to_string(), "bigrams(size: 5, {ab: 1, bc: 2, cd: 2})");
}

#[test]
fn union_into_empty_and_of_empty() {
    let abcd = Bigrams::of("abcd");

    let mut empty = Bigrams::new();
    empty.merge(&abcd);
    assert_eq!(empty, abcd);

    let mut union = abcd.clone();
    union.merge(&Bigrams::new());
    assert_eq!(union, abcd);
}

#[test]
fn unite_many() {
    let profiles = [Bigrams::of("Helo"), Bigrams::of("  "), Bigrams::of("wordl")];
    let union = Bigrams::unite(&profiles);
    assert_eq!(union.len(), 3 + 1 + 4);

    assert_eq!(Bigrams::unite([]), Bigrams::new());
}

#[test]
fn union_preserves_cardinality() {
    let samples = ["abcd", "bcd", "aaaa", "Sørensen", "", "x"];
    for left in samples {
        for right in samples {
            let (l, r) = (Bigrams::of(left), Bigrams::of(right));
            assert_eq!(l.union(&r).len(), l.len() + r.len(), "{left:?} + {right:?}");
        }
    }
}

#[test]
fn intersection_bounds_and_commutativity() {
    let samples = ["abcd", "bcd", "aaaa", "Sørensen", "", "dcba"];
    for left in samples {
        for right in samples {
            let (l, r) = (Bigrams::of(left), Bigrams::of(right));
            let isect = Bigrams::intersect_len(&l, &r);
            assert_eq!(isect, Bigrams::intersect_len(&r, &l));
            assert!(isect <= l.len().min(r.len()));

            let sdc = Bigrams::sorensen_dice_coef(&l, &r);
            assert!((0.0..=1.0).contains(&sdc));
        }
    }

    let abcd = Bigrams::of("abcd");
    assert_eq!(Bigrams::intersect_len(&abcd, &abcd), abcd.len());
    assert_eq!(Bigrams::sorensen_dice_coef(&abcd, &abcd), 1.0);
}

#[test]
fn wide_characters() {
    let bgrms = Bigrams::of("Sørensen");
    assert_eq!(bgrms.len(), 7); // {Sø, ør, re, en, ns, se, en}
    let en = bgrms
        .iter()
        .find(|&(bigram, _)| bigram == Bigram('e', 'n'))
        .map(|(_, count)| count);
    assert_eq!(en, Some(2));
    assert!(bgrms.to_string().contains("Sø: 1"));
}

#[test]
fn representations_agree() {
    let samples = ["abcd", "bcd", "aaaa", "Sørensen", "", "Hello world"];
    for left in samples {
        for right in samples {
            let counted = (Bigrams::of(left), Bigrams::of(right));
            let ordered = (BigramMultiset::of(left), BigramMultiset::of(right));
            let unordered = (
                UnorderedBigramMultiset::of(left),
                UnorderedBigramMultiset::of(right),
            );

            assert_eq!(counted.0.len(), ordered.0.len());
            assert_eq!(counted.0.len(), unordered.0.len());

            let isect = Bigrams::intersect_len(&counted.0, &counted.1);
            assert_eq!(isect, BigramMultiset::intersect_len(&ordered.0, &ordered.1));
            assert_eq!(
                isect,
                UnorderedBigramMultiset::intersect_len(&unordered.0, &unordered.1)
            );

            let sdc = Bigrams::sorensen_dice_coef(&counted.0, &counted.1);
            assert_eq!(sdc, BigramMultiset::sorensen_dice_coef(&ordered.0, &ordered.1));
            assert_eq!(
                sdc,
                UnorderedBigramMultiset::sorensen_dice_coef(&unordered.0, &unordered.1)
            );
        }
    }
}

#[test]
fn multiset_rendering() {
    assert_eq!(
        BigramMultiset::new().to_string(),
        "bigram_multiset(size: 0, {})"
    );
    let union = BigramMultiset::of("abcd").union(&BigramMultiset::of("bcd"));
    assert_eq!(
        union.to_string(),
        "bigram_multiset(size: 5, {ab, bc, bc, cd, cd})"
    );

    assert_eq!(
        UnorderedBigramMultiset::new().to_string(),
        "unordered_bigram_multiset(size: 0, {})"
    );
    let rendered = UnorderedBigramMultiset::of("abab").to_string();
    assert!(rendered.starts_with("unordered_bigram_multiset(size: 3, {"));
}

#[test]
fn match_rendering() {
    let matched = Match {
        begin: 3,
        end: 6,
        sdc: 0.8,
    };
    assert_eq!(matched.len(), 3);
    assert_eq!(
        matched.to_string(),
        "match(begin: 3, end: 6, size: 3, SDC: 0.8)"
    );
}

#[test]
fn empty_matcher_matches_nothing() {
    let mut matcher = SequenceMatcher::<Bigrams>::new();
    assert!(matcher.is_empty());
    assert_eq!(matcher.matches(&Bigrams::of("abcd"), 0.3).next(), None);
    assert_eq!(matcher.matches(&Bigrams::new(), 0.3).next(), None);
}

#[test]
fn happy_path() {
    let tokens = [
        ("Prologue", false),
        (" .", true),
        ("  ", true),
        ("Hello", false),
        ("  ", true),
        ("world", false),
        (" !", true),
        ("Epilogue", false),
        (" .", false),
    ];
    let mut matcher = matcher_of(&tokens);
    assert_eq!(matcher.len(), 9);

    let query = Bigrams::unite(&[
        Bigrams::of("Helo"),
        Bigrams::of("  "),
        Bigrams::of("wordl"),
    ]);

    let mut matches = matcher.matches(&query, 0.7);
    let matched = matches.next().expect("one match above threshold");
    println!("{matched}");
    assert_eq!(matched.begin, 3, "match begins with \"Hello\"");
    assert_eq!(matched.len(), 3, "match is 3 tokens long");
    assert_eq!(matched.end, 6, "match ends past \"world\"");
    assert!(matched.sdc > 0.7, "match scores above threshold");

    // Dereference: the window profile is the union of its token profiles
    let window = matches.bigrams().expect("profile of reported match");
    let expected = Bigrams::unite(&[
        Bigrams::of("Hello"),
        Bigrams::of("  "),
        Bigrams::of("world"),
    ]);
    assert_eq!(*window, expected);

    assert_eq!(matches.next(), None, "no more matches");
    assert_eq!(matches.next(), None); // stays exhausted
}

#[test]
fn happy_path_over_ordered_multiset() {
    let mut matcher = SequenceMatcher::<BigramMultiset>::new();
    for (text, strip) in [
        ("Prologue", false),
        (" .", true),
        ("  ", true),
        ("Hello", false),
        ("  ", true),
        ("world", false),
        (" !", true),
        ("Epilogue", false),
        (" .", false),
    ] {
        matcher.push(BigramMultiset::of(text), strip);
    }

    let query = BigramMultiset::unite(&[
        BigramMultiset::of("Helo"),
        BigramMultiset::of("  "),
        BigramMultiset::of("wordl"),
    ]);

    let found: Vec<Match> = matcher.matches(&query, 0.7).collect();
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].begin, found[0].end), (3, 6));
}

#[test]
fn enumeration_agrees_with_naive_scan() {
    let tokens = [
        ("ab", false),
        ("abc", false),
        ("x", false),
        ("bcd", false),
        ("cde", false),
        ("de", false),
    ];
    let query = Bigrams::of("abcde");

    for threshold in [0.2, 0.4, 0.5, 0.7, 0.9, 1.0] {
        let expected = naive_matches(&tokens, &query, threshold);
        let mut matcher = matcher_of(&tokens);
        let found: Vec<(usize, usize)> = matcher
            .matches(&query, threshold)
            .map(|m| (m.begin, m.end))
            .collect();
        println!("threshold {threshold}: {found:?}");
        assert_eq!(found, expected, "threshold {threshold}");
    }
}

#[test]
fn enumeration_order_is_strictly_ascending() {
    let tokens = [
        ("abc", false),
        ("bcd", false),
        ("cde", false),
        ("def", false),
    ];
    let query = Bigrams::of("bcdef");
    let mut matcher = matcher_of(&tokens);
    let found: Vec<Match> = matcher.matches(&query, 0.2).collect();
    assert!(found.len() > 1, "scenario must produce several matches");
    for pair in found.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        // Lexicographic on (begin, length)
        assert!(
            next.begin > prev.begin || (next.begin == prev.begin && next.len() > prev.len()),
            "{next} does not come after {prev}"
        );
    }
}

#[test]
fn strip_tokens_never_border_matches() {
    let tokens = [
        ("ab", false),
        ("bc", true),
        ("cd", false),
        ("  ", true),
        ("ab", false),
    ];
    let query = Bigrams::of("abcd");

    for threshold in [0.2, 0.5, 0.8] {
        let expected = naive_matches(&tokens, &query, threshold);
        let mut matcher = matcher_of(&tokens);
        let found: Vec<(usize, usize)> = matcher
            .matches(&query, threshold)
            .map(|m| (m.begin, m.end))
            .collect();
        assert_eq!(found, expected, "threshold {threshold}");
        for (begin, end) in found {
            assert!(!tokens[begin].1, "match begins on strip token");
            assert!(!tokens[end - 1].1, "match ends on strip token");
        }
    }
}

#[test]
fn matrix_cells_are_consistent() {
    let tokens = [
        ("abc", false),
        ("", false),
        ("cd", false),
        ("dde", false),
        ("e", false),
    ];
    let mut matcher = matcher_of(&tokens);
    let n = matcher.len();

    // Sizes first, so that profile queries later upgrade cached cells
    for j in 0..n {
        for i in 0..n - j {
            let expected: usize = tokens[j..=j + i]
                .iter()
                .map(|&(text, _)| Bigrams::of(text).len())
                .sum();
            assert_eq!(matcher.union_len(i, j), expected, "size at ({i}, {j})");
        }
    }

    for j in 0..n {
        for i in 0..n - j {
            let profiles: Vec<Bigrams> = tokens[j..=j + i]
                .iter()
                .map(|&(text, _)| Bigrams::of(text))
                .collect();
            let expected = Bigrams::unite(&profiles);
            assert_eq!(*matcher.union_bigrams(i, j), expected, "profile at ({i}, {j})");
            assert_eq!(matcher.union_len(i, j), expected.len());
        }
    }
}

#[test]
fn exact_token_matches_at_threshold_one() {
    let tokens = [("abcd", false), ("efgh", false)];
    let mut matcher = matcher_of(&tokens);
    let query = Bigrams::of("abcd");
    let found: Vec<Match> = matcher.matches(&query, 1.0).collect();
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].begin, found[0].end), (0, 1));
    assert_eq!(found[0].sdc, 1.0);
}

#[test]
fn threshold_above_one_matches_nothing() {
    let mut matcher = matcher_of(&[("abcd", false)]);
    assert_eq!(matcher.matches(&Bigrams::of("abcd"), 1.5).next(), None);
}

#[test]
fn empty_query_matches_nothing() {
    let mut matcher = matcher_of(&[("abcd", false), ("bcd", false)]);
    assert_eq!(matcher.matches(&Bigrams::new(), 0.5).next(), None);
    assert_eq!(matcher.matches(&Bigrams::of("x"), 0.5).next(), None);
}

#[test]
#[should_panic(expected = "SDC threshold must be positive")]
fn zero_threshold_is_rejected() {
    let mut matcher = matcher_of(&[("abcd", false)]);
    let query = Bigrams::of("abcd");
    let _ = matcher.matches(&query, 0.0);
}

#[test]
fn matches_word_split_text() {
    use unicode_segmentation::UnicodeSegmentation;

    let text = "The quick brown fox jumps over the lazy dog";
    let tokens: Vec<(&str, bool)> = text
        .split_word_bounds()
        .map(|token| (token, token.trim().is_empty()))
        .collect();
    let query = Bigrams::of("quick brown");

    let expected = naive_matches(&tokens, &query, 0.8);
    let mut matcher = matcher_of(&tokens);
    let found: Vec<(usize, usize)> = matcher
        .matches(&query, 0.8)
        .map(|m| (m.begin, m.end))
        .collect();
    assert_eq!(found, expected);
    assert!(
        found.contains(&(2, 5)),
        "\"quick\" + \" \" + \"brown\" matches: {found:?}"
    );
}

#[test]
fn bigram_packing() {
    let bigram = Bigram('a', 'b');
    assert_eq!(bigram.packed(), (u64::from(u32::from('b')) << 32) | u64::from(u32::from('a')));
    assert_eq!(bigram.to_string(), "ab");
    assert_ne!(Bigram('a', 'b').packed(), Bigram('b', 'a').packed());
}

#[test]
fn ffi_round_trip() {
    use crate::ffi;
    use std::ffi::CString;

    unsafe {
        let abcd = CString::new("abcd").unwrap();
        let bcd = CString::new("bcd").unwrap();
        let left = ffi::bigrams_from_str(abcd.as_ptr());
        let right = ffi::bigrams_from_str(bcd.as_ptr());
        assert_eq!(ffi::bigrams_len(left), 3);
        assert_eq!(ffi::bigrams_intersect_len(left, right), 2);
        assert_eq!(ffi::bigrams_sorensen_dice_coef(left, right), 0.8);

        // Profile iteration: three runs of count 1
        let iter = ffi::bigrams_iter_new(left);
        let end = ffi::bigrams_iter_end(left);
        let mut seen = Vec::new();
        while ffi::bigrams_iter_ne(iter, end) != 0 {
            let (mut ch1, mut ch2, mut count) = (0u32, 0u32, 0usize);
            ffi::bigrams_iter_deref(iter, &mut ch1, &mut ch2, &mut count);
            seen.push((ch1, ch2, count));
            ffi::bigrams_iter_advance(iter);
        }
        assert_eq!(
            seen,
            vec![
                (u32::from('a'), u32::from('b'), 1),
                (u32::from('b'), u32::from('c'), 1),
                (u32::from('c'), u32::from('d'), 1),
            ]
        );
        ffi::bigrams_iter_free(iter);
        ffi::bigrams_iter_free(end);

        let mut buffer = [0u8; 64];
        let written = ffi::bigrams_render(left, buffer.as_mut_ptr().cast(), buffer.len());
        assert_eq!(
            &buffer[..written],
            b"bigrams(size: 3, {ab: 1, bc: 1, cd: 1})"
        );

        // Matcher: Hello / strip / world, query for the whole phrase
        let matcher = ffi::sequence_matcher_new();
        ffi::sequence_matcher_reserve(matcher, 3);
        let hello = CString::new("Hello").unwrap();
        let space = CString::new("  ").unwrap();
        let world = CString::new("world").unwrap();
        ffi::sequence_matcher_push_text(matcher, hello.as_ptr(), 0);
        ffi::sequence_matcher_push_text(matcher, space.as_ptr(), 1);
        ffi::sequence_matcher_push_text(matcher, world.as_ptr(), 0);
        assert_eq!(ffi::sequence_matcher_len(matcher), 3);

        let helo = CString::new("Helo").unwrap();
        let wordl = CString::new("wordl").unwrap();
        let query = ffi::bigrams_from_str(helo.as_ptr());
        let gap = ffi::bigrams_from_str(space.as_ptr());
        let tail = ffi::bigrams_from_str(wordl.as_ptr());
        ffi::bigrams_merge(query, gap);
        ffi::bigrams_merge(query, tail);
        ffi::bigrams_free(gap);
        ffi::bigrams_free(tail);

        let begin = ffi::sequence_matcher_matches_begin(matcher, query, 0.7);
        let sentinel = ffi::sequence_matcher_matches_end(matcher);
        assert_eq!(ffi::match_iter_ne(begin, sentinel), 1);
        assert_eq!(ffi::match_iter_begin(begin), 0);
        assert_eq!(ffi::match_iter_end_index(begin), 3);
        assert_eq!(ffi::match_iter_len(begin), 3);
        assert!(ffi::match_iter_sdc(begin) > 0.7);

        let window = ffi::match_iter_deref(begin);
        assert_eq!(ffi::bigrams_len(window), 9);
        ffi::bigrams_free(window);

        let written = ffi::match_iter_render(begin, buffer.as_mut_ptr().cast(), buffer.len());
        assert!(std::str::from_utf8(&buffer[..written])
            .unwrap()
            .starts_with("match(begin: 0, end: 3, size: 3, SDC: 0."));

        ffi::match_iter_advance(begin);
        assert_eq!(ffi::match_iter_ne(begin, sentinel), 0);

        // Degenerate threshold is refused outright
        assert!(ffi::sequence_matcher_matches_begin(matcher, query, 0.0).is_null());

        ffi::match_iter_free(begin);
        ffi::match_iter_free(sentinel);
        ffi::bigrams_free(query);
        ffi::bigrams_free(left);
        ffi::bigrams_free(right);
        ffi::sequence_matcher_free(matcher);
    }
}
