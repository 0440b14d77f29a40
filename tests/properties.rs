use proptest::prelude::*;
use seqex::Pattern;

fn is_even(n: &i32) -> bool {
    n % 2 == 0
}

fn even_run_matcher(greedy: bool) -> seqex::Matcher<i32> {
    Pattern::matching(is_even)
        .one_or_more(greedy)
        .compile()
        .unwrap()
}

proptest! {
    /// §8: matches from `find_all` never overlap and are returned in
    /// left-to-right start order.
    #[test]
    fn matches_are_ordered_and_non_overlapping(input in prop::collection::vec(0i32..20, 0..200)) {
        let matcher = even_run_matcher(true);
        let matches = matcher.find_all(input);
        for pair in matches.windows(2) {
            prop_assert!(pair[0].end() < pair[1].start());
        }
    }

    /// §8: `test` agrees with whether `find` produces anything.
    #[test]
    fn test_matches_find_presence(input in prop::collection::vec(0i32..20, 0..200)) {
        let matcher = even_run_matcher(true);
        prop_assert_eq!(matcher.test(input.clone()), matcher.find(input).is_some());
    }

    /// §8: pushing every element through a `Scanner` then calling `end`
    /// yields exactly what `find_all` yields.
    #[test]
    fn scanner_matches_find_all(input in prop::collection::vec(0i32..20, 0..200)) {
        let matcher = even_run_matcher(true);
        let via_find_all = matcher.find_all(input.clone());

        let mut scanner = matcher.scanner();
        let mut via_scanner = Vec::new();
        for n in input {
            via_scanner.extend(scanner.push(n).unwrap());
        }
        via_scanner.extend(scanner.end().unwrap());

        prop_assert_eq!(
            via_find_all.iter().map(|m| (m.start(), m.end())).collect::<Vec<_>>(),
            via_scanner.iter().map(|m| (m.start(), m.end())).collect::<Vec<_>>(),
        );
    }

    /// §8: a greedy quantifier's match at a given start is never shorter
    /// than the lazy quantifier's match at the same start.
    #[test]
    fn greedy_is_at_least_as_long_as_lazy(input in prop::collection::vec(0i32..20, 1..200)) {
        let greedy = even_run_matcher(true);
        let lazy = even_run_matcher(false);
        if let (Some(g), Some(l)) = (greedy.find(input.clone()), lazy.find(input)) {
            prop_assert_eq!(g.start(), l.start());
            prop_assert!(g.len() >= l.len());
        }
    }

    /// §8: running over a `Vec` and over an opaque iterator built from it
    /// produce identical results.
    #[test]
    fn vec_and_iterator_agree(input in prop::collection::vec(0i32..20, 0..200)) {
        let matcher = even_run_matcher(true);
        let from_vec = matcher.find_all(input.clone());
        let from_iter = matcher.find_all(input.into_iter().map(|n| n));
        prop_assert_eq!(
            from_vec.iter().map(|m| (m.start(), m.end())).collect::<Vec<_>>(),
            from_iter.iter().map(|m| (m.start(), m.end())).collect::<Vec<_>>(),
        );
    }
}
