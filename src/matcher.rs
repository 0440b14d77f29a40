use std::sync::Arc;

use crate::match_result::MatchResult;
use crate::nfa::Nfa;
use crate::scanner::Scanner;

/// A compiled pattern, ready to run against sequences of `T`. Cheap to
/// clone: the NFA itself is shared via `Arc` and never mutated once built.
pub struct Matcher<T> {
    nfa: Arc<Nfa<T>>,
    anchored_start: bool,
}

impl<T> Clone for Matcher<T> {
    fn clone(&self) -> Self {
        Matcher {
            nfa: Arc::clone(&self.nfa),
            anchored_start: self.anchored_start,
        }
    }
}

impl<T> Matcher<T> {
    pub(crate) fn new(nfa: Arc<Nfa<T>>, anchored_start: bool) -> Self {
        Matcher { nfa, anchored_start }
    }

    /// A fresh streaming [`Scanner`] over this pattern.
    pub fn scanner(&self) -> Scanner<T>
    where
        T: Clone,
    {
        Scanner::new(Arc::clone(&self.nfa), self.anchored_start)
    }
}

impl<T: Clone> Matcher<T> {
    /// All non-overlapping matches, left to right, earliest start wins at
    /// every position. Built entirely on [`Scanner`], so it works the same
    /// whether `input` is a `Vec` or a genuinely unbounded lazy iterator.
    pub fn find_all<I>(&self, input: I) -> Vec<MatchResult<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut scanner = self.scanner();
        let mut matches = Vec::new();
        for element in input {
            match scanner.push(element) {
                Ok(found) => matches.extend(found),
                Err(_) => unreachable!("a fresh scanner is never already ended"),
            }
        }
        match scanner.end() {
            Ok(found) => matches.extend(found),
            Err(_) => unreachable!("end() is called at most once here"),
        }
        matches
    }

    /// The first match, if any, stopping consumption of `input` as soon as
    /// it's found.
    pub fn find<I>(&self, input: I) -> Option<MatchResult<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut scanner = self.scanner();
        for element in input {
            if let Ok(found) = scanner.push(element) {
                if let Some(m) = found.into_iter().next() {
                    return Some(m);
                }
            }
        }
        scanner.end().ok()?.into_iter().next()
    }

    /// Whether `input` contains at least one match anywhere.
    pub fn test<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        self.find(input).is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pattern::Pattern;

    fn is_even(n: &i32) -> bool {
        n % 2 == 0
    }

    fn is_positive(n: &i32) -> bool {
        *n > 0
    }

    #[test]
    fn find_all_collects_every_non_overlapping_match() {
        let matcher = Pattern::matching(is_even).one_or_more(true).compile().unwrap();
        let matches = matcher.find_all(vec![1, 2, 4, 3, 6, 8, 10, 1]);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].data(), &[2, 4]);
        assert_eq!(matches[1].data(), &[6, 8, 10]);
    }

    #[test]
    fn greedy_match_reaching_end_of_input_backtracks_for_a_trailing_requirement() {
        // A greedy run of positives followed by one more positive: over
        // [1, 2, 3] the repeat must give back its last element so the
        // trailing `followed_by` has something to match, and the whole
        // match still reaches all the way to the last element of the input.
        let matcher = Pattern::matching(is_positive)
            .one_or_more(true)
            .followed_by(is_positive)
            .compile()
            .unwrap();
        let m = matcher.find(vec![1, 2, 3]).unwrap();
        assert_eq!(m.start(), 0);
        assert_eq!(m.end(), 2);
        assert_eq!(m.data(), &[1, 2, 3]);
    }

    #[test]
    fn find_stops_at_the_first_match() {
        let matcher = Pattern::matching(is_even).compile().unwrap();
        let m = matcher.find(vec![1, 3, 4, 6]).unwrap();
        assert_eq!(m.start(), 2);
        assert_eq!(m.data(), &[4]);
    }

    #[test]
    fn test_reports_presence_without_a_match_value() {
        let matcher = Pattern::matching(is_even).compile().unwrap();
        assert!(matcher.test(vec![1, 3, 5, 6]));
        assert!(!matcher.test(vec![1, 3, 5, 7]));
    }

    #[test]
    fn greedy_is_at_least_as_long_as_lazy() {
        let greedy = Pattern::matching(is_even).one_or_more(true).compile().unwrap();
        let lazy = Pattern::matching(is_even).one_or_more(false).compile().unwrap();
        let input = vec![2, 4, 6, 1];
        let greedy_match = greedy.find(input.clone()).unwrap();
        let lazy_match = lazy.find(input).unwrap();
        assert!(greedy_match.len() >= lazy_match.len());
        assert_eq!(lazy_match.len(), 1);
        assert_eq!(greedy_match.len(), 3);
    }
}
