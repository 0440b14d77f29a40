use crate::error::PatternError;
use crate::matcher::Matcher;
use crate::nfa::Nfa;
use crate::predicate::Predicate;

use std::sync::Arc;

/// A node of the pattern AST. Immutable once constructed; every builder
/// method on [`Pattern`] returns a new tree rather than mutating in place.
#[derive(Clone)]
pub(crate) enum Node<T> {
    Pred(Predicate<T>),
    Any,
    Concat(Vec<Node<T>>),
    Alt(Vec<Node<T>>),
    Repeat {
        child: Box<Node<T>>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
    AnchorStart(Box<Node<T>>),
    AnchorEnd(Box<Node<T>>),
}

/// Flattens `b` into `a`'s children if `a` is already the same variant of
/// concatenation/alternation, per the "a Concat is flattened if any child is
/// itself a Concat" invariant (and its `Alt` analogue for `or`).
fn concat_children<T>(a: Node<T>, b: Node<T>) -> Vec<Node<T>> {
    let mut children = match a {
        Node::Concat(v) => v,
        other => vec![other],
    };
    match b {
        Node::Concat(v) => children.extend(v),
        other => children.push(other),
    }
    children
}

fn alt_children<T>(a: Node<T>, b: Node<T>) -> Vec<Node<T>> {
    let mut branches = match a {
        Node::Alt(v) => v,
        other => vec![other],
    };
    branches.push(b);
    branches
}

/// A pattern under construction. Every chaining method is a pure value
/// transform: it consumes `self` and returns a new `Pattern<T>`.
pub struct Pattern<T> {
    pub(crate) node: Node<T>,
}

/// Anything that can be coerced into a [`Pattern`]: a bare predicate
/// function, or an existing pattern taken as-is.
pub trait IntoPattern<T> {
    fn into_pattern(self) -> Pattern<T>;
}

impl<T> IntoPattern<T> for Pattern<T> {
    fn into_pattern(self) -> Pattern<T> {
        self
    }
}

impl<T, F> IntoPattern<T> for F
where
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn into_pattern(self) -> Pattern<T> {
        Pattern::matching(self)
    }
}

impl<T> Pattern<T> {
    /// Matches exactly one element satisfying `predicate`.
    ///
    /// Named `matching` rather than the source library's `where`, which is a
    /// reserved word in Rust.
    pub fn matching<F>(predicate: F) -> Pattern<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Pattern {
            node: Node::Pred(Predicate::new(predicate)),
        }
    }

    /// Matches exactly one element, whatever it is.
    pub fn any() -> Pattern<T> {
        Pattern { node: Node::Any }
    }

    /// Matches if any of `alternatives` matches, earlier ones winning ties.
    pub fn one_of<I, P>(alternatives: I) -> Result<Pattern<T>, PatternError>
    where
        I: IntoIterator<Item = P>,
        P: IntoPattern<T>,
    {
        let branches: Vec<Node<T>> = alternatives
            .into_iter()
            .map(|p| p.into_pattern().node)
            .collect();
        if branches.len() < 2 {
            return Err(PatternError::TooFewAlternatives);
        }
        Ok(Pattern {
            node: Node::Alt(branches),
        })
    }

    /// Appends `next` after `self`.
    pub fn followed_by<P>(self, next: P) -> Pattern<T>
    where
        P: IntoPattern<T>,
    {
        let other = next.into_pattern().node;
        Pattern {
            node: Node::Concat(concat_children(self.node, other)),
        }
    }

    /// Matches `self` or `alternative`, `self` winning ties.
    pub fn or<P>(self, alternative: P) -> Pattern<T>
    where
        P: IntoPattern<T>,
    {
        let other = alternative.into_pattern().node;
        Pattern {
            node: Node::Alt(alt_children(self.node, other)),
        }
    }

    fn wrap_quantifier(self, make: impl FnOnce(Node<T>) -> Node<T>) -> Pattern<T> {
        let node = match self.node {
            Node::Concat(mut children) => {
                let last = children.pop().expect("Concat has at least one child");
                children.push(make(last));
                Node::Concat(children)
            }
            other => make(other),
        };
        Pattern { node }
    }

    /// Matches one or more repetitions of the trailing element.
    pub fn one_or_more(self, greedy: bool) -> Pattern<T> {
        self.wrap_quantifier(|child| Node::Repeat {
            child: Box::new(child),
            min: 1,
            max: None,
            greedy,
        })
    }

    /// Matches zero or more repetitions of the trailing element.
    pub fn zero_or_more(self, greedy: bool) -> Pattern<T> {
        self.wrap_quantifier(|child| Node::Repeat {
            child: Box::new(child),
            min: 0,
            max: None,
            greedy,
        })
    }

    /// Matches zero or one repetitions of the trailing element.
    pub fn optional(self, greedy: bool) -> Pattern<T> {
        self.wrap_quantifier(|child| Node::Repeat {
            child: Box::new(child),
            min: 0,
            max: Some(1),
            greedy,
        })
    }

    /// Matches exactly `n` repetitions of the trailing element.
    pub fn times(self, n: u32) -> Result<Pattern<T>, PatternError> {
        if n < 1 {
            return Err(PatternError::InvalidRepeatCount { n });
        }
        Ok(self.wrap_quantifier(|child| Node::Repeat {
            child: Box::new(child),
            min: n,
            max: Some(n),
            greedy: true,
        }))
    }

    /// Matches between `min` and `max` (inclusive) repetitions of the
    /// trailing element.
    pub fn between(self, min: u32, max: u32, greedy: bool) -> Result<Pattern<T>, PatternError> {
        if min > max || max == 0 {
            return Err(PatternError::InvalidRepeatRange { min, max });
        }
        Ok(self.wrap_quantifier(|child| Node::Repeat {
            child: Box::new(child),
            min,
            max: Some(max),
            greedy,
        }))
    }

    /// Wraps the whole current pattern so it only matches at the start of
    /// the sequence.
    pub fn at_start(self) -> Pattern<T> {
        Pattern {
            node: Node::AnchorStart(Box::new(self.node)),
        }
    }

    /// Wraps the whole current pattern so it only matches at the end of the
    /// sequence (or once end-of-stream has been signaled).
    pub fn at_end(self) -> Pattern<T> {
        Pattern {
            node: Node::AnchorEnd(Box::new(self.node)),
        }
    }

    /// Validates the AST and lowers it to a compiled [`Matcher`] via
    /// Thompson's construction.
    pub fn compile(self) -> Result<Matcher<T>, PatternError> {
        validate(&self.node)?;
        let anchored_start = is_anchored_start(&self.node);
        let nfa = Nfa::compile(&self.node);
        Ok(Matcher::new(Arc::new(nfa), anchored_start))
    }
}

fn is_anchored_start<T>(node: &Node<T>) -> bool {
    match node {
        Node::AnchorStart(_) => true,
        Node::Concat(children) => children.first().is_some_and(is_anchored_start),
        _ => false,
    }
}

/// Walks the tree checking the anchor-placement invariant (§3.1/§4.1): an
/// anchor may appear at most once, and only along the outermost
/// start/end spine. Anchors are disallowed anywhere inside a `Repeat`
/// child, since repetition unrolls multiple copies and "start/end of
/// sequence" has no well-defined meaning for an interior copy. `Alt`
/// branches are not considered spine positions: an anchor must wrap the
/// whole alternation from outside it, not live inside a single branch.
fn validate<T>(root: &Node<T>) -> Result<(), PatternError> {
    let mut seen_start = false;
    let mut seen_end = false;
    check(root, true, true, false, &mut seen_start, &mut seen_end)
}

fn check<T>(
    node: &Node<T>,
    leftmost: bool,
    rightmost: bool,
    inside_repeat: bool,
    seen_start: &mut bool,
    seen_end: &mut bool,
) -> Result<(), PatternError> {
    match node {
        Node::Pred(_) | Node::Any => Ok(()),
        Node::AnchorStart(child) => {
            if inside_repeat || !leftmost || *seen_start {
                return Err(PatternError::MisplacedAnchor);
            }
            *seen_start = true;
            check(child, leftmost, rightmost, inside_repeat, seen_start, seen_end)
        }
        Node::AnchorEnd(child) => {
            if inside_repeat || !rightmost || *seen_end {
                return Err(PatternError::MisplacedAnchor);
            }
            *seen_end = true;
            check(child, leftmost, rightmost, inside_repeat, seen_start, seen_end)
        }
        Node::Concat(children) => {
            let n = children.len();
            for (i, child) in children.iter().enumerate() {
                check(
                    child,
                    leftmost && i == 0,
                    rightmost && i == n - 1,
                    inside_repeat,
                    seen_start,
                    seen_end,
                )?;
            }
            Ok(())
        }
        Node::Alt(branches) => {
            for branch in branches {
                check(branch, false, false, inside_repeat, seen_start, seen_end)?;
            }
            Ok(())
        }
        Node::Repeat { child, .. } => check(child, false, false, true, seen_start, seen_end),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn is_even(n: &i32) -> bool {
        n % 2 == 0
    }

    fn is_odd(n: &i32) -> bool {
        n % 2 != 0
    }

    #[test]
    fn times_zero_is_rejected() {
        let err = Pattern::matching(is_even).times(0).unwrap_err();
        assert_eq!(err, PatternError::InvalidRepeatCount { n: 0 });
    }

    #[test]
    fn between_requires_min_le_max_and_nonzero_max() {
        assert_eq!(
            Pattern::matching(is_even).between(5, 2, true).unwrap_err(),
            PatternError::InvalidRepeatRange { min: 5, max: 2 }
        );
        assert_eq!(
            Pattern::matching(is_even).between(0, 0, true).unwrap_err(),
            PatternError::InvalidRepeatRange { min: 0, max: 0 }
        );
    }

    #[test]
    fn one_of_requires_two_alternatives() {
        let err = Pattern::<i32>::one_of(vec![Pattern::matching(is_even)]).unwrap_err();
        assert_eq!(err, PatternError::TooFewAlternatives);
    }

    #[test]
    fn anchor_buried_by_followed_by_is_rejected() {
        let buried =
            Pattern::matching(is_odd).followed_by(Pattern::matching(is_even).at_start());
        assert!(matches!(
            buried.compile(),
            Err(PatternError::MisplacedAnchor)
        ));
    }

    #[test]
    fn anchor_at_outermost_position_compiles() {
        let ok = Pattern::matching(is_even).at_start().followed_by(is_odd);
        assert!(ok.compile().is_ok());
    }

    #[test]
    fn anchor_inside_repeat_is_rejected() {
        let bad = Pattern::matching(is_even).at_end().one_or_more(true);
        assert!(matches!(bad.compile(), Err(PatternError::MisplacedAnchor)));
    }
}
