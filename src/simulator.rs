use std::sync::Arc;

use tracing::trace;

use crate::nfa::{Nfa, StateId, Transition};

#[derive(Clone, Copy)]
struct Thread {
    state: StateId,
    start: usize,
}

/// Steps a set of active NFA threads through a sequence, one element at a
/// time. Owns a shared, read-only [`Nfa`] and the per-step scratch state: two
/// thread lists and a generation-stamped "seen" array standing in for a set
/// that would otherwise need clearing every step.
///
/// Unanchored scanning runs as a single continuous simulation rather than a
/// restart-per-position loop: at every step a fresh thread is injected at the
/// lowest priority (via [`Simulator::inject_start`]), so threads born at
/// different origins coexist in one thread list. Because older origins are
/// always appended to the list before the newly injected one, "earliest
/// start wins" falls out of list order for free, and the per-step cost stays
/// bounded by the NFA's state count regardless of how many origins have been
/// tried — the restart-and-replay alternative would redo work for every
/// origin that fails and cost quadratic time on adversarial input.
pub(crate) struct Simulator<T> {
    nfa: Arc<Nfa<T>>,
    current: Vec<Thread>,
    next: Vec<Thread>,
    seen: Vec<u32>,
    generation: u32,
    /// Absolute position in the whole sequence.
    pos: usize,
    /// The best accept recorded for the current highest-priority origin:
    /// `(start, len)`. Cleared once consumed by `take_pending`.
    pending: Option<(usize, usize)>,
}

impl<T> Simulator<T> {
    /// Starts a simulation with its first thread born at `origin`. `origin`
    /// is an absolute sequence position, used both as the thread's start and
    /// to decide whether `AssertStart` is satisfied.
    pub(crate) fn new(nfa: Arc<Nfa<T>>, origin: usize) -> Self {
        let seen = vec![0u32; nfa.states.len()];
        let mut sim = Simulator {
            nfa,
            current: Vec::new(),
            next: Vec::new(),
            seen,
            generation: 1,
            pos: origin,
            pending: None,
        };
        sim.inject_start(origin);
        sim
    }

    /// Injects a new lowest-priority thread starting at `pos` into the
    /// current thread list, performing its epsilon closure immediately.
    /// Threads already present (older origins) keep precedence: dedup via
    /// the generation stamp leaves an already-occupied state alone. Also
    /// re-checks for an accept reached by the closure itself (a zero-width
    /// match at `pos`, before any element is consumed there), since such a
    /// thread has no `Consume` transition and would otherwise vanish
    /// unrecorded on the very next `step`.
    pub(crate) fn inject_start(&mut self, pos: usize) {
        let nfa = Arc::clone(&self.nfa);
        let start = nfa.start;
        let at_start = pos == 0;
        Self::add_thread(
            &nfa,
            &mut self.seen,
            self.generation,
            &mut self.current,
            start,
            pos,
            at_start,
            false,
        );
        self.record_pending();
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.current.is_empty()
    }

    /// True once the highest-priority active origin has resolved: either no
    /// thread survives at all, or the frontmost thread is the accept state
    /// (meaning no higher-priority thread — from this origin or an earlier
    /// one — is still in play). See the module doc and SPEC_FULL.md §4 for
    /// why this subsumes both the lazy-immediate and greedy-exhausted cases
    /// without a stored greedy/lazy flag.
    pub(crate) fn is_definitive(&self) -> bool {
        match self.current.first() {
            None => true,
            Some(thread) => thread.state == self.nfa.accept,
        }
    }

    /// Returns and clears the pending match. Must be called at most once per
    /// resolution: leaving a stale value around would let a later, unrelated
    /// "current is empty" resolution re-emit it.
    pub(crate) fn take_pending(&mut self) -> Option<(usize, usize)> {
        self.pending.take()
    }

    /// Drops every thread whose origin lies at or before `through`,
    /// enforcing non-overlapping matches: the next reported match can only
    /// start strictly after the previous one ended (or, for a suppressed
    /// empty match, strictly after the position it matched at).
    pub(crate) fn prune_through(&mut self, through: usize) {
        self.current.retain(|t| t.start > through);
    }

    /// The earliest origin still alive, if any; used to size the Scanner's
    /// ring buffer, which only needs to retain elements from here onward.
    pub(crate) fn earliest_start(&self) -> Option<usize> {
        self.current.first().map(|t| t.start)
    }

    /// Advances the simulation by one element, returning whether any thread
    /// survives.
    pub(crate) fn step(&mut self, element: &T) -> bool {
        self.generation += 1;
        self.next.clear();
        let nfa = Arc::clone(&self.nfa);
        for thread in &self.current {
            if let [Transition::Consume { target, predicate }] =
                nfa.states[thread.state].transitions.as_slice()
            {
                if predicate.test(element) {
                    Self::add_thread(
                        &nfa,
                        &mut self.seen,
                        self.generation,
                        &mut self.next,
                        *target,
                        thread.start,
                        false,
                        false,
                    );
                }
            }
        }
        std::mem::swap(&mut self.current, &mut self.next);
        self.pos += 1;
        self.record_pending();
        trace!(pos = self.pos, alive = self.current.len(), "stepped simulator");
        self.is_alive()
    }

    /// Runs end-of-stream finalization (§4.3): resolves `AssertEnd` gates
    /// that were left dangling mid-stream and gives a last chance at a
    /// match.
    pub(crate) fn finalize(&mut self) {
        self.generation += 1;
        let nfa = Arc::clone(&self.nfa);
        let mut resolved = Vec::new();
        for thread in &self.current {
            Self::add_thread(
                &nfa,
                &mut self.seen,
                self.generation,
                &mut resolved,
                thread.state,
                thread.start,
                false,
                true,
            );
        }
        self.current = resolved;
        self.record_pending();
    }

    /// Records the accept thread belonging to whatever origin currently
    /// leads the thread list, if any. Because older origins always precede
    /// younger ones in `current`, the first accept found here is always the
    /// one for the current highest-priority origin — self-correcting as
    /// origins come and go, without needing to track which origin `pending`
    /// belongs to.
    fn record_pending(&mut self) {
        if let Some(thread) = self.current.iter().find(|t| t.state == self.nfa.accept) {
            self.pending = Some((thread.start, self.pos - thread.start));
        }
    }

    /// Epsilon closure from `state`, in priority-descending order, deduped
    /// per step via the generation stamp in `seen`. Consume states and the
    /// (transition-less) accept state are terminal and get appended to
    /// `list`; an unsatisfied assertion gate is appended too so it can be
    /// retried by a later `finalize` call, except `AssertStart`, which can
    /// never become true again once `pos` has moved past 0.
    fn add_thread(
        nfa: &Nfa<T>,
        seen: &mut [u32],
        generation: u32,
        list: &mut Vec<Thread>,
        state: StateId,
        start: usize,
        at_start: bool,
        at_end: bool,
    ) {
        if seen[state] == generation {
            return;
        }
        seen[state] = generation;

        match nfa.states[state].transitions.as_slice() {
            [] => list.push(Thread { state, start }),
            [Transition::Consume { .. }] => list.push(Thread { state, start }),
            [Transition::AssertStart { target }] => {
                if at_start {
                    Self::add_thread(nfa, seen, generation, list, *target, start, at_start, at_end);
                }
            }
            [Transition::AssertEnd { target }] => {
                if at_end {
                    Self::add_thread(nfa, seen, generation, list, *target, start, at_start, at_end);
                } else {
                    list.push(Thread { state, start });
                }
            }
            transitions => {
                let mut epsilons: Vec<(StateId, i32)> = transitions
                    .iter()
                    .map(|t| match t {
                        Transition::Epsilon { target, priority } => (*target, *priority),
                        _ => unreachable!("a state never mixes epsilon and other transitions"),
                    })
                    .collect();
                epsilons.sort_unstable_by(|a, b| b.1.cmp(&a.1));
                for (target, _) in epsilons {
                    Self::add_thread(nfa, seen, generation, list, target, start, at_start, at_end);
                }
            }
        }
    }
}
