use tracing::debug;

use crate::pattern::Node;
use crate::predicate::Predicate;

pub(crate) type StateId = usize;

const PLACEHOLDER: StateId = StateId::MAX;

/// One outgoing edge of a state. Thompson's construction never produces a
/// state that mixes transition kinds: a state has either exactly one
/// `Consume`, exactly one assertion, or any number of `Epsilon`s.
#[derive(Clone)]
pub(crate) enum Transition<T> {
    Epsilon { target: StateId, priority: i32 },
    Consume { target: StateId, predicate: Predicate<T> },
    AssertStart { target: StateId },
    AssertEnd { target: StateId },
}

impl<T> Transition<T> {
    fn set_target(&mut self, target: StateId) {
        match self {
            Transition::Epsilon { target: t, .. }
            | Transition::Consume { target: t, .. }
            | Transition::AssertStart { target: t }
            | Transition::AssertEnd { target: t } => *t = target,
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct State<T> {
    pub(crate) transitions: Vec<Transition<T>>,
}

/// A compiled, read-only nondeterministic finite automaton. Built once by
/// [`Nfa::compile`]; [`crate::simulator::Simulator`] instances borrow it
/// (via `Arc`) and never mutate it.
pub(crate) struct Nfa<T> {
    pub(crate) states: Vec<State<T>>,
    pub(crate) start: StateId,
    pub(crate) accept: StateId,
}

impl<T> Nfa<T> {
    pub(crate) fn compile(root: &Node<T>) -> Nfa<T> {
        let mut compiler = Compiler { states: Vec::new() };
        let frag = compiler.compile_node(root);
        let accept = compiler.new_state();
        compiler.patch(&frag.out, accept);
        let nfa = Nfa {
            states: compiler.states,
            start: frag.entry,
            accept,
        };
        debug!(states = nfa.states.len(), "compiled NFA");
        nfa
    }
}

/// A dangling outgoing slot: the transition at `.1` in state `.0`'s
/// transition list whose target is still [`PLACEHOLDER`] and awaits
/// [`Compiler::patch`].
struct Dangling(StateId, usize);

/// The result of lowering one AST node: an entry state and the slots still
/// to be patched to whatever comes next.
struct Frag {
    entry: StateId,
    out: Vec<Dangling>,
}

struct Compiler<T> {
    states: Vec<State<T>>,
}

impl<T> Compiler<T> {
    fn new_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn push_transition(&mut self, state: StateId, transition: Transition<T>) -> Dangling {
        self.states[state].transitions.push(transition);
        Dangling(state, self.states[state].transitions.len() - 1)
    }

    fn patch(&mut self, dangling: &[Dangling], target: StateId) {
        for Dangling(state, idx) in dangling {
            self.states[*state].transitions[*idx].set_target(target);
        }
    }

    fn compile_node(&mut self, node: &Node<T>) -> Frag {
        match node {
            Node::Pred(predicate) => self.compile_consume(predicate.clone()),
            Node::Any => self.compile_consume(Predicate::always()),
            Node::Concat(children) => self.compile_concat(children),
            Node::Alt(branches) => self.compile_alt(branches),
            Node::Repeat { child, min, max, greedy } => {
                self.compile_repeat(child, *min, *max, *greedy)
            }
            Node::AnchorStart(child) => self.compile_anchor_start(child),
            Node::AnchorEnd(child) => self.compile_anchor_end(child),
        }
    }

    fn compile_consume(&mut self, predicate: Predicate<T>) -> Frag {
        let entry = self.new_state();
        let slot = self.push_transition(
            entry,
            Transition::Consume {
                target: PLACEHOLDER,
                predicate,
            },
        );
        Frag { entry, out: vec![slot] }
    }

    fn compile_concat(&mut self, children: &[Node<T>]) -> Frag {
        let mut iter = children.iter();
        let first = iter.next().expect("Concat has at least one child");
        let mut frag = self.compile_node(first);
        let entry = frag.entry;
        for child in iter {
            let next = self.compile_node(child);
            self.patch(&frag.out, next.entry);
            frag = next;
        }
        Frag { entry, out: frag.out }
    }

    fn compile_alt(&mut self, branches: &[Node<T>]) -> Frag {
        let entry = self.new_state();
        let mut out = Vec::new();
        let n = branches.len();
        for (i, branch) in branches.iter().enumerate() {
            let frag = self.compile_node(branch);
            // Strictly decreasing left-to-right: branch 0 gets the highest
            // priority, so it wins ties in the closure walk.
            let priority = (n - i) as i32;
            self.push_transition(
                entry,
                Transition::Epsilon {
                    target: frag.entry,
                    priority,
                },
            );
            out.extend(frag.out);
        }
        Frag { entry, out }
    }

    fn compile_anchor_start(&mut self, child: &Node<T>) -> Frag {
        let inner = self.compile_node(child);
        let entry = self.new_state();
        self.push_transition(
            entry,
            Transition::AssertStart {
                target: inner.entry,
            },
        );
        Frag { entry, out: inner.out }
    }

    fn compile_anchor_end(&mut self, child: &Node<T>) -> Frag {
        let inner = self.compile_node(child);
        let gate = self.new_state();
        self.patch(&inner.out, gate);
        let slot = self.push_transition(gate, Transition::AssertEnd { target: PLACEHOLDER });
        Frag {
            entry: inner.entry,
            out: vec![slot],
        }
    }

    /// Unrolls `Repeat(child, min, max, greedy)` per the construction table:
    /// a mandatory chain of `min` copies, followed by either an unbounded
    /// re-entrant loop (`max = None`) or a chain of optional copies
    /// (`max = Some(k)`), with epsilon priority encoding greedy/lazy
    /// preference at every branch point.
    fn compile_repeat(&mut self, child: &Node<T>, min: u32, max: Option<u32>, greedy: bool) -> Frag {
        let mut entry: Option<StateId> = None;
        let mut pending_out: Vec<Dangling> = Vec::new();

        for _ in 0..min {
            let frag = self.compile_node(child);
            match entry {
                None => entry = Some(frag.entry),
                Some(_) => self.patch(&pending_out, frag.entry),
            }
            pending_out = frag.out;
        }

        let final_out = match max {
            None => {
                let loop_state = self.new_state();
                match entry {
                    None => entry = Some(loop_state),
                    Some(_) => self.patch(&pending_out, loop_state),
                }
                let reenter = self.compile_node(child);
                let (enter_priority, exit_priority) = if greedy { (1, 0) } else { (0, 1) };
                self.push_transition(
                    loop_state,
                    Transition::Epsilon {
                        target: reenter.entry,
                        priority: enter_priority,
                    },
                );
                self.patch(&reenter.out, loop_state);
                let exit = self.push_transition(
                    loop_state,
                    Transition::Epsilon {
                        target: PLACEHOLDER,
                        priority: exit_priority,
                    },
                );
                vec![exit]
            }
            Some(k) => {
                let mut out = Vec::new();
                let mut prev_out = pending_out;
                let mut has_predecessor = min > 0;
                for _ in 0..(k - min) {
                    let branch = self.new_state();
                    match entry {
                        None => entry = Some(branch),
                        Some(_) if has_predecessor => self.patch(&prev_out, branch),
                        Some(_) => {}
                    }
                    let copy = self.compile_node(child);
                    let (enter_priority, skip_priority) = if greedy { (1, 0) } else { (0, 1) };
                    self.push_transition(
                        branch,
                        Transition::Epsilon {
                            target: copy.entry,
                            priority: enter_priority,
                        },
                    );
                    let skip = self.push_transition(
                        branch,
                        Transition::Epsilon {
                            target: PLACEHOLDER,
                            priority: skip_priority,
                        },
                    );
                    out.push(skip);
                    prev_out = copy.out;
                    has_predecessor = true;
                }
                out.extend(prev_out);
                out
            }
        };

        Frag {
            entry: entry.expect("Repeat always has at least one stage"),
            out: final_out,
        }
    }
}
