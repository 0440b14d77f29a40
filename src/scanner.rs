use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::error::ScannerError;
use crate::match_result::MatchResult;
use crate::nfa::Nfa;
use crate::simulator::Simulator;

/// A push-based, non-overlapping matcher over a stream of elements the
/// caller does not have to buffer or rewind. `push` feeds one element at a
/// time and returns any matches that became final as a result; `end` signals
/// end-of-stream and resolves whatever was still pending.
///
/// Holds a ring buffer of the elements seen since the earliest still-live
/// thread's origin (see [`Simulator::earliest_start`]) so a finished match's
/// `data` can be reconstructed without the caller re-supplying it.
pub struct Scanner<T> {
    anchored_start: bool,
    sim: Simulator<T>,
    buffer: VecDeque<T>,
    buffer_origin: usize,
    pos: usize,
    ended: bool,
    /// Set once an anchored pattern's single origin-0 attempt has fully
    /// resolved (matched or died): no further work can ever produce a match.
    exhausted: bool,
}

impl<T: Clone> Scanner<T> {
    pub(crate) fn new(nfa: Arc<Nfa<T>>, anchored_start: bool) -> Self {
        let sim = Simulator::new(nfa, 0);
        Scanner {
            anchored_start,
            sim,
            buffer: VecDeque::new(),
            buffer_origin: 0,
            pos: 0,
            ended: false,
            exhausted: false,
        }
    }

    /// Feeds one element. Returns every match that became final as a result
    /// (almost always zero or one, since each accept state is reached by at
    /// most one thread per step).
    pub fn push(&mut self, element: T) -> Result<Vec<MatchResult<T>>, ScannerError> {
        if self.ended {
            return Err(ScannerError::AlreadyEnded);
        }
        let mut emitted = Vec::new();
        if self.exhausted {
            return Ok(emitted);
        }
        if !self.anchored_start && self.pos > 0 {
            self.sim.inject_start(self.pos);
        }
        self.sim.step(&element);
        self.buffer.push_back(element);
        self.pos += 1;
        self.drain_resolved(&mut emitted);
        self.trim_buffer();
        Ok(emitted)
    }

    /// Signals end-of-stream, resolving any match still waiting on an
    /// `AssertEnd` gate. No further calls to `push` or `end` are valid after
    /// this.
    pub fn end(&mut self) -> Result<Vec<MatchResult<T>>, ScannerError> {
        if self.ended {
            return Err(ScannerError::AlreadyEnded);
        }
        self.ended = true;
        let mut emitted = Vec::new();
        if !self.exhausted {
            self.sim.finalize();
            // No more input can ever arrive, so a still-live higher-priority
            // continuation thread (e.g. a greedy quantifier's re-enter edge)
            // can no longer produce a longer match even though it outranks
            // the accept thread. Emit whatever `pending` holds unconditionally
            // rather than gating on `is_definitive`, which would otherwise
            // discard a genuine match whose last element is the last of the
            // stream.
            if let Some((start, len)) = self.sim.take_pending() {
                if len > 0 {
                    debug!(start, len, "scanner resolved a match at end of stream");
                    emitted.push(self.build_match(start, len));
                }
            }
        }
        debug!(matches = emitted.len(), "scanner ended");
        Ok(emitted)
    }

    fn drain_resolved(&mut self, emitted: &mut Vec<MatchResult<T>>) {
        if !self.sim.is_definitive() {
            return;
        }
        match self.sim.take_pending() {
            Some((start, len)) if len > 0 => {
                debug!(start, len, "scanner resolved a match");
                emitted.push(self.build_match(start, len));
                self.sim.prune_through(start + len - 1);
            }
            Some((start, _)) => {
                // Zero-width match: suppressed from output, but the driver
                // must still advance past it to avoid looping forever.
                self.sim.prune_through(start);
            }
            None => {
                if self.anchored_start {
                    self.exhausted = true;
                }
            }
        }
    }

    fn build_match(&self, start: usize, len: usize) -> MatchResult<T> {
        let offset = start - self.buffer_origin;
        let data: Vec<T> = self.buffer.iter().skip(offset).take(len).cloned().collect();
        MatchResult::new(start, data)
    }

    fn trim_buffer(&mut self) {
        let floor = self.sim.earliest_start().unwrap_or(self.pos);
        while self.buffer_origin < floor {
            self.buffer.pop_front();
            self.buffer_origin += 1;
        }
    }
}
