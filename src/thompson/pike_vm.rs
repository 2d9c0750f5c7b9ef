//! An interpreter for [`crate::thompson::bytecode`].
//!
//! All live threads advance in lock step, one subject character at a time.
//! A thread is nothing but a position in the program. Each step stamps the
//! instructions it reaches with the current generation, so that a position
//! is added at most once per step: the thread lists never hold more than
//! `program.len()` entries and a search costs at most
//! `program.len() * (subject.len() + 1)` thread steps.

use std::mem;

use crate::error::Error;
use crate::thompson::bytecode::{Inst::*, Program};
use crate::util::Input;

/// A so-called PikeVM.
///
/// This is an interpreter for the bytecode. It never mutates the program,
/// so a single instance can serve any number of concurrent searches as long
/// as each one brings its own [`State`].
#[derive(Debug, Clone)]
pub struct PikeVM {
    program: Program,
}

/// A thread currently alive in the bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Thread {
    pc: usize,
}

/// Scratch memory for one search.
#[derive(Debug)]
pub struct State {
    active: Vec<Thread>,
    next: Vec<Thread>,
    /// Generation in which each instruction was last added to a list.
    visited: Box<[usize]>,
    /// Worklist for epsilon closures, empty whenever `add_thread` returns.
    stack: Vec<usize>,
    generation: usize,
}

impl State {
    fn new(state_count: usize) -> Self {
        Self {
            active: Vec::with_capacity(state_count),
            next: Vec::with_capacity(state_count),
            visited: vec![0; state_count].into_boxed_slice(),
            stack: Vec::with_capacity(state_count),
            generation: 0,
        }
    }

    /// Same as [`State::new`], but reports allocation failures instead of
    /// aborting.
    fn try_new(state_count: usize) -> Result<Self, Error> {
        let mut active = Vec::new();
        let mut next = Vec::new();
        let mut visited = Vec::new();
        let mut stack = Vec::new();
        active
            .try_reserve_exact(state_count)
            .and_then(|_| next.try_reserve_exact(state_count))
            .and_then(|_| visited.try_reserve_exact(state_count))
            .and_then(|_| stack.try_reserve_exact(state_count))
            .map_err(|_| Error::OutOfMemory)?;
        visited.resize(state_count, 0);
        Ok(Self {
            active,
            next,
            visited: visited.into_boxed_slice(),
            stack,
            generation: 0,
        })
    }

    /// Prepares the state for a new search. Stamps from previous searches
    /// are left in place, they are all older than the next generation.
    fn reset(&mut self) {
        self.active.clear();
        self.next.clear();
    }
}

/// Adds the thread at `pc` to `list`, followed by every thread reachable
/// from it without consuming input. Successors are visited depth first,
/// the first target of a split before the second one, which is what gives
/// greedy and lazy quantifiers their priority.
fn add_thread(
    program: &Program,
    list: &mut Vec<Thread>,
    visited: &mut [usize],
    stack: &mut Vec<usize>,
    pc: usize,
    generation: usize,
) {
    let insts = program.insts();
    stack.push(pc);
    while let Some(pc) = stack.pop() {
        if visited[pc] == generation {
            continue;
        }
        visited[pc] = generation;
        list.push(Thread { pc });
        match insts[pc] {
            Jmp(x) => stack.push(x),
            Split(x, y) => {
                stack.push(y);
                stack.push(x);
            }
            Save(_) => stack.push(pc + 1),
            Char(_) | Any | Rng(..) | Match => {}
        }
    }
}

impl PikeVM {
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn new_state(&self) -> State {
        State::new(self.program.len())
    }

    pub fn try_new_state(&self) -> Result<State, Error> {
        State::try_new(self.program.len())
    }

    /// Do one step of simulation: run every active thread, in priority
    /// order, against `c` (`None` at the end of the input). Threads that
    /// consume `c` continue in the next list. Returns true as soon as a
    /// thread reaches a `MATCH` that is acceptable at this position.
    fn step(&self, state: &mut State, c: Option<char>, at_end_only: bool) -> bool {
        let insts = self.program.insts();
        let State {
            active,
            next,
            visited,
            stack,
            generation,
        } = state;

        for thread in active.iter() {
            let advance = match insts[thread.pc] {
                Char(literal) => c == Some(literal),
                Rng(lo, hi) => c.is_some_and(|c| lo <= c && c <= hi),
                Any => c.is_some(),
                Match => {
                    if !at_end_only || c.is_none() {
                        return true;
                    }
                    false
                }
                Jmp(_) | Split(..) | Save(_) => false,
            };
            if advance {
                add_thread(
                    &self.program,
                    next,
                    visited,
                    stack,
                    thread.pc + 1,
                    *generation,
                );
            }
        }
        false
    }

    /// Runs the program against the input and tells whether it matched.
    pub fn exec(&self, input: Input<'_>, state: &mut State) -> bool {
        state.reset();

        let start = if input.anchored {
            self.program.anchored_start()
        } else {
            self.program.start()
        };

        state.generation += 1;
        add_thread(
            &self.program,
            &mut state.active,
            &mut state.visited,
            &mut state.stack,
            start,
            state.generation,
        );

        let mut chars = input.subject.chars();
        while !state.active.is_empty() {
            let c = chars.next();
            state.generation += 1;
            if self.step(state, c, input.anchored_end) {
                return true;
            }
            if c.is_none() {
                break;
            }
            mem::swap(&mut state.active, &mut state.next);
            state.next.clear();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{PikeVM, State, add_thread};
    use crate::regex::Config;
    use crate::syntax::parse;
    use crate::thompson::bytecode::Compiler;
    use crate::util::Input;

    fn vm(pattern: &str) -> PikeVM {
        let config = Config::default();
        PikeVM::new(Compiler::compile(parse(pattern, &config).unwrap(), &config).unwrap())
    }

    /// Program positions reached from `pc`, in the order they are added.
    fn closure(vm: &PikeVM, pc: usize) -> Vec<usize> {
        let mut state = vm.new_state();
        state.generation = 1;
        let State {
            active,
            visited,
            stack,
            ..
        } = &mut state;
        add_thread(vm.program(), active, visited, stack, pc, 1);
        active.iter().map(|thread| thread.pc).collect()
    }

    #[test]
    fn closure_order_greedy_star() {
        // 00004: SPLIT 5, 7
        // 00005: CHAR 'a'
        // 00006: JMP 4
        // 00007: SAVE 1
        // 00008: MATCH
        let vm = vm("a*");
        assert_eq!(closure(&vm, 4), vec![4, 5, 7, 8]);
    }

    #[test]
    fn closure_order_lazy_star() {
        // 00004: SPLIT 7, 5
        let vm = vm("a*?");
        assert_eq!(closure(&vm, 4), vec![4, 7, 8, 5]);
    }

    #[test]
    fn closure_from_start() {
        // The implicit lazy prefix tries the pattern before skipping a
        // character.
        let vm = vm("a");
        assert_eq!(closure(&vm, 0), vec![0, 3, 4, 1]);
    }

    #[test]
    fn closure_visits_each_position_once() {
        let vm = vm("((a*)*)*");
        let positions = closure(&vm, 0);
        let mut unique = positions.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(positions.len(), unique.len());
        assert!(positions.len() <= vm.program().len());
    }

    #[test]
    fn unanchored() {
        let vm = vm("abc");
        let mut state = vm.new_state();
        assert!(vm.exec(Input::new("xxabcxx"), &mut state));
        assert!(!vm.exec(Input::new("xxabxcx"), &mut state));
        assert!(!vm.exec(Input::new(""), &mut state));
    }

    #[test]
    fn anchored() {
        let vm = vm("abc");
        let mut state = vm.new_state();
        assert!(vm.exec(Input::new("abcxx").anchored(true), &mut state));
        assert!(!vm.exec(Input::new("xabc").anchored(true), &mut state));
    }

    #[test]
    fn anchored_end() {
        let vm = vm("a{2,4}");
        let mut state = vm.new_state();
        let full = |s| Input::new(s).anchored(true).anchored_end(true);
        assert!(!vm.exec(full("a"), &mut state));
        assert!(vm.exec(full("aa"), &mut state));
        assert!(vm.exec(full("aaa"), &mut state));
        assert!(vm.exec(full("aaaa"), &mut state));
        assert!(!vm.exec(full("aaaaa"), &mut state));
        assert!(vm.exec(Input::new("xaaaa").anchored_end(true), &mut state));
    }

    #[test]
    fn lazy_star_still_matches() {
        let vm = vm("a*?a");
        let mut state = vm.new_state();
        assert!(vm.exec(Input::new("aaa"), &mut state));
        assert!(vm.exec(Input::new("aaa").anchored(true).anchored_end(true), &mut state));
        assert!(!vm.exec(Input::new("bbb"), &mut state));
    }

    #[test]
    fn dot_rejects_end_of_input_only() {
        let vm = vm("a.");
        let mut state = vm.new_state();
        assert!(!vm.exec(Input::new("a"), &mut state));
        assert!(vm.exec(Input::new("a\0"), &mut state));
        assert!(vm.exec(Input::new("a\n"), &mut state));
    }

    #[test]
    fn ranges() {
        let vm = vm("[b-d]");
        let mut state = vm.new_state();
        assert!(!vm.exec(Input::new("a"), &mut state));
        assert!(vm.exec(Input::new("b"), &mut state));
        assert!(vm.exec(Input::new("d"), &mut state));
        assert!(!vm.exec(Input::new("e"), &mut state));
    }

    #[test]
    fn state_reuse() {
        let vm = vm("(a|b)*c");
        let mut state = vm.try_new_state().unwrap();
        for _ in 0..3 {
            assert!(vm.exec(Input::new("ababc"), &mut state));
            assert!(!vm.exec(Input::new("abab"), &mut state));
        }
    }
}
