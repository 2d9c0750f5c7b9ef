//! A Thompson NFA represented in a bytecode format.
//!
//! This module contains the definition of [`Inst`], a bytecode format that
//! represents a Thompson's NFA, whose size is linearly proportional to the
//! pattern. The compiler that produces it from an [`Ast`] is also provided
//! by this module, see [`Compiler`].
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::regex::Config;
use crate::syntax::ast::{Ast, Node, Regexp};

/// Bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    Char(char),
    /// Any character. Only the end of the input is rejected.
    Any,
    Rng(char, char),
    Jmp(usize),
    /// Try the first target, then the second one.
    Split(usize, usize),
    /// Mark a group boundary. Does not consume input.
    Save(usize),
    Match,
}

use Inst::*;

/// A compiled pattern.
///
/// Instructions reference each other by absolute position. The program never
/// changes once built, all scratch memory used while matching lives in
/// [`crate::thompson::pike_vm::State`].
#[derive(Debug, Clone)]
pub struct Program {
    insts: Box<[Inst]>,
    start: usize,
    anchored_start: usize,
}

impl Program {
    /// Entry point that searches anywhere in the subject.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Entry point that skips the implicit `.*?` prefix, so that the pattern
    /// must match at the beginning of the subject.
    pub fn anchored_start(&self) -> usize {
        self.anchored_start
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            write!(f, "{pc:05}: ")?;
            match inst {
                Char(c) => writeln!(f, "CHAR {c:?}")?,
                Any => writeln!(f, "ANY")?,
                Rng(lo, hi) => writeln!(f, "RNG {lo:?}-{hi:?}")?,
                Jmp(x) => writeln!(f, "JMP {x}")?,
                Split(x, y) => writeln!(f, "SPLIT {x}, {y}")?,
                Save(slot) => writeln!(f, "SAVE {slot}")?,
                Match => writeln!(f, "MATCH")?,
            }
        }
        Ok(())
    }
}

/// A compiler from [`Ast`] to this bytecode representation.
///
/// Compilation takes two walks over the AST: the first one computes the
/// exact number of instructions so that the buffer is reserved once, the
/// second one emits them, patching forward targets as the recursion
/// returns.
pub struct Compiler {
    insts: Vec<Inst>,
    /// Instruction counts of shared nodes, keyed by address. Repetitions
    /// reuse the same operand many times, this keeps counting linear in
    /// the number of distinct nodes.
    sizes: HashMap<*const Regexp, usize>,
    cg: bool,
}

impl Compiler {
    /// Compiles `ast` as if it were `.*?(ast)`, followed by a `MATCH`.
    /// The AST is released before returning.
    pub fn compile(ast: Ast, config: &Config) -> Result<Program, Error> {
        let mut compiler = Compiler {
            insts: Vec::new(),
            sizes: HashMap::new(),
            cg: config.cg,
        };

        let prefix = Regexp::star(Regexp::dot(), false);
        let body = Regexp::paren(ast.root, Some(0));

        let prefix_len = compiler.count(&prefix);
        let expected = prefix_len
            .checked_add(compiler.count(&body))
            .and_then(|n| n.checked_add(1))
            .unwrap_or(usize::MAX);
        if expected > config.size_limit {
            return Err(Error::TooLarge {
                size: expected,
                limit: config.size_limit,
            });
        }
        compiler
            .insts
            .try_reserve_exact(expected)
            .map_err(|_| Error::OutOfMemory)?;
        compiler.sizes.clear();

        compiler.emit(&prefix);
        let anchored_start = compiler.current_pc();
        compiler.emit(&body);
        compiler.push(Match);

        if compiler.current_pc() != expected || anchored_start != prefix_len {
            return Err(Error::InternalCompiler(format!(
                "emitted {} instructions, expected {expected}",
                compiler.current_pc()
            )));
        }

        Ok(Program {
            insts: compiler.insts.into_boxed_slice(),
            start: 0,
            anchored_start,
        })
    }

    fn current_pc(&self) -> usize {
        self.insts.len()
    }

    fn push(&mut self, inst: Inst) -> usize {
        let pc = self.current_pc();
        self.insts.push(inst);
        pc
    }

    fn split(x: usize, y: usize, greedy: bool) -> Inst {
        if greedy { Split(x, y) } else { Split(y, x) }
    }

    /// Number of instructions [`Compiler::emit`] produces for `root`.
    /// Saturates instead of overflowing, the caller compares the result
    /// against the size limit anyway.
    ///
    /// Walks the tree with an explicit stack: concatenations and
    /// alternations are left-nested chains as long as the pattern.
    fn count(&mut self, root: &Node) -> usize {
        let mut work = vec![Count::Enter(root)];
        let mut sizes: Vec<usize> = Vec::new();
        while let Some(visit) = work.pop() {
            match visit {
                Count::Enter(None) => sizes.push(0),
                Count::Enter(Some(node)) => {
                    if let Some(size) = self.sizes.get(&Rc::as_ptr(node)) {
                        sizes.push(*size);
                        continue;
                    }
                    work.push(Count::Leave(node));
                    match node.as_ref() {
                        Regexp::Lit(_) | Regexp::Dot | Regexp::Range(..) => {}
                        Regexp::Cat(left, right) | Regexp::Alt(left, right) => {
                            work.push(Count::Enter(right));
                            work.push(Count::Enter(left));
                        }
                        Regexp::Quest(sub, _)
                        | Regexp::Star(sub, _)
                        | Regexp::Plus(sub, _)
                        | Regexp::Paren(sub, _) => work.push(Count::Enter(sub)),
                    }
                }
                Count::Leave(node) => {
                    let mut operand = || sizes.pop().unwrap_or(0);
                    let size = match node.as_ref() {
                        Regexp::Lit(_) | Regexp::Dot | Regexp::Range(..) => 1,
                        Regexp::Cat(..) => operand().saturating_add(operand()),
                        Regexp::Alt(..) => operand()
                            .saturating_add(operand())
                            .saturating_add(2),
                        Regexp::Quest(..) | Regexp::Plus(..) => operand().saturating_add(1),
                        Regexp::Star(..) => operand().saturating_add(2),
                        Regexp::Paren(_, Some(_)) if self.cg => operand().saturating_add(2),
                        Regexp::Paren(..) => operand(),
                    };
                    if Rc::strong_count(node) > 1 {
                        self.sizes.insert(Rc::as_ptr(node), size);
                    }
                    sizes.push(size);
                }
            }
        }
        sizes.pop().unwrap_or(0)
    }

    /// Appends the instructions for `root`. Forward targets are patched by
    /// the `Emit` entries queued behind the operands they jump over.
    fn emit(&mut self, root: &Node) {
        let mut work = vec![Emit::Node(root)];
        while let Some(step) = work.pop() {
            match step {
                Emit::Node(None) => {}
                Emit::Node(Some(node)) => match node.as_ref() {
                    Regexp::Lit(c) => {
                        self.push(Char(*c));
                    }
                    Regexp::Dot => {
                        self.push(Any);
                    }
                    Regexp::Range(lo, hi) => {
                        self.push(Rng(*lo, *hi));
                    }
                    Regexp::Cat(left, right) => {
                        work.push(Emit::Node(right));
                        work.push(Emit::Node(left));
                    }
                    Regexp::Alt(left, right) => {
                        // Patched by AltRight
                        let split = self.push(Split(0, 0));
                        work.push(Emit::AltRight { split, right });
                        work.push(Emit::Node(left));
                    }
                    Regexp::Quest(sub, greedy) => {
                        let split = self.push(Split(0, 0));
                        work.push(Emit::QuestEnd {
                            split,
                            greedy: *greedy,
                        });
                        work.push(Emit::Node(sub));
                    }
                    Regexp::Star(sub, greedy) => {
                        let split = self.push(Split(0, 0));
                        work.push(Emit::StarEnd {
                            split,
                            greedy: *greedy,
                        });
                        work.push(Emit::Node(sub));
                    }
                    Regexp::Plus(sub, greedy) => {
                        work.push(Emit::PlusEnd {
                            start: self.current_pc(),
                            greedy: *greedy,
                        });
                        work.push(Emit::Node(sub));
                    }
                    Regexp::Paren(sub, Some(index)) if self.cg => {
                        let slot = 2 * *index as usize;
                        self.push(Save(slot));
                        work.push(Emit::Close(slot + 1));
                        work.push(Emit::Node(sub));
                    }
                    Regexp::Paren(sub, _) => work.push(Emit::Node(sub)),
                },
                Emit::AltRight { split, right } => {
                    let jmp = self.push(Jmp(0));
                    self.insts[split] = Split(split + 1, self.current_pc());
                    work.push(Emit::AltEnd { jmp });
                    work.push(Emit::Node(right));
                }
                Emit::AltEnd { jmp } => self.insts[jmp] = Jmp(self.current_pc()),
                Emit::QuestEnd { split, greedy } => {
                    self.insts[split] = Self::split(split + 1, self.current_pc(), greedy);
                }
                Emit::StarEnd { split, greedy } => {
                    self.push(Jmp(split));
                    self.insts[split] = Self::split(split + 1, self.current_pc(), greedy);
                }
                Emit::PlusEnd { start, greedy } => {
                    let split = self.current_pc();
                    self.push(Self::split(start, split + 1, greedy));
                }
                Emit::Close(slot) => {
                    self.push(Save(slot));
                }
            }
        }
    }
}

/// Pending work of [`Compiler::count`].
enum Count<'a> {
    Enter(&'a Node),
    Leave(&'a Rc<Regexp>),
}

/// Pending work of [`Compiler::emit`].
enum Emit<'a> {
    Node(&'a Node),
    /// The left branch is done: jump over the right one and patch the split.
    AltRight { split: usize, right: &'a Node },
    AltEnd { jmp: usize },
    QuestEnd { split: usize, greedy: bool },
    StarEnd { split: usize, greedy: bool },
    PlusEnd { start: usize, greedy: bool },
    Close(usize),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Compiler, Inst};
    use crate::error::Error;
    use crate::regex::Config;
    use crate::syntax::parse;

    fn compile_with(pattern: &str, config: &Config) -> Result<super::Program, Error> {
        let ast = parse(pattern, config)?;
        Compiler::compile(ast, config)
    }

    macro_rules! assert_re_code {
        ($re:expr, $code:expr) => {{
            let program = compile_with($re, &Config::default()).unwrap();
            assert_eq!($code, program.to_string());
        }};
    }

    #[test]
    fn literal() {
        assert_re_code!(
            "ab",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: CHAR 'a'
00005: CHAR 'b'
00006: SAVE 1
00007: MATCH
"#
        );
    }

    #[test]
    fn alternation() {
        assert_re_code!(
            "a|[x-z]",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SPLIT 5, 7
00005: CHAR 'a'
00006: JMP 8
00007: RNG 'x'-'z'
00008: SAVE 1
00009: MATCH
"#
        );
    }

    #[test]
    fn nested_alternation() {
        assert_re_code!(
            "a|b|c",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SPLIT 5, 10
00005: SPLIT 6, 8
00006: CHAR 'a'
00007: JMP 9
00008: CHAR 'b'
00009: JMP 11
00010: CHAR 'c'
00011: SAVE 1
00012: MATCH
"#
        );
    }

    #[test]
    fn quest() {
        assert_re_code!(
            "a?.",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SPLIT 5, 6
00005: CHAR 'a'
00006: ANY
00007: SAVE 1
00008: MATCH
"#
        );
        assert_re_code!(
            "a??",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SPLIT 6, 5
00005: CHAR 'a'
00006: SAVE 1
00007: MATCH
"#
        );
    }

    #[test]
    fn star() {
        assert_re_code!(
            "a*",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SPLIT 5, 7
00005: CHAR 'a'
00006: JMP 4
00007: SAVE 1
00008: MATCH
"#
        );
        assert_re_code!(
            "a*?",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SPLIT 7, 5
00005: CHAR 'a'
00006: JMP 4
00007: SAVE 1
00008: MATCH
"#
        );
    }

    #[test]
    fn plus() {
        assert_re_code!(
            "(ab)+?",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: SAVE 2
00005: CHAR 'a'
00006: CHAR 'b'
00007: SAVE 3
00008: SPLIT 9, 4
00009: SAVE 1
00010: MATCH
"#
        );
    }

    #[test]
    fn groups_without_cg() {
        let config = Config {
            cg: false,
            ..Config::default()
        };
        let program = compile_with("(a)(:b)", &config).unwrap();
        assert_eq!(
            program.to_string(),
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: CHAR 'a'
00004: CHAR 'b'
00005: MATCH
"#
        );
        assert_eq!(program.anchored_start(), 3);
    }

    #[test]
    fn non_capturing_group_has_no_save() {
        assert_re_code!(
            "(:a)",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: CHAR 'a'
00005: SAVE 1
00006: MATCH
"#
        );
    }

    #[test]
    fn counted_repetition() {
        assert_re_code!(
            "a{1,3}",
            r#"00000: SPLIT 3, 1
00001: ANY
00002: JMP 0
00003: SAVE 0
00004: CHAR 'a'
00005: SPLIT 6, 9
00006: CHAR 'a'
00007: SPLIT 8, 9
00008: CHAR 'a'
00009: SAVE 1
00010: MATCH
"#
        );
    }

    #[test]
    fn empty_pattern() {
        let program = compile_with("", &Config::default()).unwrap();
        assert_eq!(program.len(), 6);
        assert_eq!(program.insts()[5], Inst::Match);
    }

    #[test]
    fn program_size_is_linear() {
        let program = compile_with("a{1000}", &Config::default()).unwrap();
        assert_eq!(program.len(), 3 + 2 + 1000 + 1);
        let program = compile_with("(a{0,1000}){0,1000}", &Config::default());
        assert!(matches!(program, Err(Error::TooLarge { .. })));
    }

    #[test]
    fn long_chains() {
        let program = compile_with(&"a".repeat(200_000), &Config::default()).unwrap();
        assert_eq!(program.len(), 3 + 2 + 200_000 + 1);

        let pattern = vec!["a"; 100_000].join("|");
        let program = compile_with(&pattern, &Config::default()).unwrap();
        assert_eq!(program.len(), 3 + 2 + 100_000 + 2 * 99_999 + 1);
        assert_eq!(program.insts()[4], Inst::Split(5, 3 * 99_999 + 4));
    }

    #[test]
    fn size_limit() {
        let config = Config {
            size_limit: 10,
            ..Config::default()
        };
        assert!(compile_with("abcd", &config).is_ok());
        assert_eq!(
            compile_with("abcde", &config).unwrap_err(),
            Error::TooLarge {
                size: 11,
                limit: 10
            }
        );
    }
}
