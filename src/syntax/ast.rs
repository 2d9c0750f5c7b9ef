//! Abstract syntax tree produced by the parser.
//!
//! Nodes are shared through [`Rc`]: bounded repetitions like `x{3,5}` reuse
//! the same operand node several times instead of deep copying it, so once
//! the simplifier has run the tree is really a DAG. A node is released when
//! its last reference goes away.
//!
//! The empty expression (what `()` contains, or what `x{0}` reduces to) is
//! represented as `None`.

use std::fmt;
use std::rc::Rc;

/// A possibly empty expression.
pub type Node = Option<Rc<Regexp>>;

#[derive(Debug)]
pub enum Regexp {
    Alt(Node, Node),
    Cat(Node, Node),
    Lit(char),
    Dot,
    Range(char, char),
    Quest(Node, bool),
    Star(Node, bool),
    Plus(Node, bool),
    /// A group. Capturing groups carry their index, non-capturing ones
    /// carry `None`.
    Paren(Node, Option<u32>),
}

impl Regexp {
    pub fn lit(c: char) -> Node {
        Some(Rc::new(Regexp::Lit(c)))
    }

    pub fn dot() -> Node {
        Some(Rc::new(Regexp::Dot))
    }

    pub fn range(lo: char, hi: char) -> Node {
        Some(Rc::new(Regexp::Range(lo, hi)))
    }

    pub fn alt(left: Node, right: Node) -> Node {
        Some(Rc::new(Regexp::Alt(left, right)))
    }

    /// Concatenation. Concatenating with the empty expression is a no-op.
    pub fn cat(left: Node, right: Node) -> Node {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (left, right) => Some(Rc::new(Regexp::Cat(left, right))),
        }
    }

    pub fn quest(sub: Node, greedy: bool) -> Node {
        sub.map(|sub| Rc::new(Regexp::Quest(Some(sub), greedy)))
    }

    pub fn star(sub: Node, greedy: bool) -> Node {
        sub.map(|sub| Rc::new(Regexp::Star(Some(sub), greedy)))
    }

    pub fn plus(sub: Node, greedy: bool) -> Node {
        sub.map(|sub| Rc::new(Regexp::Plus(Some(sub), greedy)))
    }

    pub fn paren(sub: Node, index: Option<u32>) -> Node {
        Some(Rc::new(Regexp::Paren(sub, index)))
    }

    /// Moves this node's children into `stack`, leaving it childless.
    fn take_children(&mut self, stack: &mut Vec<Rc<Regexp>>) {
        match self {
            Regexp::Alt(left, right) | Regexp::Cat(left, right) => {
                stack.extend(left.take());
                stack.extend(right.take());
            }
            Regexp::Quest(sub, _)
            | Regexp::Star(sub, _)
            | Regexp::Plus(sub, _)
            | Regexp::Paren(sub, _) => stack.extend(sub.take()),
            Regexp::Lit(_) | Regexp::Dot | Regexp::Range(..) => {}
        }
    }
}

/// Drops deeply nested trees without recursing once per level. Children
/// that are still shared elsewhere only lose one reference.
impl Drop for Regexp {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(node) = stack.pop() {
            if let Some(mut node) = Rc::into_inner(node) {
                node.take_children(&mut stack);
            }
        }
    }
}

impl fmt::Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tree(f, self)
    }
}

enum Piece<'a> {
    Node(&'a Node),
    Text(&'static str),
}

/// Writes `root` in prefix form. The work stack holds what remains to be
/// written, so deep chains don't grow the call stack.
fn write_tree(f: &mut fmt::Formatter<'_>, root: &Regexp) -> fmt::Result {
    let lazy = |greedy: &bool| if *greedy { "" } else { "Ng" };
    let mut work = Vec::new();
    let mut next = Some(root);
    loop {
        if let Some(node) = next.take() {
            match node {
                Regexp::Alt(left, right) | Regexp::Cat(left, right) => {
                    let name = if matches!(node, Regexp::Alt(..)) { "Alt" } else { "Cat" };
                    write!(f, "{name}(")?;
                    work.push(Piece::Text(")"));
                    work.push(Piece::Node(right));
                    work.push(Piece::Text(", "));
                    work.push(Piece::Node(left));
                }
                Regexp::Lit(c) => write!(f, "Lit({c})")?,
                Regexp::Dot => write!(f, "Dot")?,
                Regexp::Range(lo, hi) => write!(f, "Range({lo}, {hi})")?,
                Regexp::Quest(sub, greedy) => {
                    write!(f, "{}Quest(", lazy(greedy))?;
                    work.push(Piece::Text(")"));
                    work.push(Piece::Node(sub));
                }
                Regexp::Star(sub, greedy) => {
                    write!(f, "{}Star(", lazy(greedy))?;
                    work.push(Piece::Text(")"));
                    work.push(Piece::Node(sub));
                }
                Regexp::Plus(sub, greedy) => {
                    write!(f, "{}Plus(", lazy(greedy))?;
                    work.push(Piece::Text(")"));
                    work.push(Piece::Node(sub));
                }
                Regexp::Paren(sub, index) => {
                    match index {
                        Some(index) => write!(f, "Paren#{index}(")?,
                        None => write!(f, "Paren(")?,
                    }
                    work.push(Piece::Text(")"));
                    work.push(Piece::Node(sub));
                }
            }
        }
        match work.pop() {
            Some(Piece::Node(Some(node))) => next = Some(node.as_ref()),
            Some(Piece::Node(None)) => f.write_str("Empty")?,
            Some(Piece::Text(text)) => f.write_str(text)?,
            None => return Ok(()),
        }
    }
}

struct Show<'a>(&'a Node);

impl fmt::Display for Show<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(node) => write!(f, "{node}"),
            None => write!(f, "Empty"),
        }
    }
}

/// The result of parsing a pattern.
#[derive(Debug)]
pub struct Ast {
    pub root: Node,
    /// Number of capturing groups written in the pattern, not counting the
    /// implicit group around the whole pattern.
    pub captures: u32,
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Show(&self.root))
    }
}
