//! Rewrites counted repetitions into the primitive quantifiers.
//!
//! `x{min,max}` becomes `min` copies of `x` followed by a right-nested
//! chain of `max - min` optional copies, `x(x(x)?)?` for three of them.
//! Every copy is the same shared node, the compiler expands it.

use super::ast::{Node, Regexp};

/// Reduces `sub{min,max}` to an equivalent expression. `max == None` means
/// unbounded. The laziness of the repetition is applied to every quantifier
/// generated for it.
///
/// Panics if `max < min`; the parser rejects such bounds before getting here.
pub(crate) fn repeat(sub: Node, min: u32, max: Option<u32>, greedy: bool) -> Node {
    if sub.is_none() {
        return None;
    }
    match (min, max) {
        (0, None) => Regexp::star(sub, greedy),
        (1, None) => Regexp::plus(sub, greedy),
        (min, None) => {
            let prefix = copies(&sub, min - 1);
            Regexp::cat(prefix, Regexp::plus(sub, greedy))
        }
        (0, Some(0)) => None,
        (1, Some(1)) => sub,
        (min, Some(max)) if min <= max => {
            let mut optional: Node = None;
            for _ in min..max {
                optional = Regexp::quest(Regexp::cat(sub.clone(), optional), greedy);
            }
            Regexp::cat(copies(&sub, min), optional)
        }
        (min, Some(max)) => unreachable!("malformed repetition {{{min},{max}}}"),
    }
}

fn copies(sub: &Node, n: u32) -> Node {
    let mut result = None;
    for _ in 0..n {
        result = Regexp::cat(result, sub.clone());
    }
    result
}
