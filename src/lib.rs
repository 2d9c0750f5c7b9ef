/*!
A regular expression engine based on Thompson's construction.

A pattern is tokenized and parsed into an AST, counted repetitions are
rewritten into `?`, `*` and `+`, and the result is compiled into a flat
program for a Pike VM that runs every alternative in lock step. Searching
takes time proportional to the program size times the subject length, there
is no input that makes it backtrack exponentially.

```
use tregex::Regex;

let re = Regex::new("a(:b|c){2,3}d").unwrap();
assert!(re.is_match("xxabcbdxx"));
assert!(!re.is_match("xxabdxx"));
```

Supported syntax: literals, `\` escapes, `.`, bracket expressions with
ranges (`[a-z]`, with `]` literal right after `[`), capturing groups `(...)`,
non-capturing groups `(:...)`, `*`, `+`, `?`, `{m}`, `{m,}`, `{m,n}`,
`{,n}`, lazy variants with a trailing `?`, and `|`. Matching is leftmost
first and unanchored.

`.` matches any character, including `\0`; only the end of the subject
stops it.
*/

pub mod api;
mod error;
pub mod regex;
pub mod syntax;
pub mod thompson;
pub mod util;

pub use error::{Error, SyntaxError, SyntaxErrorKind};
pub use regex::{Builder, Config, Regex};
pub use util::Input;

/// Compiles `pattern` with the default configuration.
pub fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern)
}
