/*!
Pattern syntax: lexer, parser, the AST they produce and the rewrite that
turns counted repetitions into primitive quantifiers.

```text
alt    := cat ('|' cat)*
cat    := repeat*
repeat := atom (('*' | '+' | '?' | '{' counts '}') '?'?)*
atom   := literal | '.' | '(' ':'? alt ')' | '[' item+ ']'
```
*/

pub mod ast;
mod lexer;
pub mod parser;
mod simplify;

pub use parser::parse;
