//! Recursive descent parser turning a token stream into an [`Ast`].
//!
//! Precedence, from loosest to tightest: alternation, concatenation,
//! quantifiers. Counted repetitions are reduced right away by
//! [`simplify::repeat`], the compiler never sees them.

use log::debug;

use super::ast::{Ast, Node, Regexp};
use super::lexer::{Lexer, Token, TokenKind};
use super::simplify;
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::regex::Config;

/// Parses `pattern`. On error every node built so far is released before
/// returning.
pub fn parse(pattern: &str, config: &Config) -> Result<Ast, SyntaxError> {
    let result = Parser::new(pattern, config).and_then(|mut parser| {
        let root = parser.parse_alt()?;
        match parser.token.kind {
            TokenKind::EndOfInput => Ok(Ast {
                root,
                captures: parser.next_group - 1,
            }),
            TokenKind::RParen => Err(parser.error(SyntaxErrorKind::UnopenedParen)),
            other => Err(parser.error(SyntaxErrorKind::Unexpected(other.describe()))),
        }
    });
    if let Err(err) = &result {
        debug!("failed to parse {pattern:?}: {err}");
    }
    result
}

struct Parser<'p> {
    lexer: Lexer<'p>,
    token: Token,
    /// Index for the next capturing group. Group 0 is the whole pattern.
    next_group: u32,
    depth: u32,
    nest_limit: u32,
    repeat_limit: u32,
}

impl<'p> Parser<'p> {
    fn new(pattern: &'p str, config: &Config) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(pattern);
        let token = lexer.next_token()?;
        Ok(Self {
            lexer,
            token,
            next_group: 1,
            depth: 0,
            nest_limit: config.nest_limit,
            repeat_limit: config.repeat_limit,
        })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.token.offset)
    }

    fn unexpected(&self) -> SyntaxError {
        self.error(SyntaxErrorKind::Unexpected(self.token.kind.describe()))
    }

    fn parse_alt(&mut self) -> Result<Node, SyntaxError> {
        let mut left = self.parse_cat()?;
        while self.token.kind == TokenKind::Alt {
            self.advance()?;
            let right = self.parse_cat()?;
            left = Regexp::alt(left, right);
        }
        Ok(left)
    }

    fn parse_cat(&mut self) -> Result<Node, SyntaxError> {
        let mut result = None;
        loop {
            match self.token.kind {
                TokenKind::Literal(_)
                | TokenKind::Dot
                | TokenKind::LParen
                | TokenKind::LBracket => {
                    let atom = self.parse_atom()?;
                    let repeated = self.parse_quantifiers(atom)?;
                    result = Regexp::cat(result, repeated);
                }
                TokenKind::Star | TokenKind::Plus | TokenKind::Ques | TokenKind::LBrace => {
                    return Err(self.error(SyntaxErrorKind::MissingOperand));
                }
                _ => return Ok(result),
            }
        }
    }

    fn parse_quantifiers(&mut self, mut node: Node) -> Result<Node, SyntaxError> {
        loop {
            let kind = self.token.kind;
            let (min, max) = match kind {
                TokenKind::Star => (0, None),
                TokenKind::Plus => (1, None),
                TokenKind::Ques => (0, Some(1)),
                TokenKind::LBrace => self.parse_counts()?,
                _ => return Ok(node),
            };
            if kind != TokenKind::LBrace {
                self.advance()?;
            }
            let greedy = if self.token.kind == TokenKind::Ques {
                self.advance()?;
                false
            } else {
                true
            };
            node = match kind {
                TokenKind::Star => Regexp::star(node, greedy),
                TokenKind::Plus => Regexp::plus(node, greedy),
                TokenKind::Ques => Regexp::quest(node, greedy),
                _ => simplify::repeat(node, min, max, greedy),
            };
        }
    }

    /// Parses `{m}`, `{m,}`, `{m,n}` or `{,n}`, leaving the token after the
    /// closing brace as lookahead.
    fn parse_counts(&mut self) -> Result<(u32, Option<u32>), SyntaxError> {
        let start = self.token.offset;
        self.advance()?;

        let min = match self.token.kind {
            TokenKind::Integer(n) => {
                self.advance()?;
                Some(n)
            }
            _ => None,
        };

        let max = match self.token.kind {
            TokenKind::Comma => {
                self.advance()?;
                match self.token.kind {
                    TokenKind::Integer(n) => {
                        self.advance()?;
                        Some(n)
                    }
                    _ => None,
                }
            }
            _ if min.is_some() => min,
            _ => None,
        };

        match self.token.kind {
            TokenKind::RBrace => self.advance()?,
            TokenKind::EndOfInput => {
                return Err(SyntaxError::new(SyntaxErrorKind::UnclosedBrace, start));
            }
            _ => return Err(self.unexpected()),
        }

        let error = |kind| Err(SyntaxError::new(kind, start));
        let limit = self.repeat_limit;
        match (min, max) {
            (None, None) => error(SyntaxErrorKind::EmptyRepetition),
            (Some(n), _) | (_, Some(n)) if n > limit => {
                error(SyntaxErrorKind::RepetitionTooLarge(limit))
            }
            (Some(min), Some(max)) if min > max => {
                error(SyntaxErrorKind::InvalidRepetition(min, max))
            }
            (min, max) => Ok((min.unwrap_or(0), max)),
        }
    }

    fn parse_atom(&mut self) -> Result<Node, SyntaxError> {
        match self.token.kind {
            TokenKind::Literal(c) => {
                self.advance()?;
                Ok(Regexp::lit(c))
            }
            TokenKind::Dot => {
                self.advance()?;
                Ok(Regexp::dot())
            }
            TokenKind::LParen => self.parse_group(),
            TokenKind::LBracket => self.parse_class(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_group(&mut self) -> Result<Node, SyntaxError> {
        let start = self.token.offset;
        if self.depth >= self.nest_limit {
            return Err(self.error(SyntaxErrorKind::NestTooDeep(self.nest_limit)));
        }
        self.advance()?;

        let index = if self.token.kind == TokenKind::Colon {
            self.advance()?;
            None
        } else {
            let index = self.next_group;
            self.next_group += 1;
            Some(index)
        };

        self.depth += 1;
        let sub = self.parse_alt()?;
        self.depth -= 1;

        match self.token.kind {
            TokenKind::RParen => {
                self.advance()?;
                Ok(Regexp::paren(sub, index))
            }
            TokenKind::EndOfInput => Err(SyntaxError::new(SyntaxErrorKind::UnclosedParen, start)),
            _ => Err(self.unexpected()),
        }
    }

    /// A bracket expression becomes an alternation of its items, each item
    /// being either a literal or a range.
    fn parse_class(&mut self) -> Result<Node, SyntaxError> {
        let start = self.token.offset;
        self.advance()?;

        let mut class: Node = None;
        loop {
            let item = match self.token.kind {
                TokenKind::Literal(lo) => {
                    self.advance()?;
                    if self.token.kind == TokenKind::RangeSep {
                        self.advance()?;
                        let TokenKind::Literal(hi) = self.token.kind else {
                            return match self.token.kind {
                                TokenKind::EndOfInput => {
                                    Err(SyntaxError::new(SyntaxErrorKind::UnclosedBracket, start))
                                }
                                _ => Err(self.unexpected()),
                            };
                        };
                        if lo > hi {
                            return Err(self.error(SyntaxErrorKind::InvalidRange(lo, hi)));
                        }
                        self.advance()?;
                        Regexp::range(lo, hi)
                    } else {
                        Regexp::lit(lo)
                    }
                }
                TokenKind::RBracket => {
                    self.advance()?;
                    return Ok(class);
                }
                TokenKind::EndOfInput => {
                    return Err(SyntaxError::new(SyntaxErrorKind::UnclosedBracket, start));
                }
                _ => return Err(self.unexpected()),
            };
            class = match class {
                None => item,
                class => Regexp::alt(class, item),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::parse;
    use crate::error::{SyntaxError, SyntaxErrorKind};
    use crate::regex::Config;

    fn ast(pattern: &str) -> String {
        parse(pattern, &Config::default()).unwrap().to_string()
    }

    fn err(pattern: &str) -> SyntaxError {
        parse(pattern, &Config::default()).unwrap_err()
    }

    #[test]
    fn precedence() {
        assert_eq!(ast("ab|c"), "Alt(Cat(Lit(a), Lit(b)), Lit(c))");
        assert_eq!(ast("ab*"), "Cat(Lit(a), Star(Lit(b)))");
        assert_eq!(ast("(ab)*"), "Star(Paren#1(Cat(Lit(a), Lit(b))))");
        assert_eq!(ast("a|b|c"), "Alt(Alt(Lit(a), Lit(b)), Lit(c))");
    }

    #[test]
    fn lazy_quantifiers() {
        assert_eq!(ast("a*?"), "NgStar(Lit(a))");
        assert_eq!(ast("a+?"), "NgPlus(Lit(a))");
        assert_eq!(ast("a??"), "NgQuest(Lit(a))");
        assert_eq!(ast("a*??"), "Quest(NgStar(Lit(a)))");
        assert_eq!(ast("a*???"), "NgQuest(NgStar(Lit(a)))");
        assert_eq!(ast("a{0,2}?"), "NgQuest(Cat(Lit(a), NgQuest(Lit(a))))");
    }

    #[test]
    fn groups() {
        let parsed = parse("(a)(:b)((c))", &Config::default()).unwrap();
        assert_eq!(parsed.captures, 3);
        assert_eq!(
            parsed.to_string(),
            "Cat(Cat(Paren#1(Lit(a)), Paren(Lit(b))), Paren#2(Paren#3(Lit(c))))"
        );
    }

    #[test]
    fn empty_expressions() {
        assert_eq!(ast(""), "Empty");
        assert_eq!(ast("()"), "Paren#1(Empty)");
        assert_eq!(ast("a|"), "Alt(Lit(a), Empty)");
        assert_eq!(ast("a{0}b"), "Lit(b)");
    }

    #[test]
    fn classes() {
        assert_eq!(ast("[]a]"), "Alt(Lit(]), Lit(a))");
        assert_eq!(ast("[a-z0]"), "Alt(Range(a, z), Lit(0))");
        assert_eq!(ast("[a-]"), "Alt(Lit(a), Lit(-))");
        assert_eq!(ast("[|(]"), "Alt(Lit(|), Lit(())");
    }

    #[test]
    fn counted_repetitions() {
        assert_eq!(ast("a{2}"), "Cat(Lit(a), Lit(a))");
        assert_eq!(ast("a{2,}"), "Cat(Lit(a), Plus(Lit(a)))");
        assert_eq!(ast("a{,2}"), "Quest(Cat(Lit(a), Quest(Lit(a))))");
        assert_eq!(ast("a{1,2}"), "Cat(Lit(a), Quest(Lit(a)))");
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(err("a("), SyntaxError::new(SyntaxErrorKind::UnclosedParen, 1));
        assert_eq!(err("a)"), SyntaxError::new(SyntaxErrorKind::UnopenedParen, 1));
        assert_eq!(
            err("a{2,1}"),
            SyntaxError::new(SyntaxErrorKind::InvalidRepetition(2, 1), 1)
        );
        assert_eq!(err("a\\"), SyntaxError::new(SyntaxErrorKind::DanglingEscape, 1));
        assert_eq!(err("*a"), SyntaxError::new(SyntaxErrorKind::MissingOperand, 0));
        assert_eq!(err("a|+"), SyntaxError::new(SyntaxErrorKind::MissingOperand, 2));
        assert_eq!(err("[ab"), SyntaxError::new(SyntaxErrorKind::UnclosedBracket, 0));
        assert_eq!(err("[]"), SyntaxError::new(SyntaxErrorKind::UnclosedBracket, 0));
        assert_eq!(
            err("[z-a]"),
            SyntaxError::new(SyntaxErrorKind::InvalidRange('z', 'a'), 3)
        );
        assert_eq!(err("a{}"), SyntaxError::new(SyntaxErrorKind::EmptyRepetition, 1));
        assert_eq!(err("a{,}"), SyntaxError::new(SyntaxErrorKind::EmptyRepetition, 1));
        assert_eq!(err("a{2"), SyntaxError::new(SyntaxErrorKind::UnclosedBrace, 1));
        assert_eq!(err("a]").kind, SyntaxErrorKind::Unexpected("']'"));
        assert_eq!(err("a}").kind, SyntaxErrorKind::Unexpected("'}'"));
        assert_eq!(
            err("a{1001}"),
            SyntaxError::new(SyntaxErrorKind::RepetitionTooLarge(1000), 1)
        );
    }

    #[test]
    fn nest_limit() {
        let config = Config {
            nest_limit: 3,
            ..Config::default()
        };
        assert!(parse("(((a)))", &config).is_ok());
        assert_eq!(
            parse("((((a))))", &config).unwrap_err(),
            SyntaxError::new(SyntaxErrorKind::NestTooDeep(3), 3)
        );
    }
}
