//! Tokenizer for pattern text.
//!
//! The lexer is a single pass over the pattern with four sub-states. Inside
//! a character class the first character is always a literal (so `[]a]` is
//! a class containing `]` and `a`), and `-` is a range separator unless it
//! is the last character before the closing `]`. Inside `{...}` only digits
//! and `,` are accepted.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{SyntaxError, SyntaxErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Literal(char),
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Alt,
    Star,
    Plus,
    Ques,
    Dot,
    RangeSep,
    Integer(u32),
    Comma,
    EndOfInput,
}

impl TokenKind {
    /// Human readable name, used in syntax error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            TokenKind::Literal(_) => "literal",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Alt => "'|'",
            TokenKind::Star => "'*'",
            TokenKind::Plus => "'+'",
            TokenKind::Ques => "'?'",
            TokenKind::Dot => "'.'",
            TokenKind::RangeSep => "'-'",
            TokenKind::Integer(_) => "integer",
            TokenKind::Comma => "','",
            TokenKind::EndOfInput => "end of pattern",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Normal,
    BracketFirst,
    Bracket,
    Brace,
}

pub(crate) struct Lexer<'p> {
    chars: Peekable<CharIndices<'p>>,
    len: usize,
    state: LexState,
    after_lparen: bool,
}

impl<'p> Lexer<'p> {
    pub(crate) fn new(pattern: &'p str) -> Self {
        Self {
            chars: pattern.char_indices().peekable(),
            len: pattern.len(),
            state: LexState::Normal,
            after_lparen: false,
        }
    }

    /// Returns the next token. Once the pattern is exhausted this keeps
    /// returning [`TokenKind::EndOfInput`].
    pub(crate) fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let after_lparen = std::mem::take(&mut self.after_lparen);

        let Some((offset, c)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::EndOfInput,
                offset: self.len,
            });
        };

        let kind = match self.state {
            LexState::Normal => match c {
                '\\' => TokenKind::Literal(self.escaped(offset)?),
                '[' => {
                    self.state = LexState::BracketFirst;
                    TokenKind::LBracket
                }
                ']' => TokenKind::RBracket,
                '(' => {
                    self.after_lparen = true;
                    TokenKind::LParen
                }
                ')' => TokenKind::RParen,
                '{' => {
                    self.state = LexState::Brace;
                    TokenKind::LBrace
                }
                '}' => TokenKind::RBrace,
                '|' => TokenKind::Alt,
                '*' => TokenKind::Star,
                '+' => TokenKind::Plus,
                '?' => TokenKind::Ques,
                '.' => TokenKind::Dot,
                ':' if after_lparen => TokenKind::Colon,
                c => TokenKind::Literal(c),
            },
            LexState::BracketFirst => {
                self.state = LexState::Bracket;
                match c {
                    '\\' => TokenKind::Literal(self.escaped(offset)?),
                    c => TokenKind::Literal(c),
                }
            }
            LexState::Bracket => match c {
                '\\' => TokenKind::Literal(self.escaped(offset)?),
                ']' => {
                    self.state = LexState::Normal;
                    TokenKind::RBracket
                }
                '-' => match self.chars.peek() {
                    Some((_, ']')) => TokenKind::Literal('-'),
                    _ => TokenKind::RangeSep,
                },
                c => TokenKind::Literal(c),
            },
            LexState::Brace => match c {
                '}' => {
                    self.state = LexState::Normal;
                    TokenKind::RBrace
                }
                ',' => TokenKind::Comma,
                '0'..='9' => TokenKind::Integer(self.integer(c, offset)?),
                c => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::InvalidRepetitionChar(c),
                        offset,
                    ));
                }
            },
        };

        Ok(Token { kind, offset })
    }

    fn escaped(&mut self, offset: usize) -> Result<char, SyntaxError> {
        match self.chars.next() {
            Some((_, c)) => Ok(c),
            None => Err(SyntaxError::new(SyntaxErrorKind::DanglingEscape, offset)),
        }
    }

    fn integer(&mut self, first: char, offset: usize) -> Result<u32, SyntaxError> {
        let mut value = digit(first);
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.chars.next();
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit(c)))
                .ok_or_else(|| {
                    SyntaxError::new(SyntaxErrorKind::RepetitionTooLarge(u32::MAX), offset)
                })?;
        }
        Ok(value)
    }
}

fn digit(c: char) -> u32 {
    c as u32 - '0' as u32
}
