//! Types and API for Regex matching
//!
//! This module defines the [`Regex`] struct, a compiled pattern paired with
//! the text it was compiled from, and the [`Builder`] used to tune how the
//! pattern is compiled.

use std::fmt;

use log::{debug, trace};

use crate::error::Error;
use crate::syntax;
use crate::thompson::bytecode::{Compiler, Program};
use crate::thompson::pike_vm::PikeVM;
use crate::util::Input;

/// A regular expression
///
/// Matching is unanchored: `Regex::new("abc")` matches any subject that
/// contains `abc`. The compiled program is never modified by a search, a
/// `Regex` can be shared freely between threads.
#[derive(Clone)]
pub struct Regex {
    pattern: String,
    vm: PikeVM,
    capture_count: usize,
}

impl Regex {
    /// Compiles `pattern` with the default [`Config`].
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Builder::new(pattern).build()
    }

    /// Returns true whenever the pattern occurs in the input.
    pub fn is_match<'s>(&self, input: impl Into<Input<'s>>) -> bool {
        let mut state = self.vm.new_state();
        self.vm.exec(input.into(), &mut state)
    }

    /// Same as [`Regex::is_match`], but returns [`Error::OutOfMemory`]
    /// if the search state can't be allocated.
    pub fn try_is_match<'s>(&self, input: impl Into<Input<'s>>) -> Result<bool, Error> {
        let mut state = self.vm.try_new_state()?;
        Ok(self.vm.exec(input.into(), &mut state))
    }

    /// Returns true if the whole subject matches the pattern.
    pub fn is_full_match(&self, subject: &str) -> bool {
        self.is_match(Input::new(subject).anchored(true).anchored_end(true))
    }

    /// The pattern this regex was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn program(&self) -> &Program {
        self.vm.program()
    }

    /// Number of capturing groups, including the implicit group around the
    /// whole pattern.
    pub fn captures_len(&self) -> usize {
        self.capture_count
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.pattern).finish()
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl std::str::FromStr for Regex {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Self, Error> {
        Regex::new(pattern)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Emit `SAVE` instructions for capturing groups.
    pub cg: bool,
    /// Maximum depth of nested groups.
    pub nest_limit: u32,
    /// Maximum value accepted for `m` and `n` in `{m,n}`.
    pub repeat_limit: u32,
    /// Maximum number of instructions in a compiled program.
    pub size_limit: usize,
    /// Reserved. No flag is recognized yet.
    pub flags: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cg: true,
            nest_limit: 250,
            repeat_limit: 1000,
            size_limit: 1 << 20,
            flags: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Builder<'s> {
    pattern: &'s str,
    config: Config,
}

impl<'s> Builder<'s> {
    pub fn new(pattern: &'s str) -> Self {
        Self {
            pattern,
            config: Config::default(),
        }
    }

    pub fn cg(mut self, value: bool) -> Self {
        self.config.cg = value;
        self
    }

    pub fn nest_limit(mut self, value: u32) -> Self {
        self.config.nest_limit = value;
        self
    }

    pub fn repeat_limit(mut self, value: u32) -> Self {
        self.config.repeat_limit = value;
        self
    }

    pub fn size_limit(mut self, value: usize) -> Self {
        self.config.size_limit = value;
        self
    }

    pub fn flags(mut self, value: u32) -> Self {
        self.config.flags = value;
        self
    }

    pub fn build(self) -> Result<Regex, Error> {
        if self.config.flags != 0 {
            debug!("ignoring reserved flags {:#x}", self.config.flags);
        }

        let ast = syntax::parse(self.pattern, &self.config)?;
        trace!("AST for {:?}: {ast}", self.pattern);

        let capture_count = if self.config.cg {
            ast.captures as usize + 1
        } else {
            1
        };
        let program = Compiler::compile(ast, &self.config)?;
        debug!(
            "compiled {:?} into {} instructions",
            self.pattern,
            program.len()
        );
        trace!("program for {:?}:\n{program}", self.pattern);

        Ok(Regex {
            pattern: self.pattern.to_owned(),
            vm: PikeVM::new(program),
            capture_count,
        })
    }
}
