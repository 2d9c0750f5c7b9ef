//! Handle style entry points.
//!
//! These mirror a C-like interface where the pattern, the subject or the
//! handle itself may be missing. Missing inputs are reported as errors,
//! never confused with a failed match.

use crate::error::Error;
use crate::regex::{Builder, Regex};

/// Outcome of [`matches`]. Converts to the integers `1`, `0` and `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum MatchStatus {
    Matched = 1,
    NotMatched = 0,
    Error = -1,
}

impl From<MatchStatus> for i32 {
    fn from(status: MatchStatus) -> Self {
        status as i32
    }
}

impl From<bool> for MatchStatus {
    fn from(matched: bool) -> Self {
        if matched {
            MatchStatus::Matched
        } else {
            MatchStatus::NotMatched
        }
    }
}

/// Compiles `pattern`. `flags` is reserved, no value is recognized yet.
pub fn compile(pattern: Option<&str>, flags: u32) -> Result<Regex, Error> {
    let pattern = pattern.ok_or(Error::NullPattern)?;
    Builder::new(pattern).flags(flags).build()
}

/// Searches `subject` with the compiled `handle`.
pub fn matches(handle: Option<&Regex>, subject: Option<&str>) -> MatchStatus {
    let (Some(handle), Some(subject)) = (handle, subject) else {
        return MatchStatus::Error;
    };
    match handle.try_is_match(subject) {
        Ok(matched) => matched.into(),
        Err(_) => MatchStatus::Error,
    }
}

/// The text `handle` was compiled from. Lives as long as the handle.
pub fn text(handle: Option<&Regex>) -> Option<&str> {
    handle.map(Regex::as_str)
}

/// Releases the compiled program and the pattern text.
pub fn free(handle: Regex) {
    drop(handle)
}
