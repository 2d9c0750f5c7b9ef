/*!
Types shared by the matching entry points.
*/

/// Defines the input parameter to the matching methods on a
/// [`crate::Regex`]. Since all values other than subject have a default value
/// it's always sufficient to only provide the subject string, but for cases
/// where we need more control (like checking a whole string) this type comes
/// handy.
#[derive(Clone, Copy, Debug)]
pub struct Input<'s> {
    /// The subject string against which the regex is matched.
    pub subject: &'s str,
    /// Whether the match must start at the beginning of the subject.
    /// Default: false
    pub anchored: bool,
    /// Whether the match must end at the end of the subject.
    /// Default: false
    pub anchored_end: bool,
}

impl<'s> Input<'s> {
    pub fn new(subject: &'s str) -> Self {
        Self {
            subject,
            anchored: false,
            anchored_end: false,
        }
    }

    pub fn anchored(mut self, value: bool) -> Self {
        self.anchored = value;
        self
    }

    pub fn anchored_end(mut self, value: bool) -> Self {
        self.anchored_end = value;
        self
    }
}

impl<'s> From<&'s str> for Input<'s> {
    fn from(subject: &'s str) -> Self {
        Self::new(subject)
    }
}

impl<'s> From<&'s String> for Input<'s> {
    fn from(subject: &'s String) -> Self {
        Self::new(subject.as_str())
    }
}
