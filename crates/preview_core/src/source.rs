use std::fmt;
use std::sync::Arc;

/// Immutable snapshot of the editable text at one instant.
///
/// Cloning is cheap; a new edit produces a new snapshot rather than mutating
/// an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceText(Arc<str>);

impl SourceText {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Sequence number of a triggered run. Tokens are allocated in start order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunToken(u64);

impl RunToken {
    pub const FIRST: RunToken = RunToken(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{RunToken, SourceText};

    #[test]
    fn snapshots_compare_by_content() {
        let a = SourceText::from("fn main() {}");
        let b = SourceText::from(String::from("fn main() {}"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(SourceText::default().is_empty());
    }

    #[test]
    fn tokens_increase() {
        let first = RunToken::FIRST;
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "#2");
    }
}
