use std::fmt;

/// Bounded text capture of the call stack at the moment a panic was caught.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot(String);

impl StackSnapshot {
    /// Upper bound on the captured text, in bytes.
    pub const MAX_BYTES: usize = 2048;

    /// Wrap stack text, truncating it on a char boundary to [`Self::MAX_BYTES`].
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if text.len() > Self::MAX_BYTES {
            let mut end = Self::MAX_BYTES;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_kept_verbatim() {
        let snapshot = StackSnapshot::new("0: main\n1: start");
        assert_eq!(snapshot.as_str(), "0: main\n1: start");
    }

    #[test]
    fn test_truncates_to_bound() {
        let snapshot = StackSnapshot::new("x".repeat(5000));
        assert_eq!(snapshot.as_str().len(), StackSnapshot::MAX_BYTES);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'é' is two bytes; an odd prefix pushes the limit mid-character.
        let text = format!("a{}", "é".repeat(2000));
        let snapshot = StackSnapshot::new(text);
        assert!(snapshot.as_str().len() <= StackSnapshot::MAX_BYTES);
        assert_eq!(snapshot.as_str().len(), StackSnapshot::MAX_BYTES - 1);
    }
}
