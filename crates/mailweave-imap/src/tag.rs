//! Command tag generation.

/// Generates the sequential tags that match commands with their tagged
/// completion responses ("A0000", "A0001", ...).
#[derive(Debug, Default)]
pub struct TagGenerator {
    counter: u32,
}

impl TagGenerator {
    /// Creates a new generator starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    /// Returns the next tag.
    pub fn next_tag(&mut self) -> String {
        let tag = format!("A{:04}", self.counter);
        self.counter = self.counter.wrapping_add(1);
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_sequential() {
        let mut generator = TagGenerator::new();
        assert_eq!(generator.next_tag(), "A0000");
        assert_eq!(generator.next_tag(), "A0001");
        assert_eq!(generator.next_tag(), "A0002");
    }
}
