//! Generated token streams.

use eci_core::types::WindowBounds;

/// The generated tokens of one sequence, one string per token position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenStream {
    tokens: Vec<String>,
}

impl TokenStream {
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Whitespace tokenization.
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens covered by `bounds`, clipped to the stream.
    pub fn slice(&self, bounds: WindowBounds) -> &[String] {
        let end = bounds.end.min(self.tokens.len());
        let start = bounds.start.min(end);
        &self.tokens[start..end]
    }

    /// Window text: the window's tokens joined by single spaces.
    pub fn window_text(&self, bounds: WindowBounds) -> String {
        self.slice(bounds).join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_and_slice() {
        let stream = TokenStream::from_text("the  cat\tsat on\nthe mat");
        assert_eq!(stream.len(), 6);
        assert_eq!(stream.window_text(WindowBounds::new(1, 4)), "cat sat on");
        assert_eq!(stream.slice(WindowBounds::new(4, 100)).len(), 2);
        assert!(stream.slice(WindowBounds::new(10, 12)).is_empty());
    }
}
