use aurora_core::constants::DEFAULT_SUMMARY_LENGTH;
use aurora_core::Summarizer;

/// Cuts long text at a word boundary near the limit and appends `...`.
#[derive(Debug, Clone)]
pub struct TruncatingSummarizer {
    max_chars: usize,
    /// Only back off to a space that lies past this many chars
    min_boundary: usize,
}

impl TruncatingSummarizer {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            min_boundary: max_chars.saturating_sub(30),
        }
    }
}

impl Default for TruncatingSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_LENGTH)
    }
}

impl Summarizer for TruncatingSummarizer {
    fn name(&self) -> &str {
        "truncate"
    }

    fn summarize(&self, text: &str) -> String {
        if text.chars().count() <= self.max_chars {
            return text.to_string();
        }

        let cut: String = text.chars().take(self.max_chars).collect();
        let cut = match cut.rfind(' ') {
            Some(idx) if cut[..idx].chars().count() > self.min_boundary => &cut[..idx],
            _ => cut.as_str(),
        };
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        let s = TruncatingSummarizer::default();
        let text = "a".repeat(230);
        assert_eq!(s.summarize(&text), text);
    }

    #[test]
    fn test_cuts_at_late_word_boundary() {
        let s = TruncatingSummarizer::default();
        // space at index 210, inside the back-off window
        let text = format!("{} {}", "a".repeat(210), "b".repeat(100));
        let summary = s.summarize(&text);
        assert_eq!(summary, format!("{}...", "a".repeat(210)));
    }

    #[test]
    fn test_hard_cut_when_space_is_early() {
        let s = TruncatingSummarizer::default();
        let text = format!("{} {}", "a".repeat(50), "b".repeat(300));
        let summary = s.summarize(&text);
        assert_eq!(summary.chars().count(), 233);
        assert!(summary.ends_with("b..."));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let s = TruncatingSummarizer::new(5);
        assert_eq!(s.summarize("ééééé"), "ééééé");
        assert_eq!(s.summarize("éééééé"), "ééééé...");
    }
}
