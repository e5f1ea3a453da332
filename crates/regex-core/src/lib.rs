mod engine;
pub mod error;

pub use engine::{Analysis, CaptureValue, Captures, Nfa};

/// Public API for pattern matching.
pub struct Regex {
    nfa: Nfa,
    /// Cheap structural pre-filter computed once at compile time.
    analysis: Analysis,
    /// Enables case-insensitive matching by lowercasing pattern/input.
    is_ignore_case: bool,
    /// Inverts the final match result.
    is_invert_match: bool,
}

impl Regex {
    /// Create a new `Regex`.
    pub fn new(
        pattern: &str,
        is_ignore_case: bool,
        is_invert_match: bool,
    ) -> Result<Self, error::RegexError> {
        let (nfa, analysis) = if is_ignore_case {
            engine::compile_pattern(&pattern.to_lowercase())?
        } else {
            engine::compile_pattern(pattern)?
        };

        Ok(Self {
            nfa,
            analysis,
            is_ignore_case,
            is_invert_match,
        })
    }

    /// Match a line against the compiled pattern.
    ///
    /// This is a grep-style test: it succeeds if the pattern matches
    /// anywhere in `line`. `is_invert_match` flips the result.
    pub fn is_match(&self, line: &str) -> Result<bool, error::RegexError> {
        let is_match = if self.is_ignore_case {
            self.is_match_line(&line.to_lowercase())
        } else {
            self.is_match_line(line)
        };

        Ok(is_match ^ self.is_invert_match)
    }

    /// Matches a line, optionally skipping the simulator via a literal
    /// pre-filter first.
    fn is_match_line(&self, line: &str) -> bool {
        if !self.passes_prefilter(line) {
            return false;
        }
        engine::search(&self.nfa, line).is_some()
    }

    fn passes_prefilter(&self, line: &str) -> bool {
        if let Some(literal) = &self.analysis.leading_literal {
            return line.contains(literal.as_str());
        }
        if !self.analysis.needles.is_empty() {
            return self.analysis.needles.iter().any(|n| line.contains(n.as_str()));
        }
        true
    }

    /// Matches the entire text exactly, returning captures on success.
    pub fn full_match(&self, text: &str) -> Option<Captures> {
        if self.is_ignore_case {
            engine::full_match(&self.nfa, &text.to_lowercase())
        } else {
            engine::full_match(&self.nfa, text)
        }
    }

    /// Matches a prefix of the text starting at position 0, returning
    /// captures on success.
    pub fn r#match(&self, text: &str) -> Option<Captures> {
        if self.is_ignore_case {
            engine::prefix_match(&self.nfa, &text.to_lowercase())
        } else {
            engine::prefix_match(&self.nfa, text)
        }
    }

    /// Searches for the pattern anywhere in the text, returning captures
    /// on success.
    pub fn search(&self, text: &str) -> Option<Captures> {
        if self.is_ignore_case {
            engine::search(&self.nfa, &text.to_lowercase())
        } else {
            engine::search(&self.nfa, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match() {
        let regex = Regex::new("ab(c|d)", false, false).unwrap();
        assert!(regex.is_match("abc").unwrap());
        assert!(!regex.is_match("abe").unwrap());
    }

    #[test]
    fn test_is_match_ignore_case() {
        let regex = Regex::new("ab(c|d)", true, false).unwrap();
        assert!(regex.is_match("ABC").unwrap());

        let regex = Regex::new("ab(c|d)", false, false).unwrap();
        assert!(!regex.is_match("ABC").unwrap());
    }

    #[test]
    fn test_is_match_invert() {
        let regex = Regex::new("ab(c|d)", false, true).unwrap();
        assert!(!regex.is_match("abc").unwrap());
        assert!(regex.is_match("abe").unwrap());
    }

    #[test]
    fn test_backreference() {
        let regex = Regex::new("(abc)\\1", false, false).unwrap();
        assert!(regex.is_match("abcabc").unwrap());
        assert!(!regex.is_match("abcabd").unwrap());
    }

    #[test]
    fn test_anchor_patterns() {
        let regex_start = Regex::new("^hello", false, false).unwrap();
        assert!(regex_start.is_match("hello world").unwrap());
        assert!(!regex_start.is_match("say hello").unwrap());

        let regex_end = Regex::new("world$", false, false).unwrap();
        assert!(regex_end.is_match("hello world").unwrap());
        assert!(!regex_end.is_match("world peace").unwrap());

        let regex_both = Regex::new("^hello$", false, false).unwrap();
        assert!(regex_both.is_match("hello").unwrap());
        assert!(!regex_both.is_match("hello world").unwrap());
        assert!(!regex_both.is_match("say hello").unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Regex::new("(", false, false).is_err());
        assert!(Regex::new(")", false, false).is_err());
        assert!(Regex::new("*", false, false).is_err());
        assert!(Regex::new("+", false, false).is_err());
        assert!(Regex::new("?", false, false).is_err());
    }

    #[test]
    fn test_prefilter_skips_non_matching_lines() {
        let regex = Regex::new(".*abc.*", false, false).unwrap();
        assert!(!regex.is_match("zzz").unwrap());
    }

    #[test]
    fn test_prefilter_allows_matching_lines() {
        let regex = Regex::new("a.*c", false, false).unwrap();
        assert!(regex.is_match("a---c").unwrap());
        assert!(!regex.is_match("a---").unwrap());
    }

    #[test]
    fn test_prefilter_respects_invert_match() {
        let regex = Regex::new(".*abc.*", false, true).unwrap();
        assert!(regex.is_match("zzz").unwrap());
    }

    #[test]
    fn test_needles_prefilter_still_runs_matcher() {
        let regex = Regex::new("(abc|def)", false, false).unwrap();
        assert!(regex.is_match("def").unwrap());
        assert!(!regex.is_match("xyz").unwrap());
    }

    #[test]
    fn test_full_match_extracts_capture() {
        let regex = Regex::new("(a+)(b+)", false, false).unwrap();
        let captures = regex.full_match("aaabb").unwrap();
        assert_eq!(captures.group(0), Some(&CaptureValue::Single("aaa".to_string())));
        assert_eq!(captures.group(1), Some(&CaptureValue::Single("bb".to_string())));
    }

    #[test]
    fn test_full_match_rejects_partial_input() {
        let regex = Regex::new("abc", false, false).unwrap();
        assert!(regex.full_match("abcd").is_none());
    }

    #[test]
    fn test_match_anchors_to_start() {
        let regex = Regex::new("abc", false, false).unwrap();
        assert!(regex.r#match("abcd").is_some());
        assert!(regex.r#match("xabc").is_none());
    }

    #[test]
    fn test_search_finds_anywhere() {
        let regex = Regex::new("abc", false, false).unwrap();
        assert!(regex.search("xxabcyy").is_some());
        assert!(regex.search("xxxxxx").is_none());
    }
}
