//! Line matching with capture-group extraction

use regex::Regex;

/// Reusable, immutable text-pattern matcher
///
/// Wraps a compiled regular expression and answers three questions about a
/// line of process output: does the pattern occur, what is the first capture
/// group of the first match, and what are the capture groups of every match.
///
/// # Examples
///
/// ```
/// use rsync_task::matcher::Matcher;
///
/// let matcher = Matcher::new(r"chk=(\d+/\d+)")?;
/// assert!(matcher.is_match("(xfr#1, to-chk=3/10)"));
/// assert_eq!(matcher.extract("(xfr#1, to-chk=3/10)"), "3/10");
/// # Ok::<(), rsync_task::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compile a matcher from a pattern
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`](crate::Error::Pattern) if the pattern is malformed.
    pub fn new(pattern: &str) -> crate::Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Whether the pattern occurs anywhere in `line`
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// First capture group of the first match, or an empty string
    pub fn extract(&self, line: &str) -> String {
        self.regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// Capture groups of up to `limit` matches, in order of occurrence
    ///
    /// Each entry holds group 0 (the whole match) followed by every sub-group.
    /// Groups that did not participate in a match are returned as empty strings.
    pub fn extract_all(&self, line: &str, limit: usize) -> Vec<Vec<String>> {
        self.regex
            .captures_iter(line)
            .take(limit)
            .map(|caps| {
                caps.iter()
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_is_reported() {
        let result = Matcher::new(r"(\d+");
        assert!(matches!(result, Err(crate::Error::Pattern(_))));
    }

    #[test]
    fn is_match_finds_pattern_anywhere_in_line() {
        let matcher = Matcher::new(r"\d+%").unwrap();
        assert!(matcher.is_match("  1,024  42%  1.00MB/s"));
        assert!(!matcher.is_match("sending incremental file list"));
    }

    #[test]
    fn extract_returns_first_group_of_first_match() {
        let matcher = Matcher::new(r"(\d+)%").unwrap();
        assert_eq!(matcher.extract("10% then 20%"), "10");
    }

    #[test]
    fn extract_without_match_is_empty() {
        let matcher = Matcher::new(r"(\d+)%").unwrap();
        assert_eq!(matcher.extract("no percentage here"), "");
    }

    #[test]
    fn extract_without_capture_group_is_empty() {
        let matcher = Matcher::new(r"\d+%").unwrap();
        assert_eq!(matcher.extract("50%"), "");
    }

    #[test]
    fn extract_all_returns_whole_match_and_groups() {
        let matcher = Matcher::new(r"(\d+)-(\w+)").unwrap();
        let all = matcher.extract_all("1-a 2-b 3-c", 10);

        assert_eq!(all.len(), 3);
        assert_eq!(all[0], vec!["1-a", "1", "a"]);
        assert_eq!(all[2], vec!["3-c", "3", "c"]);
    }

    #[test]
    fn extract_all_respects_limit() {
        let matcher = Matcher::new(r"(\d+)").unwrap();
        let all = matcher.extract_all("1 2 3 4", 2);

        assert_eq!(all, vec![vec!["1", "1"], vec!["2", "2"]]);
    }

    #[test]
    fn extract_all_fills_unmatched_optional_groups_with_empty_strings() {
        let matcher = Matcher::new(r"(\d+)(x)?").unwrap();
        let all = matcher.extract_all("7", 1);

        assert_eq!(all, vec![vec!["7", "7", ""]]);
    }
}
