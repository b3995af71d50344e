//! Parser for rsync progress output
//!
//! rsync with `--progress` reports each transferred file on a line like:
//!
//! ```text
//!         999,999 99%  999.99kB/s    0:00:59 (xfr#9, to-chk=999/9999)
//! ```
//!
//! The parenthesized `to-chk`/`ir-chk` suffix carries the remaining and total
//! file counts, and the `kB/s`-style token carries the current transfer rate.
//! Everything here is lenient: partial or malformed lines degrade to zero
//! values or an empty string instead of failing.

use crate::matcher::Matcher;
use crate::types::State;

/// Pattern for the `(…xx-chk=<remaining>/<total>)` suffix of a progress line
pub const PROGRESS_PATTERN: &str = r"\(.+-chk=(\d+.\d+)";

/// Pattern for a `<digits>.<digits><unit>/s` transfer rate token
pub const SPEED_PATTERN: &str = r"(\d+\.\d+.{2}/s)";

/// Number of speed matches inspected per line
pub const SPEED_MATCH_LIMIT: usize = 2;

const MAX_PERCENT: f64 = 100.0;
const MIN_DIVIDER: i64 = 1;

/// Parse a `"<remaining>/<total>"` capture into `(remaining, total)`
///
/// Returns `(0, 0)` when the separator is missing. A token that is not a
/// non-negative integer yields 0 for that field only.
pub fn parse_progress(capture: &str) -> (i64, i64) {
    let mut tokens = capture.split('/');
    match (tokens.next(), tokens.next()) {
        (Some(remain), Some(total)) => (parse_count(remain), parse_count(total)),
        _ => (0, 0),
    }
}

fn parse_count(token: &str) -> i64 {
    token
        .parse::<i64>()
        .ok()
        .filter(|n| !n.is_negative())
        .unwrap_or(0)
}

/// Select the authoritative speed token from the speed matches of one line
///
/// rsync rewrites its progress line with carriage returns, so one scanned
/// line can hold an early partial rate followed by the current one. Only the
/// second match is used; with fewer than two matches the result is empty.
pub fn parse_speed(matches: &[Vec<String>]) -> String {
    matches
        .get(1)
        .and_then(|groups| groups.get(1))
        .cloned()
        .unwrap_or_default()
}

/// Percentage of files already processed
///
/// The divisor is floored at 1 so a zero total never divides by zero.
pub fn progress_percent(remain: i64, total: i64) -> f64 {
    let copied = (total - remain) as f64;
    copied / total.max(MIN_DIVIDER) as f64 * MAX_PERCENT
}

/// Progress and speed matchers for rsync stdout, compiled once per task
#[derive(Debug, Clone)]
pub struct OutputParser {
    progress: Matcher,
    speed: Matcher,
}

impl OutputParser {
    /// Compile the progress and speed matchers
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            progress: Matcher::new(PROGRESS_PATTERN)?,
            speed: Matcher::new(SPEED_PATTERN)?,
        })
    }

    /// Apply one stdout line to `state`
    ///
    /// Progress and speed are updated independently. Returns `true` if the
    /// line matched the progress pattern, the speed pattern, or both.
    pub fn apply(&self, line: &str, state: &mut State) -> bool {
        let mut matched = false;

        if self.progress.is_match(line) {
            let (remain, total) = parse_progress(&self.progress.extract(line));
            state.remain = remain;
            state.total = total;
            state.progress = progress_percent(remain, total);
            matched = true;
        }

        if self.speed.is_match(line) {
            state.speed = parse_speed(&self.speed.extract_all(line, SPEED_MATCH_LIMIT));
            matched = true;
        }

        matched
    }
}
