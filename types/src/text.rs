//! Small pure text helpers.
//!
//! Positions passed to and returned from the "character" helpers count
//! user-perceived characters (extended grapheme clusters), so `"e\u{301}"` is a
//! single character. Search helpers return byte offsets into the original
//! string so the results can be used to slice it directly.

use std::iter;
use std::ops::{Bound, Range, RangeBounds};

use unicode_segmentation::UnicodeSegmentation;

/// Where [`StrExt::truncated`] removes characters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationPosition {
    /// Keep the end of the string, put the leader in front.
    Head,
    /// Keep both ends, put the leader in the middle.
    Middle,
    /// Keep the start of the string, put the leader after it.
    #[default]
    Tail,
}

/// Options for the substring search helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    pub case_insensitive: bool,
}

impl MatchOptions {
    #[must_use]
    pub const fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

/// Extension helpers for string slices.
pub trait StrExt {
    /// Number of user-perceived characters.
    fn char_count(&self) -> usize;

    /// Truncate to `limit` characters, inserting `leader` at `position`.
    ///
    /// Strings with at most `limit` characters are returned unchanged. For
    /// [`TruncationPosition::Head`] and [`TruncationPosition::Tail`] the leader
    /// does not count toward the limit; for [`TruncationPosition::Middle`] it does.
    fn truncated(&self, limit: usize, position: TruncationPosition, leader: &str) -> String;

    /// Remove `prefix` if the string starts with it.
    fn deleting_prefix(&self, prefix: &str) -> &str;

    /// The character at `index`, or `None` when out of range.
    fn char_at(&self, index: usize) -> Option<&str>;

    /// The characters covered by `range`, or `None` when any bound is out of range.
    fn char_slice<R: RangeBounds<usize>>(&self, range: R) -> Option<&str>;

    /// Interpret yes/no style text as a boolean.
    fn to_bool(&self) -> Option<bool>;

    /// Parse a decimal number, allowing `,` grouping separators between digits.
    fn to_double(&self) -> Option<f64>;

    /// Byte offset where the first match of `needle` starts.
    fn find_index(&self, needle: &str, options: MatchOptions) -> Option<usize>;

    /// Byte offset just past the first match of `needle`.
    fn find_end_index(&self, needle: &str, options: MatchOptions) -> Option<usize>;

    /// Start offsets of every non-overlapping match of `needle`.
    fn match_indices_of(&self, needle: &str, options: MatchOptions) -> Vec<usize>;

    /// Byte ranges of every non-overlapping match of `needle`.
    fn match_ranges(&self, needle: &str, options: MatchOptions) -> Vec<Range<usize>>;

    /// Split on any newline character, dropping empty lines.
    fn non_empty_lines(&self) -> Vec<&str>;

    /// The text between the first `from` and the next `to` after it.
    ///
    /// A `None` bound means the start (or end) of the string. Returns `None`
    /// when a requested delimiter is not found.
    fn slice_between(&self, from: Option<&str>, to: Option<&str>) -> Option<&str>;
}

impl StrExt for str {
    fn char_count(&self) -> usize {
        self.graphemes(true).count()
    }

    fn truncated(&self, limit: usize, position: TruncationPosition, leader: &str) -> String {
        let count = self.char_count();
        if count <= limit {
            return self.to_string();
        }

        match position {
            TruncationPosition::Head => {
                format!("{leader}{}", suffix_chars(self, count, limit))
            }
            TruncationPosition::Middle => {
                let budget = limit.saturating_sub(leader.char_count());
                let head = prefix_chars(self, budget.div_ceil(2));
                let tail = suffix_chars(self, count, budget / 2);
                format!("{head}{leader}{tail}")
            }
            TruncationPosition::Tail => {
                format!("{}{leader}", prefix_chars(self, limit))
            }
        }
    }

    fn deleting_prefix(&self, prefix: &str) -> &str {
        self.strip_prefix(prefix).unwrap_or(self)
    }

    fn char_at(&self, index: usize) -> Option<&str> {
        self.graphemes(true).nth(index)
    }

    fn char_slice<R: RangeBounds<usize>>(&self, range: R) -> Option<&str> {
        let boundaries = char_boundaries(self);
        let count = boundaries.len() - 1;

        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.checked_add(1)?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.checked_add(1)?,
            Bound::Excluded(&end) => end,
            Bound::Unbounded => count,
        };

        if start > end || end > count {
            return None;
        }
        Some(&self[boundaries[start]..boundaries[end]])
    }

    fn to_bool(&self) -> Option<bool> {
        match self.to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        }
    }

    fn to_double(&self) -> Option<f64> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ',' | 'e' | 'E'))
        {
            return None;
        }

        let normalized = strip_grouping(trimmed)?;
        normalized.parse::<f64>().ok()
    }

    fn find_index(&self, needle: &str, options: MatchOptions) -> Option<usize> {
        find_from(self, 0, needle, options).map(|range| range.start)
    }

    fn find_end_index(&self, needle: &str, options: MatchOptions) -> Option<usize> {
        find_from(self, 0, needle, options).map(|range| range.end)
    }

    fn match_indices_of(&self, needle: &str, options: MatchOptions) -> Vec<usize> {
        self.match_ranges(needle, options)
            .into_iter()
            .map(|range| range.start)
            .collect()
    }

    fn match_ranges(&self, needle: &str, options: MatchOptions) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        while start < self.len() {
            let Some(range) = find_from(self, start, needle, options) else {
                break;
            };
            start = range.end;
            ranges.push(range);
        }
        ranges
    }

    fn non_empty_lines(&self) -> Vec<&str> {
        self.split(is_newline)
            .filter(|line| !line.is_empty())
            .collect()
    }

    fn slice_between(&self, from: Option<&str>, to: Option<&str>) -> Option<&str> {
        let start = match from {
            Some(from) => self.find(from)? + from.len(),
            None => 0,
        };
        let rest = &self[start..];
        let end = match to {
            Some(to) => rest.find(to)?,
            None => rest.len(),
        };
        Some(&rest[..end])
    }
}

/// Byte offsets of every character start, followed by `s.len()`.
fn char_boundaries(s: &str) -> Vec<usize> {
    s.grapheme_indices(true)
        .map(|(offset, _)| offset)
        .chain(iter::once(s.len()))
        .collect()
}

fn prefix_chars(s: &str, take: usize) -> &str {
    match s.grapheme_indices(true).nth(take) {
        Some((offset, _)) => &s[..offset],
        None => s,
    }
}

fn suffix_chars(s: &str, count: usize, take: usize) -> &str {
    let skip = count.saturating_sub(take);
    match s.grapheme_indices(true).nth(skip) {
        Some((offset, _)) => &s[offset..],
        None => "",
    }
}

fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Remove grouping commas, rejecting any comma that is not between two digits
/// of the integer part.
fn strip_grouping(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }

    let integer_end = s.find(['.', 'e', 'E']).unwrap_or(s.len());
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c != ',' {
            out.push(c);
            continue;
        }
        let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
        let digit_after = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if i >= integer_end || !digit_before || !digit_after {
            return None;
        }
    }
    Some(out)
}

/// First match of `needle` at or after byte offset `start`.
fn find_from(
    haystack: &str,
    start: usize,
    needle: &str,
    options: MatchOptions,
) -> Option<Range<usize>> {
    if needle.is_empty() || start > haystack.len() {
        return None;
    }

    if !options.case_insensitive {
        return haystack[start..]
            .find(needle)
            .map(|offset| start + offset..start + offset + needle.len());
    }

    haystack[start..]
        .char_indices()
        .find_map(|(offset, _)| {
            let candidate = start + offset;
            match_len_ignoring_case(&haystack[candidate..], needle)
                .map(|len| candidate..candidate + len)
        })
}

/// Byte length of the prefix of `haystack` that equals `needle` ignoring case.
fn match_len_ignoring_case(haystack: &str, needle: &str) -> Option<usize> {
    let mut consumed = 0;
    let mut hay = haystack.chars();
    for expected in needle.chars() {
        let actual = hay.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        consumed += actual.len_utf8();
    }
    Some(consumed)
}
