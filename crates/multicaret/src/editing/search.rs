//! # Text search
//!
//! ## Overview
//!
//! The select-in-document commands locate other occurrences of a selection's text through a
//! [SearchService]. [RegexSearch] implements one for any [Snapshot] by searching for the
//! literal text with [regex].
use bitflags::bitflags;
use regex::{Match, Regex, RegexBuilder};

use crate::editing::buffer::Snapshot;
use crate::editing::span::Span;
use crate::errors::EditResult;

bitflags! {
    /// Flags that control how a [FindQuery] matches.
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    pub struct FindOptions: u32 {
        /// No flags set.
        const NONE = 0b00000000;

        /// Only match text with the same case.
        const MATCH_CASE = 0b00000001;

        /// Search backwards from the starting offset.
        const SEARCH_REVERSE = 0b00000010;
    }
}

/// Text to search for, along with how to match it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FindQuery {
    /// The literal text to look for.
    pub text: String,

    /// Flags controlling the search.
    pub options: FindOptions,
}

impl FindQuery {
    /// Create a new query.
    pub fn new<T: Into<String>>(text: T, options: FindOptions) -> Self {
        FindQuery { text: text.into(), options }
    }

    /// Create a copy of this query that searches in the given direction.
    pub fn reversed(&self, reverse: bool) -> Self {
        let mut options = self.options;
        options.set(FindOptions::SEARCH_REVERSE, reverse);

        FindQuery { text: self.text.clone(), options }
    }

    /// Build the expression used to match this query.
    pub fn regex(&self) -> EditResult<Regex> {
        let re = RegexBuilder::new(&regex::escape(&self.text))
            .case_insensitive(!self.options.contains(FindOptions::MATCH_CASE))
            .build()?;

        Ok(re)
    }
}

/// Locates occurrences of text within a snapshot.
pub trait SearchService<S: Snapshot> {
    /// Find the next match relative to `from`.
    ///
    /// Searching forwards returns the first match starting at or after `from`. Searching
    /// backwards, with [FindOptions::SEARCH_REVERSE], returns the last match ending at or before
    /// `from`. If nothing is found and `wrap` is set, the search continues from the other end of
    /// the snapshot.
    fn find_next(
        &self,
        snapshot: &S,
        from: usize,
        wrap: bool,
        query: &FindQuery,
    ) -> EditResult<Option<Span>>;

    /// Find every non-overlapping match within the snapshot, in ascending order.
    fn find_all(&self, snapshot: &S, query: &FindQuery) -> EditResult<Vec<Span>>;
}

/// A [SearchService] that matches literal text using [regex].
#[derive(Clone, Copy, Debug, Default)]
pub struct RegexSearch;

fn char_span(text: &str, m: Match<'_>) -> Span {
    let start = text[..m.start()].chars().count();
    let end = start + m.as_str().chars().count();

    Span::new(start, end)
}

fn shift(span: Span, by: usize) -> Span {
    Span::new(span.start() + by, span.end() + by)
}

fn char_spans(text: &str, needle: &Regex) -> Vec<Span> {
    let mut bytes = 0;
    let mut chars = 0;

    needle
        .find_iter(text)
        .map(|m| {
            chars += text[bytes..m.start()].chars().count();
            let start = chars;

            chars += m.as_str().chars().count();
            bytes = m.end();

            Span::new(start, chars)
        })
        .collect()
}

impl<S: Snapshot> SearchService<S> for RegexSearch {
    fn find_next(
        &self,
        snapshot: &S,
        from: usize,
        wrap: bool,
        query: &FindQuery,
    ) -> EditResult<Option<Span>> {
        if query.text.is_empty() {
            return Ok(None);
        }

        let needle = query.regex()?;
        let len = snapshot.len();
        let from = from.min(len);

        if query.options.contains(FindOptions::SEARCH_REVERSE) {
            let head = snapshot.text(Span::new(0, from));

            if let Some(found) = char_spans(&head, &needle).pop() {
                return Ok(Some(found));
            }

            if !wrap {
                return Ok(None);
            }

            let text = snapshot.text(Span::new(0, len));

            return Ok(char_spans(&text, &needle).pop());
        }

        let tail = snapshot.text(Span::new(from, len));

        if let Some(m) = needle.find(&tail) {
            return Ok(Some(shift(char_span(&tail, m), from)));
        }

        if !wrap {
            return Ok(None);
        }

        // Wrap around, including any match that straddles the starting offset.
        let text = snapshot.text(Span::new(0, len));
        let found = needle.find(&text).map(|m| char_span(&text, m));

        Ok(found)
    }

    fn find_all(&self, snapshot: &S, query: &FindQuery) -> EditResult<Vec<Span>> {
        if query.text.is_empty() {
            return Ok(vec![]);
        }

        let needle = query.regex()?;
        let text = snapshot.text(Span::new(0, snapshot.len()));

        Ok(char_spans(&text, &needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::buffer::TextBuffer;
    use crate::editing::rope::{RopeBuffer, RopeSnapshot};

    fn mksnap(s: &str) -> RopeSnapshot {
        RopeBuffer::from(s).snapshot()
    }

    fn next(snap: &RopeSnapshot, from: usize, wrap: bool, query: &FindQuery) -> Option<Span> {
        RegexSearch.find_next(snap, from, wrap, query).unwrap()
    }

    #[test]
    fn test_find_all() {
        let snap = mksnap("foo Foo fOO bar foo\n");

        let query = FindQuery::new("foo", FindOptions::MATCH_CASE);
        let res = RegexSearch.find_all(&snap, &query).unwrap();
        assert_eq!(res, vec![span!(0, 3), span!(16, 19)]);

        let query = FindQuery::new("foo", FindOptions::NONE);
        let res = RegexSearch.find_all(&snap, &query).unwrap();
        assert_eq!(res, vec![span!(0, 3), span!(4, 7), span!(8, 11), span!(16, 19)]);
    }

    #[test]
    fn test_find_all_non_overlapping() {
        let snap = mksnap("aaaaa");
        let query = FindQuery::new("aa", FindOptions::MATCH_CASE);

        let res = RegexSearch.find_all(&snap, &query).unwrap();
        assert_eq!(res, vec![span!(0, 2), span!(2, 4)]);
    }

    #[test]
    fn test_find_literal() {
        let snap = mksnap("a.b axb (a.b)\n");
        let query = FindQuery::new("(a.b)", FindOptions::MATCH_CASE);

        let res = RegexSearch.find_all(&snap, &query).unwrap();
        assert_eq!(res, vec![span!(8, 13)]);
    }

    #[test]
    fn test_find_empty() {
        let snap = mksnap("hello\n");
        let query = FindQuery::new("", FindOptions::MATCH_CASE);

        assert!(RegexSearch.find_all(&snap, &query).unwrap().is_empty());
        assert_eq!(next(&snap, 0, true, &query), None);
    }

    #[test]
    fn test_find_char_offsets() {
        let snap = mksnap("naïve café, naïve\n");
        let query = FindQuery::new("naïve", FindOptions::MATCH_CASE);

        let res = RegexSearch.find_all(&snap, &query).unwrap();
        assert_eq!(res, vec![span!(0, 5), span!(12, 17)]);
        assert_eq!(snap.text(res[1]), "naïve");
    }

    #[test]
    fn test_find_next_forward() {
        let snap = mksnap("ab ab ab\n");
        let query = FindQuery::new("ab", FindOptions::MATCH_CASE);

        assert_eq!(next(&snap, 0, false, &query), Some(span!(0, 2)));
        assert_eq!(next(&snap, 1, false, &query), Some(span!(3, 5)));
        assert_eq!(next(&snap, 6, false, &query), Some(span!(6, 8)));
        assert_eq!(next(&snap, 7, false, &query), None);
        assert_eq!(next(&snap, 7, true, &query), Some(span!(0, 2)));
    }

    #[test]
    fn test_find_next_reverse() {
        let snap = mksnap("ab ab ab\n");
        let query = FindQuery::new("ab", FindOptions::MATCH_CASE).reversed(true);

        assert_eq!(next(&snap, 9, false, &query), Some(span!(6, 8)));
        assert_eq!(next(&snap, 7, false, &query), Some(span!(3, 5)));
        assert_eq!(next(&snap, 2, false, &query), Some(span!(0, 2)));
        assert_eq!(next(&snap, 1, false, &query), None);
        assert_eq!(next(&snap, 1, true, &query), Some(span!(6, 8)));

        let query = query.reversed(false);
        assert_eq!(next(&snap, 1, false, &query), Some(span!(3, 5)));
    }

    #[test]
    fn test_find_next_from_offset() {
        let snap = mksnap("aaaaa");
        let query = FindQuery::new("aa", FindOptions::MATCH_CASE);

        // Forward searches begin at the offset, even partway through an earlier match.
        assert_eq!(next(&snap, 1, false, &query), Some(span!(1, 3)));
        assert_eq!(next(&snap, 4, false, &query), None);
        assert_eq!(next(&snap, 4, true, &query), Some(span!(0, 2)));

        let query = query.reversed(true);
        assert_eq!(next(&snap, 5, false, &query), Some(span!(2, 4)));
        assert_eq!(next(&snap, 1, false, &query), None);
        assert_eq!(next(&snap, 1, true, &query), Some(span!(2, 4)));
    }

    #[test]
    fn test_find_next_wrap_straddling() {
        let snap = mksnap("xabx");
        let query = FindQuery::new("ab", FindOptions::MATCH_CASE);

        assert_eq!(next(&snap, 2, false, &query), None);
        assert_eq!(next(&snap, 2, true, &query), Some(span!(1, 3)));

        let query = query.reversed(true);
        assert_eq!(next(&snap, 2, false, &query), None);
        assert_eq!(next(&snap, 2, true, &query), Some(span!(1, 3)));
    }

    #[test]
    fn test_find_next_char_offsets() {
        let snap = mksnap("naïve café, naïve\n");
        let query = FindQuery::new("naïve", FindOptions::MATCH_CASE);

        assert_eq!(next(&snap, 1, false, &query), Some(span!(12, 17)));
        assert_eq!(next(&snap, 13, true, &query), Some(span!(0, 5)));

        let query = query.reversed(true);
        assert_eq!(next(&snap, 11, false, &query), Some(span!(0, 5)));
        assert_eq!(next(&snap, 4, true, &query), Some(span!(12, 17)));
    }
}
