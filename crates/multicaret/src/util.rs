#[allow(unused_macros)]
macro_rules! span {
    ($s: expr) => {
        $crate::editing::span::Span::new($s, $s)
    };
    ($s: expr, $e: expr) => {
        $crate::editing::span::Span::new($s, $e)
    };
}

#[inline]
pub(crate) fn sort2<T>(a: T, b: T) -> (T, T)
where
    T: Ord,
{
    if a < b {
        return (a, b);
    } else {
        return (b, a);
    }
}

#[inline]
pub(crate) fn is_eol(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Whether a character ends a line, using the same set of line breaks as [ropey].
#[inline]
pub(crate) fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\u{0B}' | '\u{0C}' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort2() {
        assert_eq!(sort2(1, 2), (1, 2));
        assert_eq!(sort2(2, 1), (1, 2));
        assert_eq!(sort2(5, 5), (5, 5));
    }

    #[test]
    fn test_is_eol() {
        assert!(is_eol('\n'));
        assert!(is_eol('\r'));
        assert!(!is_eol(' '));
        assert!(!is_eol('a'));
    }

    #[test]
    fn test_is_line_break() {
        assert!(is_line_break('\n'));
        assert!(is_line_break('\r'));
        assert!(is_line_break('\u{0B}'));
        assert!(is_line_break('\u{0C}'));
        assert!(is_line_break('\u{85}'));
        assert!(is_line_break('\u{2028}'));
        assert!(is_line_break('\u{2029}'));
        assert!(!is_line_break('\t'));
        assert!(!is_line_break('a'));
    }
}
