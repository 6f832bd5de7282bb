//! Quote- and depth-aware scanning primitives.
//!
//! Every function here threads a single [`ScanState`] through the text, so a
//! delimiter is only honoured at *top level*: outside single-quoted strings,
//! outside double-quoted identifiers, and at zero parenthesis and bracket
//! depth. Comments must already be stripped (see [`crate::comments`]).
//!
//! Unterminated quotes or parentheses never panic; the scan runs to the end
//! of the text and boundary queries return `None`.
//!
//! # Example
//!
//! ```
//! use content_coverage::scanner::{find_keyword_outside, split_top_level};
//!
//! assert_eq!(split_top_level("f(a,b), c", ','), vec!["f(a,b)", "c"]);
//! assert_eq!(find_keyword_outside("SELECT 'from' FROM t", "from", 0), Some(14));
//! ```

mod state;

pub use state::ScanState;

/// Split `text` on `delimiter` wherever it occurs at top level.
///
/// Segments are trimmed. Empty trailing segments are dropped, inner empty
/// segments are kept so positions stay aligned.
pub fn split_top_level(text: &str, delimiter: char) -> Vec<String> {
    debug_assert!(delimiter.is_ascii());
    let delimiter = delimiter as u8;
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut state = ScanState::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == delimiter && state.is_top_level() {
            parts.push(text[start..i].trim().to_string());
            start = i + 1;
            i += 1;
            continue;
        }
        i += state.advance(bytes, i);
    }
    parts.push(text[start..].trim().to_string());
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Index of the `)` matching the `(` at `open_index`.
///
/// Returns `None` if `open_index` does not hold `(` or the paren is never
/// closed.
pub fn find_matching_paren(text: &str, open_index: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open_index) != Some(&b'(') {
        return None;
    }
    let mut state = ScanState::new();
    let mut i = open_index;
    while i < bytes.len() {
        let consumed = state.advance(bytes, i);
        if bytes[i] == b')' && !state.in_quotes() && state.paren_depth == 0 {
            return Some(i);
        }
        i += consumed;
    }
    None
}

/// Index of the first top-level `;` at or after `start`.
pub fn find_statement_end(text: &str, start: usize) -> Option<usize> {
    find_top_level(text, start, |bytes, i| bytes[i] == b';')
}

/// Case-insensitive, word-bounded search for `keyword` at top level.
///
/// Multi-word keywords such as `"union all"` match any run of whitespace
/// between the words.
pub fn find_keyword_outside(text: &str, keyword: &str, start: usize) -> Option<usize> {
    find_keyword_span(text, keyword, start).map(|(begin, _)| begin)
}

/// Like [`find_keyword_outside`], also returning the end offset of the match.
pub fn find_keyword_span(text: &str, keyword: &str, start: usize) -> Option<(usize, usize)> {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let mut end = 0;
    let begin = find_top_level(text, start, |bytes, i| {
        match match_phrase(bytes, i, &words) {
            Some(found) => {
                end = found;
                true
            }
            None => false
        }
    })?;
    Some((begin, end))
}

/// Split on every top-level `UNION ALL`, dropping empty clauses.
pub fn split_union_all(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cursor = 0;
    while let Some((begin, end)) = find_keyword_span(text, "union all", cursor) {
        parts.push(text[cursor..begin].trim().to_string());
        cursor = end;
    }
    parts.push(text[cursor..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Run `hit` at every top-level offset from `start` until it returns true.
fn find_top_level(
    text: &str,
    start: usize,
    mut hit: impl FnMut(&[u8], usize) -> bool
) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut state = ScanState::new();
    let mut i = start;
    while i < bytes.len() {
        if state.is_top_level() && hit(bytes, i) {
            return Some(i);
        }
        i += state.advance(bytes, i);
    }
    None
}

fn match_phrase(bytes: &[u8], at: usize, words: &[&str]) -> Option<usize> {
    if at > 0 && is_ident_byte(bytes[at - 1]) {
        return None;
    }
    let mut pos = at;
    for (n, word) in words.iter().enumerate() {
        if n > 0 {
            let gap = bytes[pos..]
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            if gap == 0 {
                return None;
            }
            pos += gap;
        }
        let end = pos + word.len();
        if end > bytes.len() || !bytes[pos..end].eq_ignore_ascii_case(word.as_bytes()) {
            return None;
        }
        pos = end;
    }
    if bytes.get(pos).is_some_and(|b| is_ident_byte(*b)) {
        return None;
    }
    Some(pos)
}

/// Bytes that can continue an identifier. Non-ASCII counts, so keywords
/// glued to UTF-8 names are not matched.
#[inline]
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_parens() {
        assert_eq!(split_top_level("f(a,b), c", ','), vec!["f(a,b)", "c"]);
    }

    #[test]
    fn test_split_respects_quotes_and_brackets() {
        let parts = split_top_level("'a,b', ARRAY['x','y'], \"c,d\"", ',');
        assert_eq!(parts, vec!["'a,b'", "ARRAY['x','y']", "\"c,d\""]);
    }

    #[test]
    fn test_split_drops_trailing_empty_only() {
        assert_eq!(split_top_level("a,,b,", ','), vec!["a", "", "b"]);
        assert!(split_top_level("   ", ',').is_empty());
    }

    #[test]
    fn test_split_escaped_quote() {
        assert_eq!(split_top_level("'it''s, fine', 2", ','), vec![
            "'it''s, fine'",
            "2"
        ]);
    }

    #[test]
    fn test_matching_paren_nested() {
        let text = "(a, (b), ')')";
        assert_eq!(find_matching_paren(text, 0), Some(text.len() - 1));
        assert_eq!(find_matching_paren(text, 4), Some(6));
    }

    #[test]
    fn test_matching_paren_not_found() {
        assert_eq!(find_matching_paren("(a, (b)", 0), None);
        assert_eq!(find_matching_paren("abc", 0), None);
        assert_eq!(find_matching_paren("(", 5), None);
    }

    #[test]
    fn test_statement_end_skips_quoted_semicolon() {
        let text = "INSERT INTO t (a) VALUES ('x;y'); next";
        assert_eq!(find_statement_end(text, 0), Some(32));
    }

    #[test]
    fn test_statement_end_unterminated() {
        assert_eq!(find_statement_end("VALUES ('x;", 0), None);
        assert_eq!(find_statement_end("VALUES (1", 0), None);
    }

    #[test]
    fn test_keyword_word_boundary() {
        assert_eq!(find_keyword_outside("SELECT a FROM t", "from", 0), Some(9));
        assert_eq!(find_keyword_outside("SELECT aFROMb", "from", 0), None);
        assert_eq!(find_keyword_outside("SELECT from_x", "from", 0), None);
    }

    #[test]
    fn test_keyword_ignores_quotes_and_parens() {
        assert_eq!(find_keyword_outside("SELECT 'from' x", "from", 0), None);
        assert_eq!(find_keyword_outside("SELECT (SELECT 1 FROM y)", "from", 0), None);
        assert_eq!(find_keyword_outside("SELECT \"from\"", "from", 0), None);
    }

    #[test]
    fn test_keyword_respects_start() {
        let text = "select 1 union all select 2";
        assert_eq!(find_keyword_outside(text, "select", 1), Some(19));
    }

    #[test]
    fn test_multi_word_keyword_spans_whitespace() {
        let text = "SELECT 1 UNION\n   ALL SELECT 2";
        assert_eq!(find_keyword_span(text, "union all", 0), Some((9, 21)));
        assert_eq!(find_keyword_outside("SELECT 1 UNIONALL", "union all", 0), None);
    }

    #[test]
    fn test_split_union_all() {
        let parts = split_union_all("SELECT 1 UNION ALL SELECT 'union all' UNION ALL SELECT 3");
        assert_eq!(parts, vec!["SELECT 1", "SELECT 'union all'", "SELECT 3"]);
    }

    #[test]
    fn test_split_union_all_ignores_plain_union() {
        let parts = split_union_all("SELECT 1 UNION SELECT 2");
        assert_eq!(parts.len(), 1);
    }
}
