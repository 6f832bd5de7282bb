//! Presence classification for raw value tokens.

/// Whether a raw value token counts as a present field value.
///
/// Absent values are: blank text, `NULL` in any case, and single-quoted
/// string literals (optionally cast with `::type`) whose unescaped content
/// is blank. Every other token is present: numbers, identifiers, function
/// calls, array literals.
///
/// # Example
///
/// ```
/// use content_coverage::value::is_present;
///
/// assert!(!is_present("NULL"));
/// assert!(!is_present("'' ::text"));
/// assert!(is_present("ARRAY['a']"));
/// assert!(is_present("0"));
/// ```
pub fn is_present(raw: &str) -> bool {
    let token = raw.trim();
    if token.is_empty() || token.eq_ignore_ascii_case("null") {
        return false;
    }
    match unescape_literal(token) {
        Some(content) => !content.trim().is_empty(),
        None => true
    }
}

/// Content of a single-quoted literal, with `''` unescaped.
///
/// Accepts an optional trailing `::type` cast. Returns `None` when the token
/// is not exactly one string literal, e.g. `'a' || 'b'` or `lower('a')`.
pub fn unescape_literal(raw: &str) -> Option<String> {
    let token = raw.trim();
    let body = token.strip_prefix('\'')?;
    let mut content = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    let close = loop {
        let (i, c) = chars.next()?;
        if c != '\'' {
            content.push(c);
            continue;
        }
        if chars.next_if(|&(_, next)| next == '\'').is_some() {
            content.push('\'');
            continue;
        }
        break i;
    };
    let rest = body[close + 1..].trim_start();
    if rest.is_empty() || rest.starts_with("::") {
        Some(content)
    } else {
        None
    }
}
