//! Quote and nesting state shared by every scanning primitive.
//!
//! The scanner walks SQL text byte by byte. Every structural character the
//! scanner cares about is ASCII, so byte offsets produced here are always
//! valid `str` slice boundaries.
//!
//! # Transition table
//!
//! | Input | Condition | Effect |
//! |-------|-----------|--------|
//! | `''` | not in double quote | consumed as literal content, no toggle |
//! | `'` | not in double quote | toggle single-quoted string |
//! | `"` | not in single quote | toggle quoted identifier |
//! | `(` `)` | outside quotes | paren depth +1 / -1 |
//! | `[` `]` | outside quotes | bracket depth +1 / -1 |
//!
//! Depths saturate at zero, so a stray closer never underflows.

/// Scanner state: quote flags plus open paren/bracket depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub in_single_quote: bool,
    pub in_double_quote: bool,
    pub paren_depth:     usize,
    pub bracket_depth:   usize
}

impl ScanState {
    /// Fresh state at top level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inside a single-quoted string or a double-quoted identifier.
    #[inline]
    pub fn in_quotes(&self) -> bool {
        self.in_single_quote || self.in_double_quote
    }

    /// Outside quotes with no open parenthesis or bracket.
    #[inline]
    pub fn is_top_level(&self) -> bool {
        !self.in_quotes() && self.paren_depth == 0 && self.bracket_depth == 0
    }

    /// Outside quotes with no open parenthesis. Brackets are ignored.
    #[inline]
    pub fn is_outside_parens(&self) -> bool {
        !self.in_quotes() && self.paren_depth == 0
    }

    /// Apply the byte at `index` and return how many bytes were consumed.
    ///
    /// Returns 2 for an escaped quote pair, 1 otherwise. `index` must be in
    /// bounds.
    pub fn advance(&mut self, bytes: &[u8], index: usize) -> usize {
        match bytes[index] {
            b'\'' if !self.in_double_quote => {
                if bytes.get(index + 1) == Some(&b'\'') {
                    return 2;
                }
                self.in_single_quote = !self.in_single_quote;
            }
            b'"' if !self.in_single_quote => {
                self.in_double_quote = !self.in_double_quote;
            }
            _ if self.in_quotes() => {}
            b'(' => self.paren_depth += 1,
            b')' => self.paren_depth = self.paren_depth.saturating_sub(1),
            b'[' => self.bracket_depth += 1,
            b']' => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            _ => {}
        }
        1
    }
}
