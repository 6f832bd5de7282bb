//! SQL comment stripping.
//!
//! Removes `-- line` and `/* block */` comments that appear outside quoted
//! text. Quote tracking uses the same [`ScanState`] as the scanner, so a
//! `--` inside `'--not a comment'` survives untouched.

use crate::scanner::ScanState;

/// Strip comments from `sql`.
///
/// Line comments are removed up to, but not including, the newline. Block
/// comments are replaced by a single space so the tokens on either side do
/// not fuse. An unterminated block comment runs to the end of input.
/// Everything else is copied byte for byte, in order.
///
/// The output is not offset-preserving: every byte after a removed comment
/// sits earlier than in `sql`, so offsets into the result must not be used
/// to index the input.
///
/// # Example
///
/// ```
/// use content_coverage::comments::strip_comments;
///
/// let sql = "INSERT INTO t (a) VALUES ('--keep'); -- drop\n/* gone */";
/// assert_eq!(strip_comments(sql), "INSERT INTO t (a) VALUES ('--keep'); \n ");
/// ```
pub fn strip_comments(sql: &str) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut state = ScanState::new();
    let mut copy_from = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !state.in_quotes() {
            if bytes[i..].starts_with(b"--") {
                out.push_str(&sql[copy_from..i]);
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |offset| i + offset);
                copy_from = i;
                continue;
            }
            if bytes[i..].starts_with(b"/*") {
                out.push_str(&sql[copy_from..i]);
                out.push(' ');
                i = find_block_end(bytes, i + 2);
                copy_from = i;
                continue;
            }
        }
        i += state.advance(bytes, i);
    }
    out.push_str(&sql[copy_from..]);
    out
}

fn find_block_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |offset| from + offset + 2)
}
