//! `INSERT INTO` statement extraction.

use crate::scanner::find_statement_end;

const INSERT_INTO: &[u8] = b"insert into";

/// Carve every `INSERT INTO ... ;` statement out of comment-free SQL.
///
/// Each span runs from the `INSERT INTO` phrase through its terminating
/// top-level `;`, inclusive. A statement without a terminator ends the
/// extraction; no truncated span is returned. Spans come back in source
/// order.
///
/// # Example
///
/// ```
/// use content_coverage::statement::extract_insert_statements;
///
/// let sql = "INSERT INTO a (x) VALUES (1);\nINSERT INTO b (y) VALUES (';');";
/// let spans = extract_insert_statements(sql);
/// assert_eq!(spans, vec![
///     "INSERT INTO a (x) VALUES (1);",
///     "INSERT INTO b (y) VALUES (';');"
/// ]);
/// ```
pub fn extract_insert_statements(cleaned_sql: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(begin) = find_insert_into(cleaned_sql, cursor) {
        let Some(end) = find_statement_end(cleaned_sql, begin) else {
            break;
        };
        spans.push(&cleaned_sql[begin..=end]);
        cursor = end + 1;
    }
    spans
}

fn find_insert_into(sql: &str, from: usize) -> Option<usize> {
    sql.as_bytes()
        .get(from..)?
        .windows(INSERT_INTO.len())
        .position(|w| w.eq_ignore_ascii_case(INSERT_INTO))
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::strip_comments;

    #[test]
    fn test_two_statements_around_comment_block() {
        let sql = "INSERT INTO items (name) VALUES ('Sword');\n\
                   /* INSERT INTO ghosts (name) VALUES ('boo'); */\n\
                   insert into quests (title) VALUES ('Rescue');\n";
        let cleaned = strip_comments(sql);
        let spans = extract_insert_statements(&cleaned);
        assert_eq!(spans.len(), 2);
        assert!(spans[0].contains("items"));
        assert!(spans[1].contains("quests"));
    }

    #[test]
    fn test_unterminated_statement_dropped() {
        let sql = "INSERT INTO a (x) VALUES (1); INSERT INTO b (y) VALUES (2)";
        let spans = extract_insert_statements(sql);
        assert_eq!(spans, vec!["INSERT INTO a (x) VALUES (1);"]);
    }

    #[test]
    fn test_semicolon_inside_literal() {
        let sql = "INSERT INTO a (x) VALUES ('a; b'), ('c');";
        assert_eq!(extract_insert_statements(sql), vec![sql]);
    }

    #[test]
    fn test_ignores_other_statements() {
        let sql = "CREATE TABLE a (x int); UPDATE a SET x = 1; INSERT INTO a (x) VALUES (1);";
        let spans = extract_insert_statements(sql);
        assert_eq!(spans, vec!["INSERT INTO a (x) VALUES (1);"]);
    }

    #[test]
    fn test_no_statements() {
        assert!(extract_insert_statements("").is_empty());
        assert!(extract_insert_statements("SELECT 1;").is_empty());
    }
}
