//! Placeholder translation
//!
//! Statements are authored with positional `?` markers. PostgreSQL wants
//! numbered `$n` parameters, so every statement is rewritten before it
//! reaches the driver. Markers inside quoted literals or quoted identifiers
//! are left alone.

use std::borrow::Cow;

/// Rewrite `?` markers into `$1, $2, ...`.
///
/// # Example
/// ```
/// use hospital_server::db::translate_placeholders;
///
/// assert_eq!(
///     translate_placeholders("SELECT * FROM room WHERE room_no = ?"),
///     "SELECT * FROM room WHERE room_no = $1"
/// );
/// ```
pub fn translate_placeholders(statement: &str) -> Cow<'_, str> {
    if !statement.contains('?') {
        return Cow::Borrowed(statement);
    }

    let mut out = String::with_capacity(statement.len() + 8);
    let mut index = 0usize;
    let mut quote: Option<char> = None;

    for ch in statement.chars() {
        match quote {
            Some(open) => {
                out.push(ch);
                // A doubled quote closes and immediately reopens, which
                // lands in the same state.
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    out.push(ch);
                }
                '?' => {
                    index += 1;
                    out.push('$');
                    out.push_str(&index.to_string());
                }
                _ => out.push(ch),
            },
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_markers_in_order() {
        let sql = translate_placeholders("INSERT INTO room (room_no, room_type, available) VALUES (?, ?, ?)");
        assert_eq!(
            sql,
            "INSERT INTO room (room_no, room_type, available) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn borrows_when_nothing_to_do() {
        let sql = translate_placeholders("SELECT 1");
        assert!(matches!(sql, Cow::Borrowed(_)));
    }

    #[test]
    fn skips_string_literals() {
        let sql = translate_placeholders("SELECT * FROM patient WHERE pat_address = 'why?' AND pat_id = ?");
        assert_eq!(
            sql,
            "SELECT * FROM patient WHERE pat_address = 'why?' AND pat_id = $1"
        );
    }

    #[test]
    fn handles_escaped_quotes() {
        let sql = translate_placeholders("SELECT 'it''s ?', ?");
        assert_eq!(sql, "SELECT 'it''s ?', $1");
    }

    #[test]
    fn skips_quoted_identifiers() {
        let sql = translate_placeholders(r#"SELECT "odd?col" FROM t WHERE id = ?"#);
        assert_eq!(sql, r#"SELECT "odd?col" FROM t WHERE id = $1"#);
    }

    #[test]
    fn counts_past_nine() {
        let markers = vec!["?"; 11].join(", ");
        let sql = translate_placeholders(&markers).into_owned();
        assert!(sql.ends_with("$10, $11"));
    }
}
