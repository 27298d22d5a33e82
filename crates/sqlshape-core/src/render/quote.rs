//! Identifier quoting.

use crate::dialect::{Dialect, DialectKind};

/// Returns `name` ready to be used as an identifier, quoted when it has to be.
///
/// Input that is already delimited in `dialect` passes through unchanged.
/// Reserved words, names starting with a digit and names containing anything
/// other than alphanumerics and `_` are always quoted. With
/// `meta_store_convention` an uppercase character also forces quotes, since
/// the name is then case sensitive. `force_quotes` quotes everything.
///
/// The result uses SQL standard double quotes; the renderer uses the
/// dialect's own quote character instead.
///
/// ```rust
/// use sqlshape_core::{quote_identifier, DialectKind};
///
/// assert_eq!(quote_identifier("select", DialectKind::Sqlite, false, false), "\"select\"");
/// assert_eq!(quote_identifier("abc123", DialectKind::Sqlite, false, false), "abc123");
/// assert_eq!(quote_identifier("5abc", DialectKind::Sqlite, false, false), "\"5abc\"");
/// ```
#[must_use]
pub fn quote_identifier(
    name: &str,
    dialect: DialectKind,
    meta_store_convention: bool,
    force_quotes: bool,
) -> String {
    quote_with(name, dialect.dialect(), '"', meta_store_convention, force_quotes)
}

/// Same rules as [`quote_identifier`], quoting with the dialect's character.
///
/// A name delimited in any dialect is unwrapped and delimited again with
/// `dialect`'s quote, so `"Order"` parsed from PostgreSQL renders as
/// `` `Order` `` for MySQL.
pub(crate) fn quote_for_dialect(
    name: &str,
    dialect: &dyn Dialect,
    meta_store_convention: bool,
    force_quotes: bool,
) -> String {
    let quote = dialect.identifier_quote();
    if let Some(bare) = strip_delimiters(name) {
        return delimit(&bare, quote);
    }
    quote_with(name, dialect, quote, meta_store_convention, force_quotes)
}

/// Returns the name inside `"..."` or `` `...` ``, with doubled quotes undone.
fn strip_delimiters(name: &str) -> Option<String> {
    ['"', '`'].into_iter().find_map(|quote| {
        let inner = name.strip_prefix(quote)?.strip_suffix(quote)?;
        let doubled = format!("{quote}{quote}");
        let single = quote.to_string();
        Some(inner.replace(&doubled, &single))
    })
}

fn delimit(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

fn quote_with(
    name: &str,
    dialect: &dyn Dialect,
    quote: char,
    meta_store_convention: bool,
    force_quotes: bool,
) -> String {
    if dialect.is_quoted_identifier(name) {
        return String::from(name);
    }
    if !force_quotes && !needs_quotes(name, dialect, meta_store_convention) {
        return String::from(name);
    }
    delimit(name, quote)
}

fn needs_quotes(name: &str, dialect: &dyn Dialect, meta_store_convention: bool) -> bool {
    let Some(first) = name.chars().next() else {
        return true;
    };
    first.is_ascii_digit()
        || name.chars().any(|c| !(c.is_alphanumeric() || c == '_'))
        || dialect.is_reserved_word(name)
        || (meta_store_convention && name.chars().any(char::is_uppercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_and_plain() {
        for kind in DialectKind::ALL {
            assert_eq!(quote_identifier("select", kind, false, false), "\"select\"");
            assert_eq!(quote_identifier("abc123", kind, false, false), "abc123");
            assert_eq!(quote_identifier("5abc", kind, false, false), "\"5abc\"");
        }
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(
            quote_identifier("first name", DialectKind::Standard, false, false),
            "\"first name\""
        );
        assert_eq!(
            quote_identifier("a\"b", DialectKind::Standard, false, false),
            "\"a\"\"b\""
        );
        assert_eq!(quote_identifier("", DialectKind::Standard, false, false), "\"\"");
    }

    #[test]
    fn test_already_quoted_passes_through() {
        assert_eq!(
            quote_identifier("\"Mixed\"", DialectKind::Postgresql, true, true),
            "\"Mixed\""
        );
        assert_eq!(quote_identifier("`t`", DialectKind::Mysql, false, true), "`t`");
    }

    #[test]
    fn test_meta_store_and_force() {
        assert_eq!(quote_identifier("Name", DialectKind::Standard, false, false), "Name");
        assert_eq!(
            quote_identifier("Name", DialectKind::Standard, true, false),
            "\"Name\""
        );
        assert_eq!(quote_identifier("name", DialectKind::Standard, false, true), "\"name\"");
    }

    #[test]
    fn test_dialect_quote_character() {
        let mysql = DialectKind::Mysql.dialect();
        assert_eq!(quote_for_dialect("order", mysql, false, false), "`order`");
        assert_eq!(quote_for_dialect("id", mysql, false, false), "id");
    }

    #[test]
    fn test_delimiters_follow_the_target_dialect() {
        let mysql = DialectKind::Mysql.dialect();
        let postgres = DialectKind::Postgresql.dialect();
        assert_eq!(quote_for_dialect("\"Order\"", mysql, false, false), "`Order`");
        assert_eq!(quote_for_dialect("`select`", postgres, false, false), "\"select\"");
        assert_eq!(quote_for_dialect("\"a\"\"b\"", mysql, false, false), "`a\"b`");
        assert_eq!(quote_for_dialect("`a``b`", postgres, false, false), "\"a`b\"");
        assert_eq!(quote_for_dialect("\"x\"", postgres, false, false), "\"x\"");
        assert_eq!(strip_delimiters("plain"), None);
        assert_eq!(strip_delimiters("\""), None);
    }
}
