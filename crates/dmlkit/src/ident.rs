//! Identifier validation and quoting.
//!
//! Identifiers (database, table, column, alias names) follow the MySQL rules for
//! unquoted names:
//!
//! - 1 to 63 bytes long
//! - only `[0-9a-zA-Z$_]`
//! - a single `.` separates a qualifier from the local name, each part is checked
//!   on its own
//! - `*` and `qualifier.*` are always valid
//!
//! # Example
//! ```
//! use dmlkit::ident::{IdentCheck, is_valid_identifier, quote_ident};
//!
//! assert_eq!(is_valid_identifier("catalog_product_entity"), IdentCheck::Valid);
//! assert_eq!(is_valid_identifier("e.entity_id"), IdentCheck::Valid);
//! assert_eq!(is_valid_identifier("H€llo"), IdentCheck::Character);
//! assert_eq!(quote_ident("e.entity_id"), "`e`.`entity_id`");
//! ```

use crate::error::{SqlError, SqlResult};

/// Longest identifier accepted, in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Outcome of [`is_valid_identifier`]. The discriminant is the diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IdentCheck {
    Valid = 0,
    /// Empty or longer than [`MAX_IDENTIFIER_LENGTH`].
    Length = 1,
    /// Contains a byte outside `[0-9a-zA-Z$_]`.
    Character = 2,
}

impl IdentCheck {
    /// Numeric code, `0` for a valid identifier.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_valid(self) -> bool {
        self == IdentCheck::Valid
    }

    fn describe(self) -> &'static str {
        match self {
            IdentCheck::Valid => "valid",
            IdentCheck::Length => "length must be between 1 and 63 bytes",
            IdentCheck::Character => "only [0-9a-zA-Z$_] are allowed",
        }
    }
}

/// Check `name` against the identifier grammar.
pub fn is_valid_identifier(name: &str) -> IdentCheck {
    if name == "*" {
        return IdentCheck::Valid;
    }
    match name.split_once('.') {
        Some((qualifier, local)) => match check_part(qualifier) {
            IdentCheck::Valid if local == "*" => IdentCheck::Valid,
            IdentCheck::Valid => check_part(local),
            failed => failed,
        },
        None => check_part(name),
    }
}

fn check_part(part: &str) -> IdentCheck {
    if part.is_empty() || part.len() > MAX_IDENTIFIER_LENGTH {
        return IdentCheck::Length;
    }
    if part
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'$' || b == b'_')
    {
        IdentCheck::Valid
    } else {
        IdentCheck::Character
    }
}

/// Like [`is_valid_identifier`] but returns a `NotValid` error naming the
/// identifier and the failed rule.
pub fn validate_identifier(name: &str) -> SqlResult<()> {
    match is_valid_identifier(name) {
        IdentCheck::Valid => Ok(()),
        failed => Err(SqlError::not_valid(format!(
            "invalid identifier {name:?} (Case {}): {}",
            failed.code(),
            failed.describe()
        ))),
    }
}

/// Quote an identifier with backticks, splitting on the first `.`.
///
/// Embedded backticks are doubled. `*` parts stay unquoted.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    write_quoted(&mut out, name);
    out
}

/// Write the quoted form of `name` into `buf`.
pub fn write_quoted(buf: &mut String, name: &str) {
    match name.split_once('.') {
        Some((qualifier, local)) => {
            write_part(buf, qualifier);
            buf.push('.');
            write_part(buf, local);
        }
        None => write_part(buf, name),
    }
}

fn write_part(buf: &mut String, part: &str) {
    if part == "*" {
        buf.push('*');
        return;
    }
    buf.push('`');
    for c in part.chars() {
        if c == '`' {
            buf.push('`');
        }
        buf.push(c);
    }
    buf.push('`');
}

/// Write `name` quoted, followed by `AS alias` when an alias is given.
pub fn write_quoted_as(buf: &mut String, name: &str, alias: Option<&str>) {
    write_quoted(buf, name);
    if let Some(alias) = alias.filter(|a| !a.is_empty()) {
        buf.push_str(" AS ");
        write_part(buf, alias);
    }
}

/// Quote `name` and an optional alias: `` `t`.`c` AS `x` ``.
pub fn quote_as(name: &str, alias: Option<&str>) -> String {
    let mut out = String::new();
    write_quoted_as(&mut out, name, alias);
    out
}

/// Write a column reference: valid identifiers are quoted, anything else is
/// written as a raw expression.
pub(crate) fn write_column_or_expr(buf: &mut String, expr: &str) {
    if is_valid_identifier(expr).is_valid() {
        write_quoted(buf, expr);
    } else {
        buf.push_str(expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_qualified_names() {
        assert_eq!(is_valid_identifier("core_config_data"), IdentCheck::Valid);
        assert_eq!(is_valid_identifier("$x_1"), IdentCheck::Valid);
        assert_eq!(is_valid_identifier("main_table.entity_id"), IdentCheck::Valid);
        assert_eq!(is_valid_identifier("*"), IdentCheck::Valid);
        assert_eq!(is_valid_identifier("main_table.*"), IdentCheck::Valid);
    }

    #[test]
    fn length_limits() {
        assert_eq!(is_valid_identifier(""), IdentCheck::Length);
        assert_eq!(is_valid_identifier(&"a".repeat(63)), IdentCheck::Valid);
        assert_eq!(is_valid_identifier(&"a".repeat(64)), IdentCheck::Length);
        assert_eq!(is_valid_identifier("t."), IdentCheck::Length);
        assert_eq!(is_valid_identifier(".c"), IdentCheck::Length);
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(is_valid_identifier("a`b"), IdentCheck::Character);
        assert_eq!(is_valid_identifier("H€llo"), IdentCheck::Character);
        assert_eq!(is_valid_identifier("x\u{f8ff}1"), IdentCheck::Character);
        assert_eq!(is_valid_identifier("a.b.c"), IdentCheck::Character);
        assert_eq!(is_valid_identifier("COUNT(*)"), IdentCheck::Character);
        assert_eq!(is_valid_identifier("a b"), IdentCheck::Character);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(IdentCheck::Valid.code(), 0);
        assert_eq!(IdentCheck::Length.code(), 1);
        assert_eq!(IdentCheck::Character.code(), 2);
    }

    #[test]
    fn validate_reports_case() {
        let err = validate_identifier("a`b").unwrap_err();
        assert!(err.is_not_valid());
        assert!(err.to_string().contains(r#"identifier "a`b" (Case 2)"#));
        assert!(validate_identifier("store").is_ok());
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_ident("name"), "`name`");
        assert_eq!(quote_ident("u.name"), "`u`.`name`");
        assert_eq!(quote_ident("u.na`me"), "`u`.`na``me`");
        assert_eq!(quote_ident("u.*"), "`u`.*");
        assert_eq!(quote_as("customer_entity", Some("ce")), "`customer_entity` AS `ce`");
        assert_eq!(quote_as("customer_entity", None), "`customer_entity`");
    }

    #[test]
    fn columns_and_expressions() {
        let mut buf = String::new();
        write_column_or_expr(&mut buf, "e.sku");
        buf.push(' ');
        write_column_or_expr(&mut buf, "COUNT(*)");
        assert_eq!(buf, "`e`.`sku` COUNT(*)");
    }
}
