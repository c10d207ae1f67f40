//! Template scanning: bracket rewriting and placeholder tokenization.
//!
//! Both passes skip quoted regions. Single-quoted strings and backtick
//! identifiers are copied as they are; double-quoted strings are normalized to
//! single-quoted ones by the bracket pass so later passes only see one string
//! quote style.

use crate::error::{SqlError, SqlResult};
use crate::ident::write_quoted;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Text(Range<usize>),
    /// A `?`; `paren` is set when written exactly as `(?)`.
    Placeholder { paren: bool },
    /// `:Name` or `@Name`, the range includes the prefix.
    Named(Range<usize>),
}

/// A template after bracket rewriting, split into segments.
#[derive(Debug, Clone, Default)]
pub(crate) struct Template {
    pub sql: String,
    pub segments: Vec<Segment>,
    pub placeholders: usize,
}

impl Template {
    pub fn compile(raw: &str) -> SqlResult<Self> {
        let sql = rewrite_brackets(raw)?;
        let segments = tokenize(&sql)?;
        let placeholders = segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder { .. }))
            .count();
        Ok(Self {
            sql,
            segments,
            placeholders,
        })
    }

    pub fn text(&self, range: &Range<usize>) -> &str {
        &self.sql[range.clone()]
    }
}

/// Index just past the closing quote of the quoted region starting at `start`.
///
/// Backslash escapes apply inside `'` and `"` strings; a doubled quote
/// character is an escaped quote in all three styles.
fn skip_quoted(b: &[u8], start: usize) -> SqlResult<usize> {
    let quote = b[start];
    let mut j = start + 1;
    while j < b.len() {
        let c = b[j];
        if c == b'\\' && quote != b'`' {
            j += 2;
            continue;
        }
        if c == quote {
            if b.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return Ok(j + 1);
        }
        j += 1;
    }
    Err(SqlError::not_valid(format!(
        "unterminated {} quote starting at byte {start}",
        quote as char
    )))
}

/// Rewrite `[name]` to `` `name` `` and `[a.b]` to `` `a`.`b` ``.
///
/// Only identifier-shaped content is rewritten: one or two dotted parts of
/// `[0-9a-zA-Z$_]`, a backtick allowed inside a part but not at its edges,
/// `*` as the second part, or a lone `?`. Anything else is left untouched,
/// so the pass is idempotent.
pub fn rewrite_brackets(sql: &str) -> SqlResult<String> {
    let b = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut run = 0;
    let mut i = 0;

    while i < b.len() {
        match b[i] {
            b'\'' | b'`' => {
                i = skip_quoted(b, i)?;
            }
            b'"' => {
                out.push_str(&sql[run..i]);
                let end = skip_quoted(b, i)?;
                write_single_quoted(&mut out, &sql[i + 1..end - 1]);
                i = end;
                run = i;
            }
            b'[' => {
                let close = sql[i + 1..].find(']').map(|p| i + 1 + p);
                match close {
                    Some(close) if is_bracket_identifier(&sql[i + 1..close]) => {
                        out.push_str(&sql[run..i]);
                        write_quoted(&mut out, &sql[i + 1..close]);
                        i = close + 1;
                        run = i;
                    }
                    _ => i += 1,
                }
            }
            _ => i += 1,
        }
    }
    out.push_str(&sql[run..]);
    Ok(out)
}

fn is_bracket_identifier(content: &str) -> bool {
    if content == "?" {
        return true;
    }
    match content.split_once('.') {
        Some((qualifier, "*")) => is_bracket_part(qualifier),
        Some((qualifier, local)) => is_bracket_part(qualifier) && is_bracket_part(local),
        None => is_bracket_part(content),
    }
}

/// Identifier characters, plus backticks strictly inside the part.
fn is_bracket_part(part: &str) -> bool {
    let b = part.as_bytes();
    match (b.first(), b.last()) {
        (Some(&first), Some(&last)) if first != b'`' && last != b'`' => b
            .iter()
            .all(|&c| c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$' | b'`')),
        _ => false,
    }
}

/// Re-quote the body of a double-quoted string with single quotes.
fn write_single_quoted(out: &mut String, body: &str) {
    out.push('\'');
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                out.push('"');
            }
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split `sql` into text, `?` placeholders and named parameters.
pub(crate) fn tokenize(sql: &str) -> SqlResult<Vec<Segment>> {
    let b = sql.as_bytes();
    let mut segments = Vec::new();
    let mut run = 0;
    let mut i = 0;

    let flush = |segments: &mut Vec<Segment>, run: usize, end: usize| {
        if end > run {
            segments.push(Segment::Text(run..end));
        }
    };

    while i < b.len() {
        match b[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(b, i)?;
            }
            b'?' => {
                flush(&mut segments, run, i);
                let paren = i > 0 && b[i - 1] == b'(' && b.get(i + 1) == Some(&b')');
                segments.push(Segment::Placeholder { paren });
                i += 1;
                run = i;
            }
            b':' | b'@'
                if b.get(i + 1).is_some_and(|&n| is_name_start(n))
                    && (i == 0 || !(is_name_byte(b[i - 1]) || matches!(b[i - 1], b':' | b'@'))) =>
            {
                flush(&mut segments, run, i);
                let mut end = i + 1;
                while end < b.len() && is_name_byte(b[end]) {
                    end += 1;
                }
                segments.push(Segment::Named(i..end));
                i = end;
                run = i;
            }
            _ => i += 1,
        }
    }
    flush(&mut segments, run, b.len());
    Ok(segments)
}
