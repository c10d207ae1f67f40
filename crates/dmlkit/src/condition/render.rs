use super::{Operand, WhereFragment};
use crate::argument::{Arguments, Op};
use crate::error::{SqlError, SqlResult};
use crate::ident::{is_valid_identifier, write_column_or_expr, write_quoted};

/// Which clause a fragment list renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Where,
    Having,
    Join,
}

/// Render `fragments` into `buf` and append their arguments to `args` in
/// placeholder order.
///
/// `Where` and `Having` write their keyword, `Join` writes `ON` before the
/// first fragment or a `USING` list, which ends the clause.
pub fn write_fragments(
    fragments: &[WhereFragment],
    kind: ClauseKind,
    buf: &mut String,
    args: &mut Arguments,
) -> SqlResult<()> {
    if fragments.is_empty() {
        return Ok(());
    }

    match kind {
        ClauseKind::Where => buf.push_str(" WHERE "),
        ClauseKind::Having => buf.push_str(" HAVING "),
        ClauseKind::Join => {}
    }

    // Fragments written in the current parenthesis group.
    let mut written = 0;
    let mut on_written = false;
    for f in fragments {
        if kind == ClauseKind::Join {
            if !f.using.is_empty() {
                buf.push_str(" USING (");
                for (i, c) in f.using.iter().enumerate() {
                    if i > 0 {
                        buf.push(',');
                    }
                    write_quoted(buf, c);
                }
                buf.push(')');
                return Ok(());
            }
            if !on_written {
                buf.push_str(" ON ");
                on_written = true;
            }
        }

        if f.is_paren_close() {
            buf.push(')');
            continue;
        }

        if written > 0 {
            buf.push_str(f.logical.as_sql());
        }

        if f.is_paren_open() {
            written = 0;
            buf.push('(');
            continue;
        }

        buf.push('(');
        if is_valid_identifier(&f.condition).is_valid() {
            write_column(f, buf, args)?;
        } else {
            write_expression(f, buf, args);
        }
        buf.push(')');
        written += 1;
    }
    Ok(())
}

/// Raw expression: written verbatim with all arguments appended. An
/// expression without placeholders and exactly one argument is compared with
/// that argument's operator.
fn write_expression(f: &WhereFragment, buf: &mut String, args: &mut Arguments) {
    buf.push_str(&f.condition);
    if let Some(operand) = &f.operand {
        write_operand(f, operand, buf, args);
        return;
    }
    if f.arguments.count() == 1 && !f.condition.contains('?') {
        if let Some(first) = f.arguments.get(0) {
            let op = effective_op(first.op, &first.value);
            buf.push_str(op.as_sql());
            buf.push_str(op.placeholder());
            if !op.takes_argument() {
                return;
            }
        }
    }
    args.append(&mut f.arguments.clone());
}

fn write_column(f: &WhereFragment, buf: &mut String, args: &mut Arguments) -> SqlResult<()> {
    write_quoted(buf, &f.condition);

    if let Some(sub) = &f.sub {
        buf.push_str(sub.op.as_sql());
        buf.push('(');
        sub.select.write_sql(buf, args).map_err(|e| match e {
            SqlError::NotValid(msg) => SqlError::not_valid(format!(
                "sub-select for column {:?} failed: {msg}",
                f.condition
            )),
            other => other,
        })?;
        buf.push(')');
        return Ok(());
    }

    if let Some(operand) = &f.operand {
        write_operand(f, operand, buf, args);
        return Ok(());
    }

    let Some(first) = f.arguments.get(0) else {
        return Err(SqlError::not_valid(format!(
            "condition on column {:?} has no argument",
            f.condition
        )));
    };
    let op = effective_op(first.op, &first.value);
    buf.push_str(op.as_sql());
    buf.push_str(op.placeholder());
    if op.takes_argument() {
        args.append(&mut f.arguments.clone());
    }
    Ok(())
}

/// Column comparisons take no argument. Placeholders append whatever a bound
/// record supplied; an unbound placeholder appends nothing.
fn write_operand(f: &WhereFragment, operand: &Operand, buf: &mut String, args: &mut Arguments) {
    match operand {
        Operand::Column(op, other) => {
            buf.push_str(op.as_sql());
            write_column_or_expr(buf, other);
        }
        Operand::Placeholder(op) => {
            let op = f
                .arguments
                .get(0)
                .map_or(*op, |first| effective_op(*op, &first.value));
            buf.push_str(op.as_sql());
            buf.push_str(op.placeholder());
            if op.takes_argument() {
                args.append(&mut f.arguments.clone());
            }
        }
    }
}

/// `= NULL` becomes `IS NULL`, `= (list)` becomes `IN`.
fn effective_op(op: Op, value: &crate::argument::Value) -> Op {
    match op {
        Op::Equal if value.is_null() => Op::IsNull,
        Op::NotEqual if value.is_null() => Op::IsNotNull,
        Op::Equal if value.is_list() => Op::In,
        Op::NotEqual if value.is_list() => Op::NotIn,
        op => op,
    }
}
