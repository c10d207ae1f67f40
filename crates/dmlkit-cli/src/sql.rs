use crate::cli::SqlInterpolateArgs;
use dmlkit::{Interpolate, Value};

pub fn run(args: SqlInterpolateArgs) -> anyhow::Result<()> {
    println!("{}", interpolate(&args)?);
    Ok(())
}

fn interpolate(args: &SqlInterpolateArgs) -> anyhow::Result<String> {
    let ip = args
        .args
        .iter()
        .fold(Interpolate::new(&args.template), |ip, arg| {
            ip.value(parse_value(arg))
        });
    tracing::debug!(template = %ip.template(), args = args.args.len(), "interpolate");
    Ok(ip.to_sql()?)
}

/// Command line argument to a value: integers, finite floats, `null` and
/// booleans are typed, everything else is a string.
fn parse_value(arg: &str) -> Value {
    if arg.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(v) = arg.parse::<i64>() {
        return Value::Int64(v);
    }
    if let Ok(v) = arg.parse::<u64>() {
        return Value::Uint64(v);
    }
    if let Ok(v) = arg.parse::<f64>() {
        if v.is_finite() && arg.bytes().any(|b| b.is_ascii_digit()) {
            return Value::Float64(v);
        }
    }
    match arg {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(arg.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(template: &str, args: &[&str]) -> anyhow::Result<String> {
        interpolate(&SqlInterpolateArgs {
            template: template.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn typed_arguments() {
        let sql = run(
            "SELECT * FROM t WHERE a = ? AND b = ? AND c = ? AND d IS ? AND e = ?",
            &["42", "1.5", "it's", "null", "true"],
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE a = 42 AND b = 1.5 AND c = 'it\\'s' AND d IS NULL AND e = 1"
        );
    }

    #[test]
    fn parse_values() {
        assert_eq!(parse_value("-7"), Value::Int64(-7));
        assert_eq!(parse_value("18446744073709551615"), Value::Uint64(u64::MAX));
        assert_eq!(parse_value("NULL"), Value::Null);
        assert_eq!(parse_value("inf"), Value::String("inf".to_string()));
        assert_eq!(parse_value("NaN"), Value::String("NaN".to_string()));
    }

    #[test]
    fn imbalance_is_an_error() {
        let err = run("SELECT ?, ?", &["1"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not valid: arguments are imbalanced: 2 placeholder(s) but 1 argument(s)"
        );
    }
}
