use super::*;
use crate::argument::Value;
use crate::error::ErrorKind;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
struct Customer {
    id: i64,
    first_name: String,
    group_id: Option<i64>,
    balance: f64,
}

impl ColumnMapper for Customer {
    fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
        match cm.mode() {
            MapMode::Describe => {
                cm.declare(["id", "first_name", "group_id", "balance"]);
                return Ok(());
            }
            MapMode::Append if !cm.has_columns() => {
                cm.int64(&mut self.id)?;
                cm.string(&mut self.first_name)?;
                cm.null_int64(&mut self.group_id)?;
                return cm.float64(&mut self.balance);
            }
            _ => {}
        }
        while cm.next_column() {
            match cm.column() {
                "id" | "entity_id" => cm.int64(&mut self.id)?,
                "first_name" => cm.string(&mut self.first_name)?,
                "group_id" => cm.null_int64(&mut self.group_id)?,
                "balance" => cm.float64(&mut self.balance)?,
                other => return Err(cm.unknown_column(other)),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Customers {
    data: Vec<Customer>,
}

impl ColumnMapper for Customers {
    fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
        match cm.mode() {
            MapMode::Scan => {
                if cm.count() == 1 {
                    self.data.clear();
                }
                let mut c = Customer::default();
                c.map_columns(cm)?;
                self.data.push(c);
                Ok(())
            }
            MapMode::Append => {
                for c in &mut self.data {
                    c.map_columns(cm)?;
                }
                Ok(())
            }
            MapMode::Describe => Err(cm.unsupported_mode()),
        }
    }
}

fn columns(names: &[&str]) -> Arc<[String]> {
    names.iter().map(|s| s.to_string()).collect()
}

fn customer_rows() -> Vec<Row> {
    let cols = columns(&["id", "first_name", "group_id", "balance"]);
    vec![
        Row::new(
            cols.clone(),
            vec![
                Value::Int64(1),
                Value::Text(b"Karl".to_vec()),
                Value::Null,
                Value::String("12.5".into()),
            ],
        )
        .unwrap(),
        Row::new(
            cols,
            vec![
                Value::Uint64(2),
                Value::String("Anna".into()),
                Value::Int64(4),
                Value::Float64(0.0),
            ],
        )
        .unwrap(),
    ]
}

#[test]
fn map_mode_from_char() {
    assert_eq!(MapMode::try_from('a').unwrap(), MapMode::Append);
    assert_eq!(MapMode::try_from('w').unwrap(), MapMode::Scan);
    assert_eq!(MapMode::try_from('r').unwrap(), MapMode::Describe);
    let err = MapMode::try_from('x').unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert_eq!(MapMode::Scan.as_char(), 'w');
}

#[test]
fn scan_rows_into_collection() {
    let mut customers = Customers::default();
    scan_rows(&mut customers, &customer_rows()).unwrap();

    assert_eq!(customers.data.len(), 2);
    assert_eq!(
        customers.data[0],
        Customer {
            id: 1,
            first_name: "Karl".into(),
            group_id: None,
            balance: 12.5,
        }
    );
    assert_eq!(customers.data[1].id, 2);
    assert_eq!(customers.data[1].group_id, Some(4));
}

#[test]
fn second_batch_resets_collection() {
    let mut customers = Customers::default();
    let rows = customer_rows();
    scan_rows(&mut customers, &rows).unwrap();
    scan_rows(&mut customers, &rows[..1]).unwrap();
    assert_eq!(customers.data.len(), 1);
}

#[test]
fn unknown_column_is_not_found() {
    let row = Row::new(columns(&["id", "email"]), vec![Value::Int64(1), Value::Null]).unwrap();
    let mut c = Customer::default();
    let err = scan_rows(&mut c, &[row]).unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert!(err.to_string().contains("\"email\""), "{err}");
}

#[test]
fn describe_unsupported_on_collection() {
    let mut customers = Customers::default();
    let err = describe(&mut customers).unwrap_err();
    assert!(err.is_not_supported(), "{err}");
}

#[test]
fn describe_reports_columns() {
    let mut c = Customer::default();
    assert_eq!(
        describe(&mut c).unwrap(),
        vec!["id", "first_name", "group_id", "balance"]
    );
}

#[test]
fn append_all_fields() {
    let mut c = Customer {
        id: 7,
        first_name: "Zoe".into(),
        group_id: None,
        balance: 1.25,
    };
    let args = append_args(&mut c, &[]).unwrap();
    assert_eq!(
        args.flatten(),
        vec![
            Value::Int64(7),
            Value::String("Zoe".into()),
            Value::Null,
            Value::Float64(1.25),
        ]
    );
}

#[test]
fn append_selected_columns_in_order() {
    let mut c = Customer {
        id: 7,
        first_name: "Zoe".into(),
        group_id: Some(3),
        balance: 1.25,
    };
    let cols = vec!["group_id".to_string(), "id".to_string()];
    let args = append_args(&mut c, &cols).unwrap();
    assert_eq!(args.flatten(), vec![Value::Int64(3), Value::Int64(7)]);
}

#[test]
fn append_collection() {
    let mut customers = Customers::default();
    scan_rows(&mut customers, &customer_rows()).unwrap();
    let cols = vec!["id".to_string()];
    let args = append_args(&mut customers, &cols).unwrap();
    assert_eq!(args.flatten(), vec![Value::Int64(1), Value::Int64(2)]);
}

#[test]
fn next_rewinds_after_loop() {
    let row = Row::new(columns(&["a", "b"]), vec![Value::Int64(1), Value::Int64(2)]).unwrap();
    let mut cm = ColumnMap::scan(&row, 1);
    let mut seen = Vec::new();
    while cm.next_column() {
        seen.push(cm.column());
    }
    while cm.next_column() {
        seen.push(cm.column());
    }
    assert_eq!(seen, vec!["a", "b", "a", "b"]);
}

#[test]
fn conversion_failure_names_column() {
    let row = Row::new(columns(&["id"]), vec![Value::String("abc".into())]).unwrap();
    let mut c = Customer::default();
    let err = scan_rows(&mut c, &[row]).unwrap_err();
    assert!(err.is_not_valid());
    assert_eq!(
        err.to_string(),
        "Not valid: column \"id\": can not scan string into int64"
    );
}

#[test]
fn null_into_non_nullable_fails() {
    let row = Row::new(columns(&["balance"]), vec![Value::Null]).unwrap();
    let mut c = Customer::default();
    assert!(scan_rows(&mut c, &[row]).unwrap_err().is_not_valid());
}

#[test]
fn scan_time_from_text() {
    struct Stamp(chrono::NaiveDateTime, Option<chrono::NaiveDateTime>);
    impl ColumnMapper for Stamp {
        fn map_columns(&mut self, cm: &mut ColumnMap<'_>) -> SqlResult<()> {
            while cm.next_column() {
                match cm.column() {
                    "created_at" => cm.time(&mut self.0)?,
                    "updated_at" => cm.null_time(&mut self.1)?,
                    other => return Err(cm.unknown_column(other)),
                }
            }
            Ok(())
        }
    }

    let row = Row::new(
        columns(&["created_at", "updated_at"]),
        vec![Value::Text(b"2024-03-01 10:20:30".to_vec()), Value::Null],
    )
    .unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut s = Stamp(epoch, None);
    scan_rows(&mut s, &[row]).unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(10, 20, 30)
        .unwrap();
    assert_eq!(s.0, expected);
    assert_eq!(s.1, None);
}

#[test]
fn row_rejects_length_mismatch() {
    let err = Row::new(columns(&["a"]), vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);
}

#[test]
fn row_get_by_name() {
    let row = &customer_rows()[1];
    assert_eq!(row.get("first_name"), Some(&Value::String("Anna".into())));
    assert_eq!(row.get("nope"), None);
}
