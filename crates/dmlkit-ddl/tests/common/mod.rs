#![allow(dead_code)]

use dmlkit::Value;
use dmlkit_ddl::mock::MockRows;
use dmlkit_ddl::{Column, ColumnKey, TableOption, Tables};

pub const COLUMNS_QUERY: &str = r"^SELECT TABLE_NAME, COLUMN_NAME.+ FROM information_schema\.COLUMNS WHERE TABLE_SCHEMA=DATABASE\(\)";

const SCHEMA_HEADER: [&str; 13] = [
    "TABLE_NAME",
    "COLUMN_NAME",
    "ORDINAL_POSITION",
    "COLUMN_DEFAULT",
    "IS_NULLABLE",
    "DATA_TYPE",
    "CHARACTER_MAXIMUM_LENGTH",
    "NUMERIC_PRECISION",
    "NUMERIC_SCALE",
    "COLUMN_TYPE",
    "COLUMN_KEY",
    "EXTRA",
    "COLUMN_COMMENT",
];

/// One `information_schema.COLUMNS` row.
pub struct SchemaRow<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub position: u64,
    pub default: Option<&'a str>,
    pub nullable: bool,
    pub data_type: &'a str,
    pub char_len: Option<i64>,
    pub precision: Option<i64>,
    pub column_type: &'a str,
    pub key: &'a str,
    pub extra: &'a str,
    pub comment: &'a str,
}

fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

fn opt_int(v: Option<i64>) -> Value {
    v.map_or(Value::Null, Value::Int64)
}

pub fn schema_rows(rows: &[SchemaRow<'_>]) -> MockRows {
    rows.iter().fold(MockRows::new(&SCHEMA_HEADER), |acc, r| {
        acc.row(vec![
            text(r.table),
            text(r.column),
            Value::Uint64(r.position),
            r.default.map_or(Value::Null, text),
            text(if r.nullable { "YES" } else { "NO" }),
            text(r.data_type),
            opt_int(r.char_len),
            opt_int(r.precision),
            opt_int(r.precision.map(|_| 0)),
            text(r.column_type),
            text(r.key),
            text(r.extra),
            text(r.comment),
        ])
    })
}

/// The `core_config_data` table as the code declares it.
pub fn ccd_columns() -> Vec<Column> {
    vec![
        Column::new("config_id")
            .column_type("int(10) unsigned")
            .not_null()
            .key(ColumnKey::Primary)
            .extra("auto_increment"),
        Column::new("scope")
            .column_type("varchar(8)")
            .not_null()
            .key(ColumnKey::Multiple)
            .default_value("default"),
        Column::new("scope_id")
            .column_type("int(11)")
            .not_null()
            .default_value("0"),
        Column::new("path")
            .column_type("varchar(255)")
            .not_null()
            .default_value("general"),
        Column::new("value").column_type("text"),
    ]
}

pub fn ccd_tables() -> Tables {
    Tables::must_new([TableOption::table("core_config_data", ccd_columns())])
}

fn ccd_row(column: &str, position: u64) -> SchemaRow<'_> {
    let (default, nullable, data_type, char_len, precision, column_type, key, extra) = match column {
        "config_id" => (None, false, "int", None, Some(10), "int(10) unsigned", "PRI", "auto_increment"),
        "scope" => (Some("default"), false, "varchar", Some(8), None, "varchar(8)", "MUL", ""),
        "scope_id" => (Some("0"), false, "int", None, Some(10), "int(11)", "", ""),
        "path" => (Some("general"), false, "varchar", Some(255), None, "varchar(255)", "", ""),
        "value" => (None, true, "text", Some(65535), None, "text", "", ""),
        _ => (None, true, "varchar", Some(255), None, "varchar(255)", "", ""),
    };
    SchemaRow {
        table: "core_config_data",
        column,
        position,
        default,
        nullable,
        data_type,
        char_len,
        precision,
        column_type,
        key,
        extra,
        comment: "",
    }
}

/// `core_config_data` as the database reports it, with the given columns.
pub fn ccd_schema(columns: &[&'static str]) -> MockRows {
    let rows: Vec<SchemaRow<'static>> = columns
        .iter()
        .enumerate()
        .map(|(i, &c)| ccd_row(c, i as u64 + 1))
        .collect();
    schema_rows(&rows)
}

pub const CCD_FIELDS: [&str; 5] = ["config_id", "scope", "scope_id", "path", "value"];

pub fn admin_user_schema() -> MockRows {
    schema_rows(&[
        SchemaRow {
            table: "admin_user",
            column: "user_id",
            position: 1,
            default: None,
            nullable: false,
            data_type: "int",
            char_len: None,
            precision: Some(10),
            column_type: "int(10) unsigned",
            key: "PRI",
            extra: "auto_increment",
            comment: "User ID",
        },
        SchemaRow {
            table: "admin_user",
            column: "firstname",
            position: 2,
            default: None,
            nullable: true,
            data_type: "varchar",
            char_len: Some(32),
            precision: None,
            column_type: "varchar(32)",
            key: "",
            extra: "",
            comment: "User First Name",
        },
        SchemaRow {
            table: "admin_user",
            column: "modified",
            position: 8,
            default: Some("CURRENT_TIMESTAMP"),
            nullable: false,
            data_type: "timestamp",
            char_len: None,
            precision: None,
            column_type: "timestamp",
            key: "",
            extra: "on update CURRENT_TIMESTAMP",
            comment: "User Modified Time",
        },
    ])
}
