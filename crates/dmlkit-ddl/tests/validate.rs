mod common;

use common::{CCD_FIELDS, COLUMNS_QUERY, admin_user_schema, ccd_schema, ccd_tables};
use dmlkit_ddl::mock::MockClient;
use dmlkit_ddl::{Column, Context, DbClient, SqlResult, Table, TableOption, Tables};
use std::sync::Arc;

fn with_mock(tables: &Tables) -> Arc<MockClient> {
    let db = MockClient::shared();
    tables.options([TableOption::db(db.clone())]).unwrap();
    db
}

fn edit_first_column(tables: &Tables, f: impl FnOnce(&mut Column)) {
    let mut table: Table = tables.must_table("core_config_data").as_ref().clone();
    f(&mut table.columns.0[0]);
    tables.upsert(table).unwrap();
}

async fn validate_against(tables: &Tables, db: &MockClient, fields: &[&'static str]) -> SqlResult<()> {
    db.expect_query(COLUMNS_QUERY).rows(ccd_schema(fields));
    let res = tables.validate(&Context::background()).await;
    db.expectations_met().unwrap();
    res
}

#[tokio::test]
async fn canceled_context() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();

    let err = tables.validate(&ctx).await.unwrap_err();
    assert_eq!(err.to_string(), "context canceled");
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn empty_registry_without_client_is_ok() {
    Tables::default()
        .validate(&Context::background())
        .await
        .unwrap();
}

#[tokio::test]
async fn matching_schema() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    validate_against(&tables, &db, &CCD_FIELDS).await.unwrap();

    let sql = &db.executed()[0];
    assert!(
        sql.ends_with("AND TABLE_NAME IN ('core_config_data') ORDER BY TABLE_NAME, ORDINAL_POSITION"),
        "{sql}"
    );
}

#[tokio::test]
async fn field_name_mismatch() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    edit_first_column(&tables, |c| c.field = "configID".to_string());

    let err = validate_against(&tables, &db, &CCD_FIELDS).await.unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(
        err.to_string(),
        "Mismatch: Table \"core_config_data\" with column name \"configID\" at index 0 does not match database column name \"config_id\""
    );
}

#[tokio::test]
async fn column_type_mismatch() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    edit_first_column(&tables, |c| c.column_type = "varchar(XX)".to_string());

    let err = validate_against(&tables, &db, &CCD_FIELDS).await.unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(
        err.to_string(),
        "Mismatch: Table \"core_config_data\" with registry column name \"config_id\" does not match MySQL column type. MySQL: \"int(10) unsigned\" registry: \"varchar(XX)\"."
    );
}

#[tokio::test]
async fn null_mismatch() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    edit_first_column(&tables, |c| c.null = "YES".to_string());

    let err = validate_against(&tables, &db, &CCD_FIELDS).await.unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(
        err.to_string(),
        "Mismatch: Table \"core_config_data\" with column name \"config_id\" does not match MySQL null types. MySQL: \"NO\" registry: \"YES\""
    );
}

#[tokio::test]
async fn table_count_mismatch() {
    let tables = ccd_tables();
    tables
        .options([TableOption::table(
            "customer_entity",
            [Column::new("entity_id").column_type("int(10) unsigned").not_null()],
        )])
        .unwrap();
    let db = with_mock(&tables);

    let err = validate_against(&tables, &db, &CCD_FIELDS).await.unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(
        err.to_string(),
        "Mismatch: Tables count 2 does not match table count 1 in database."
    );
}

#[tokio::test]
async fn database_reports_more_tables() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    let mut rows = ccd_schema(&CCD_FIELDS).into_rows();
    rows.extend(admin_user_schema().into_rows());
    db.expect_query(COLUMNS_QUERY).rows(rows);

    let err = tables.validate(&Context::background()).await.unwrap_err();
    assert!(err.is_mismatch(), "{err}");
    assert_eq!(
        err.to_string(),
        "Mismatch: Tables count 1 does not match table count 2 in database."
    );
    db.expectations_met().unwrap();
}

#[tokio::test]
async fn fewer_database_columns() {
    let tables = ccd_tables();
    let db = with_mock(&tables);

    let err = validate_against(&tables, &db, &CCD_FIELDS[..4]).await.unwrap_err();
    assert!(err.is_mismatch());
    assert_eq!(
        err.to_string(),
        "Mismatch: Table \"core_config_data\" has more columns (count 5) than its object (column count 4) in the database."
    );
}

#[tokio::test]
async fn more_database_columns_are_accepted() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    let mut fields = CCD_FIELDS.to_vec();
    fields.push("updated_at");

    validate_against(&tables, &db, &fields).await.unwrap();
}

#[tokio::test]
async fn driver_error_is_returned_unchanged() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    db.expect_query(COLUMNS_QUERY)
        .error(dmlkit_ddl::SqlError::already_closed("sql: database is closed"));

    let err = tables.validate(&Context::background()).await.unwrap_err();
    assert!(err.is_already_closed());
}

#[tokio::test]
async fn without_client_is_not_valid() {
    let err = ccd_tables().validate(&Context::background()).await.unwrap_err();
    assert!(err.is_not_valid(), "{err}");
}

#[tokio::test]
async fn empty_registry_skips_the_database() {
    let tables = Tables::default();
    let db = with_mock(&tables);
    tables.validate(&Context::background()).await.unwrap();
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn closed_registry() {
    let tables = ccd_tables();
    let db = with_mock(&tables);
    tables.close().await.unwrap();
    assert!(db.is_closed());

    let err = tables.validate(&Context::background()).await.unwrap_err();
    assert!(err.is_already_closed());
    assert!(db.query("SELECT 1").await.is_err());
}
