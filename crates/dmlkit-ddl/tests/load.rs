mod common;

use common::{CCD_FIELDS, COLUMNS_QUERY, admin_user_schema, ccd_schema};
use dmlkit_ddl::mock::MockClient;
use dmlkit_ddl::{ColumnKey, Context, DbClient, ObjectKind, SqlError, TableOption, Tables};
use std::sync::Arc;

fn client() -> (Arc<MockClient>, Arc<dyn DbClient>) {
    let mock = MockClient::shared();
    let db: Arc<dyn DbClient> = mock.clone();
    (mock, db)
}

#[tokio::test]
async fn invalid_identifier() {
    let (mock, db) = client();
    let tables = Tables::default();
    let err = tables
        .with_table_load_columns(&Context::background(), db, &["H€llo"])
        .await
        .unwrap_err();
    assert!(err.is_not_valid(), "{err}");
    assert!(mock.executed().is_empty());
}

#[tokio::test]
async fn load_admin_user() {
    let (mock, db) = client();
    mock.expect_query(&format!("{COLUMNS_QUERY} AND TABLE_NAME IN \\('admin_user'\\)"))
        .rows(admin_user_schema());

    let tables = Tables::default();
    tables
        .with_table_load_columns(&Context::background(), db, &["admin_user"])
        .await
        .unwrap();
    mock.expectations_met().unwrap();

    let table = tables.must_table("admin_user");
    assert_eq!(table.field_names(), ["user_id", "firstname", "modified"]);
    assert!(!table.is_view);
    assert!(table.db().is_ok());

    let user_id = table.columns.by_field("user_id").unwrap();
    assert!(user_id.is_primary_key());
    assert!(user_id.is_auto_increment());
    assert!(user_id.is_unsigned());
    assert_eq!(user_id.position, 1);
    assert_eq!(user_id.comment, "User ID");

    let firstname = table.columns.by_field("firstname").unwrap();
    assert!(firstname.is_nullable());
    assert_eq!(firstname.default, None);
    assert_eq!(firstname.char_max_length, Some(32));
    assert_eq!(firstname.key, ColumnKey::None);

    let modified = table.columns.by_field("modified").unwrap();
    assert_eq!(modified.default.as_deref(), Some("CURRENT_TIMESTAMP"));
    assert_eq!(modified.position, 8);
}

#[tokio::test]
async fn missing_table_is_not_found() {
    let (mock, db) = client();
    mock.expect_query(COLUMNS_QUERY).rows(admin_user_schema());

    let tables = Tables::default();
    let err = tables
        .with_table_load_columns(&Context::background(), db, &["admin_user", "admin_role"])
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert!(tables.is_empty());
}

#[tokio::test]
async fn load_all_tables() {
    let (mock, db) = client();
    let mut rows = admin_user_schema().into_rows();
    rows.extend(ccd_schema(&CCD_FIELDS).into_rows());
    mock.expect_query(&format!("{COLUMNS_QUERY} ORDER BY")).rows(rows);

    let tables = Tables::default();
    tables
        .with_table_load_columns::<&str>(&Context::background(), db, &[])
        .await
        .unwrap();
    assert_eq!(tables.table_names(), ["admin_user", "core_config_data"]);
    assert_eq!(tables.must_table("core_config_data").columns.len(), 5);
}

#[tokio::test]
async fn reload_keeps_listeners() {
    let (mock, db) = client();
    mock.expect_query(COLUMNS_QUERY).rows(admin_user_schema());

    let listeners = dmlkit::Listeners::new().on_select(|s| {
        *s = s.clone().limit(1);
    });
    let tables = Tables::must_new([TableOption::dml_listeners("admin_user", [listeners])]);
    tables
        .with_table_load_columns(&Context::background(), db, &["admin_user"])
        .await
        .unwrap();

    let table = tables.must_table("admin_user");
    assert_eq!(table.field_names().len(), 3);
    assert_eq!(table.listeners.select.len(), 1);
}

#[tokio::test]
async fn drop_error_propagates() {
    let (mock, db) = client();
    mock.expect_exec("^DROP TABLE IF EXISTS `testTable`$")
        .error(SqlError::already_closed("sql: database is closed"));

    let tables = Tables::default();
    let err = tables
        .with_table_or_view_from_query(
            &Context::background(),
            db,
            ObjectKind::Table,
            "testTable",
            "SELECT * FROM catalog_product_entity",
            true,
        )
        .await
        .unwrap_err();
    assert!(err.is_already_closed(), "{err}");
    assert!(tables.is_empty());
}

#[tokio::test]
async fn create_error_propagates() {
    let (mock, db) = client();
    mock.expect_exec(r"^CREATE TABLE `testTable` AS SELECT \* FROM catalog_product_entity$")
        .error(SqlError::already_closed("sql: database is closed"));

    let tables = Tables::default();
    let err = tables
        .with_table_or_view_from_query(
            &Context::background(),
            db,
            ObjectKind::Table,
            "testTable",
            "SELECT * FROM catalog_product_entity",
            false,
        )
        .await
        .unwrap_err();
    assert!(err.is_already_closed(), "{err}");
}

#[tokio::test]
async fn load_error_after_create_propagates() {
    let (mock, db) = client();
    mock.expect_exec("^DROP TABLE IF EXISTS").affected(0);
    mock.expect_exec("^CREATE TABLE `testTable`").affected(0);
    mock.expect_query(COLUMNS_QUERY)
        .error(SqlError::already_closed("sql: database is closed"));

    let tables = Tables::default();
    let err = tables
        .with_table_or_view_from_query(
            &Context::background(),
            db,
            ObjectKind::Table,
            "testTable",
            "SELECT * FROM catalog_product_entity",
            true,
        )
        .await
        .unwrap_err();
    assert!(err.is_already_closed(), "{err}");
    mock.expectations_met().unwrap();
}

#[tokio::test]
async fn create_view() {
    let (mock, db) = client();
    mock.expect_exec(r"^CREATE VIEW `testTable` AS SELECT \* FROM core_config_data$")
        .affected(0);
    let mut rows = Vec::new();
    for row in ccd_schema(&CCD_FIELDS).into_rows() {
        let columns: Vec<String> = row.columns().to_vec();
        let mut values = row.values().to_vec();
        values[0] = dmlkit::Value::String("testTable".into());
        rows.push(dmlkit::Row::new(columns.into(), values).unwrap());
    }
    mock.expect_query(COLUMNS_QUERY).rows(rows);

    let tables = Tables::default();
    tables
        .with_table_or_view_from_query(
            &Context::background(),
            db,
            "view".parse().unwrap(),
            "testTable",
            "SELECT * FROM core_config_data",
            false,
        )
        .await
        .unwrap();
    mock.expectations_met().unwrap();

    let view = tables.must_table("testTable");
    assert_eq!(view.name, "testTable");
    assert!(view.is_view);
    assert_eq!(view.field_names(), CCD_FIELDS);
}

#[tokio::test]
async fn closed_registry_rejects_loads() {
    let (mock, db) = client();
    let tables = Tables::default();
    tables.close().await.unwrap();

    let err = tables
        .with_table_load_columns(&Context::background(), db, &["admin_user"])
        .await
        .unwrap_err();
    assert!(err.is_already_closed());
    assert!(mock.executed().is_empty());
}
