use crate::cli::{SchemaDumpArgs, SchemaValidateArgs};
use crate::config::{DEFAULT_SNAPSHOT, ProjectConfig};
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use dmlkit_ddl::mysql::MySqlClient;
use dmlkit_ddl::{Context, DbClient, TableOption, Tables, TablesSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Connection settings merged from the config file and the command line.
#[derive(Debug, Clone, PartialEq)]
struct Target {
    database_url: String,
    max_connections: u32,
    timeout: Option<Duration>,
    table_names: Vec<String>,
    snapshot: PathBuf,
}

fn resolve_target(
    config: &Path,
    database: Option<&str>,
    tables: Option<&[String]>,
    snapshot: Option<&Path>,
) -> anyhow::Result<Target> {
    if config.exists() {
        let project = ProjectConfig::load(config)?;
        return Ok(Target {
            database_url: database
                .map(str::to_string)
                .unwrap_or_else(|| project.file.database.url.clone()),
            max_connections: project.file.database.max_connections,
            timeout: project.file.database.timeout_secs.map(Duration::from_secs),
            table_names: tables
                .map(<[String]>::to_vec)
                .unwrap_or_else(|| project.file.tables.names.clone()),
            snapshot: snapshot
                .map(Path::to_path_buf)
                .unwrap_or_else(|| project.snapshot_path()),
        });
    }

    let Some(database_url) = database else {
        anyhow::bail!(
            "failed to load config {}; provide --database or create the config file",
            config.display()
        );
    };
    Ok(Target {
        database_url: database_url.to_string(),
        max_connections: 2,
        timeout: None,
        table_names: tables.map(<[String]>::to_vec).unwrap_or_default(),
        snapshot: snapshot
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT)),
    })
}

impl Target {
    fn context(&self) -> Context {
        match self.timeout {
            Some(d) => Context::background().with_timeout(d),
            None => Context::background(),
        }
    }

    async fn connect(&self) -> anyhow::Result<Arc<MySqlClient>> {
        let client = MySqlClient::connect(&self.database_url, self.max_connections)
            .await
            .map_err(|e| anyhow::anyhow!("failed to connect to database: {e}"))?;
        Ok(Arc::new(client))
    }
}

pub async fn run_dump(args: SchemaDumpArgs) -> anyhow::Result<()> {
    let target = resolve_target(
        &args.config,
        args.database.as_deref(),
        args.tables.as_deref(),
        args.out.as_deref(),
    )?;
    let db = target.connect().await?;

    let snapshot = dump(&target.context(), db.clone(), &target.table_names).await;
    db.close().await?;
    let snapshot = snapshot?;

    snapshot.write(&target.snapshot)?;
    println!("{}", summary_table(&snapshot));
    println!(
        "{} wrote {} table(s) to {}",
        "✓".green().bold(),
        snapshot.tables.len(),
        target.snapshot.display()
    );
    Ok(())
}

pub async fn run_validate(args: SchemaValidateArgs) -> anyhow::Result<()> {
    let target = resolve_target(
        &args.config,
        args.database.as_deref(),
        None,
        args.snapshot.as_deref(),
    )?;
    let snapshot = TablesSnapshot::read(&target.snapshot)?;
    let db = target.connect().await?;

    match validate(&target.context(), db, &snapshot).await {
        Ok(count) => {
            println!(
                "{} {count} table(s) from {} match the database",
                "✓".green().bold(),
                target.snapshot.display()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), "schema mismatch".red());
            Err(e)
        }
    }
}

/// Load `names` (or every table) into a fresh registry and snapshot it.
async fn dump(
    ctx: &Context,
    db: Arc<dyn DbClient>,
    names: &[String],
) -> anyhow::Result<TablesSnapshot> {
    let tables = Tables::default();
    tables.with_table_load_columns(ctx, db, names).await?;
    tracing::info!(tables = tables.len(), "loaded table metadata");
    Ok(tables.snapshot())
}

/// Validate the snapshot's tables against `db`; returns the table count.
async fn validate(
    ctx: &Context,
    db: Arc<dyn DbClient>,
    snapshot: &TablesSnapshot,
) -> anyhow::Result<usize> {
    let tables = Tables::from_snapshot(snapshot, [TableOption::db(db)])?;
    let res = tables.validate(ctx).await;
    tables.close().await?;
    res?;
    Ok(tables.len())
}

fn summary_table(snapshot: &TablesSnapshot) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Table").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
            Cell::new("Columns").add_attribute(Attribute::Bold),
            Cell::new("Primary key").add_attribute(Attribute::Bold),
        ]);

    for (name, t) in &snapshot.tables {
        let kind = if t.is_view {
            Cell::new("view").fg(Color::Yellow)
        } else {
            Cell::new("table").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(name),
            kind,
            Cell::new(t.columns.len()),
            Cell::new(t.columns.primary_keys().field_names().join(", ")),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmlkit::Value;
    use dmlkit_ddl::mock::{MockClient, MockRows};
    use dmlkit_ddl::{Column, ColumnKey, TableSnapshot};
    use std::collections::BTreeMap;

    const HEADER: [&str; 6] = [
        "TABLE_NAME",
        "COLUMN_NAME",
        "ORDINAL_POSITION",
        "IS_NULLABLE",
        "COLUMN_TYPE",
        "COLUMN_KEY",
    ];

    fn store_rows(code_type: &str) -> MockRows {
        let s = |v: &str| Value::String(v.to_string());
        MockRows::new(&HEADER)
            .row(vec![
                s("store"),
                s("store_id"),
                Value::Uint64(1),
                s("NO"),
                s("smallint(5) unsigned"),
                s("PRI"),
            ])
            .row(vec![
                s("store"),
                s("code"),
                Value::Uint64(2),
                s("YES"),
                s(code_type),
                s(""),
            ])
    }

    fn store_snapshot() -> TablesSnapshot {
        let mut tables = BTreeMap::new();
        tables.insert(
            "store".to_string(),
            TableSnapshot {
                is_view: false,
                columns: [
                    Column::new("store_id")
                        .column_type("smallint(5) unsigned")
                        .not_null()
                        .key(ColumnKey::Primary),
                    Column::new("code").column_type("varchar(32)"),
                ]
                .into_iter()
                .collect(),
            },
        );
        TablesSnapshot::new(tables)
    }

    #[test]
    fn target_requires_database_without_config() {
        let err = resolve_target(Path::new("/nonexistent/dmlkit.toml"), None, None, None)
            .unwrap_err();
        assert!(err.to_string().contains("provide --database"), "{err}");

        let names = vec!["store".to_string()];
        let target = resolve_target(
            Path::new("/nonexistent/dmlkit.toml"),
            Some("mysql://root@localhost/shop"),
            Some(names.as_slice()),
            None,
        )
        .unwrap();
        assert_eq!(target.table_names, names);
        assert_eq!(target.snapshot, PathBuf::from(DEFAULT_SNAPSHOT));
        assert_eq!(target.timeout, None);
    }

    #[tokio::test]
    async fn dump_builds_snapshot() {
        let mock = MockClient::shared();
        mock.expect_query("information_schema").rows(store_rows("varchar(32)"));

        let snapshot = dump(&Context::background(), mock.clone(), &["store".to_string()])
            .await
            .unwrap();
        let store = &snapshot.tables["store"];
        assert!(!store.is_view);
        assert_eq!(store.columns.field_names(), ["store_id", "code"]);
        assert_eq!(store.columns.primary_keys().field_names(), ["store_id"]);
        assert_eq!(store.columns.by_field("code").unwrap().column_type, "varchar(32)");

        let rendered = summary_table(&snapshot).to_string();
        assert!(rendered.contains("store_id"), "{rendered}");
        assert!(rendered.contains("table"), "{rendered}");
    }

    #[tokio::test]
    async fn validate_matches_and_closes() {
        let mock = MockClient::shared();
        mock.expect_query("information_schema").rows(store_rows("varchar(32)"));

        let count = validate(&Context::background(), mock.clone(), &store_snapshot())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(mock.is_closed());
    }

    #[tokio::test]
    async fn validate_reports_mismatch() {
        let mock = MockClient::shared();
        mock.expect_query("information_schema").rows(store_rows("varchar(64)"));

        let err = validate(&Context::background(), mock.clone(), &store_snapshot())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not match MySQL column type"), "{err}");
        assert!(mock.is_closed());
    }
}
