//! # dmlkit-ddl
//!
//! Table metadata for [`dmlkit`]: column definitions, a concurrent table
//! registry, loading from and validating against MySQL's
//! `information_schema`, and JSON snapshots.
//!
//! ```
//! use dmlkit::QueryBuilder;
//! use dmlkit_ddl::{Column, ColumnKey, TableOption, Tables};
//!
//! let tables = Tables::new([TableOption::table(
//!     "store",
//!     [
//!         Column::new("store_id")
//!             .column_type("smallint(5) unsigned")
//!             .not_null()
//!             .key(ColumnKey::Primary),
//!         Column::new("code").column_type("varchar(32)"),
//!     ],
//! )])
//! .unwrap();
//!
//! let sql = tables.must_table("store").select_all().interpolate().unwrap();
//! assert_eq!(sql, "SELECT `store_id`, `code` FROM `store`");
//! ```
//!
//! ## Features
//!
//! - `mock`: [`mock::MockClient`], a scripted in-memory client.
//! - `mysql`: [`mysql::MySqlClient`], backed by a sqlx pool.

pub mod column;
pub mod context;
pub mod schema;
pub mod snapshot;
pub mod table;
pub mod tables;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use column::{Column, ColumnKey, Columns, TableColumns};
pub use context::{CancelHandle, Context};
pub use schema::{columns_query, load_columns};
pub use snapshot::{SNAPSHOT_VERSION, TableSnapshot, TablesSnapshot};
pub use table::Table;
pub use tables::{ObjectKind, TableOption, Tables, compare_columns};

pub use dmlkit::{DbClient, ErrorKind, Row, SqlError, SqlResult};
