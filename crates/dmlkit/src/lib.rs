//! # dmlkit
//!
//! MySQL-dialect SQL building blocks.
//!
//! ## Features
//!
//! - **Arguments**: typed, ordered statement arguments with an optional comparison operator
//! - **Interpolation**: turn `?` placeholders into escaped MySQL literals
//! - **Identifiers**: validation and backtick quoting for table and column names
//! - **Conditions**: composable WHERE / HAVING / JOIN fragments with parenthesis groups
//! - **ColumnMapper**: one trait per record type for writing arguments and scanning rows
//! - **Statements**: SELECT and DELETE builders with per-statement listeners
//!
//! ## Interpolation
//!
//! ```
//! use dmlkit::{Arguments, interpolate};
//!
//! let sql = interpolate(
//!     "SELECT * FROM `sales_order` WHERE `entity_id` IN (?) AND `status` = ?",
//!     &Arguments::new().int64s([3, 4]).str("pending"),
//! )?;
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM `sales_order` WHERE `entity_id` IN (3,4) AND `status` = 'pending'"
//! );
//! # Ok::<(), dmlkit::SqlError>(())
//! ```
//!
//! ## Statements
//!
//! ```
//! use dmlkit::condition::column;
//! use dmlkit::{QueryBuilder, Select};
//!
//! let sql = Select::new(["sku"])
//!     .from("catalog_product_entity")
//!     .where_(column("entity_id").greater(100))
//!     .limit(5)
//!     .interpolate()?;
//! assert_eq!(
//!     sql,
//!     "SELECT `sku` FROM `catalog_product_entity` WHERE (`entity_id` > 100) LIMIT 5"
//! );
//! # Ok::<(), dmlkit::SqlError>(())
//! ```

pub mod argument;
pub mod client;
pub mod condition;
pub mod error;
pub mod ident;
pub mod interpolate;
pub mod mapper;
pub mod stmt;

pub use argument::{Argument, Arguments, IntoValue, Op, Valuer, Value};
pub use client::DbClient;
pub use condition::{
    ClauseKind, Eq, EqMap, Logical, Operand, WhereFragment, WhereFragments, cond, column,
    paren_close, paren_open, sub_select, using,
};
pub use error::{BoxError, ErrorKind, SqlError, SqlResult};
pub use ident::{
    IdentCheck, MAX_IDENTIFIER_LENGTH, is_valid_identifier, quote_as, quote_ident,
    validate_identifier,
};
pub use interpolate::{Interpolate, interpolate, repeat, rewrite_brackets};
pub use mapper::{ColumnMap, ColumnMapper, MapMode, Row, append_args, describe, scan_rows};
pub use stmt::{Alias, Delete, Listeners, QueryBuilder, Select};
