//! Transactional row store for the TurboCommerce configurator.
//!
//! Tables hold rows of typed [`Value`]s. Rows are built from and read back
//! into any `serde` type, unique indexes are enforced on every write, and
//! [`Db::transaction`] commits all of its writes or none of them.
//!
//! # Example
//!
//! ```rust
//! use turbo_db::{Db, Filter, TableSchema};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct RawMaterial {
//!     id: String,
//!     stock_quantity: String,
//! }
//!
//! let db = Db::open_in_memory();
//! db.create_table(TableSchema::new("raw_materials").unique("raw_materials_pk", &["id"]))?;
//!
//! db.insert("raw_materials", &RawMaterial { id: "leather".into(), stock_quantity: "10".into() })?;
//!
//! let leather: RawMaterial = db.query_one("raw_materials", &[Filter::eq("id", "leather")])?;
//! assert_eq!(leather.stock_quantity, "10");
//! # Ok::<(), turbo_db::DbError>(())
//! ```

mod db;
mod error;
mod query;
mod schema;
mod types;

pub use db::{Db, Transaction};
pub use error::DbError;
pub use query::Filter;
pub use schema::{TableSchema, UniqueIndex};
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Db, DbError, Filter, QueryResult, Row, TableSchema, Transaction, Value};
}
