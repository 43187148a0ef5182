//! Database handle, tables and transactions.

use crate::query::matches_all;
use crate::{DbError, Filter, QueryResult, Row, TableSchema};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
}

impl Table {
    /// Check `candidate` against every unique index, ignoring the row at `skip`.
    fn check_unique(&self, candidate: &Row, skip: Option<usize>) -> Result<(), DbError> {
        for index in &self.schema.unique_indexes {
            let key = index_key(candidate, &index.columns);
            let clash = self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, row)| index_key(row, &index.columns) == key);

            if clash {
                return Err(DbError::UniqueViolation {
                    table: self.schema.name.clone(),
                    index: index.name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn index_key(row: &Row, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| row.get(c).map(|v| v.index_key()).unwrap_or_else(|| "null".to_string()))
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

type Tables = HashMap<String, Table>;

fn table<'t>(tables: &'t Tables, name: &str) -> Result<&'t Table, DbError> {
    tables
        .get(name)
        .ok_or_else(|| DbError::TableNotFound(name.to_string()))
}

fn table_mut<'t>(tables: &'t mut Tables, name: &str) -> Result<&'t mut Table, DbError> {
    tables
        .get_mut(name)
        .ok_or_else(|| DbError::TableNotFound(name.to_string()))
}

fn select(tables: &Tables, name: &str, filters: &[Filter]) -> Result<QueryResult, DbError> {
    let rows = table(tables, name)?
        .rows
        .iter()
        .filter(|row| matches_all(filters, row))
        .cloned()
        .collect();
    Ok(QueryResult::new(rows))
}

/// In-memory database.
///
/// Reads see the latest committed state. Writes happen inside
/// [`Db::transaction`], which runs against a private working copy and commits
/// atomically only when the body returns `Ok`. Transactions are serialized, so
/// a read-check-write sequence inside one behaves like it holds row locks.
#[derive(Debug, Default)]
pub struct Db {
    tables: Mutex<Tables>,
}

impl Db {
    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Self {
        Self::default()
    }

    /// Create a table.
    pub fn create_table(&self, schema: TableSchema) -> Result<(), DbError> {
        let mut tables = self.tables.lock();
        if tables.contains_key(&schema.name) {
            return Err(DbError::TableExists(schema.name));
        }
        tables.insert(
            schema.name.clone(),
            Table {
                schema,
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    /// Check whether a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.lock().contains_key(name)
    }

    /// Return matching rows in insertion order.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let result = db.query("variants", &[Filter::eq("product_id", "p-1")])?;
    /// for row in result.iter() {
    ///     println!("{:?}", row.get("sku"));
    /// }
    /// ```
    pub fn query(&self, table: &str, filters: &[Filter]) -> Result<QueryResult, DbError> {
        select(&self.tables.lock(), table, filters)
    }

    /// Return matching rows deserialized into `T`.
    pub fn query_as<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, DbError> {
        self.query(table, filters)?.deserialize_all()
    }

    /// Return the first matching row, or [`DbError::NotFound`].
    pub fn query_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<T, DbError> {
        self.query(table, filters)?
            .first()
            .ok_or(DbError::NotFound)?
            .deserialize()
    }

    /// Return the first matching row if there is one.
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<T>, DbError> {
        match self.query(table, filters)?.first() {
            Some(row) => Ok(Some(row.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Count matching rows.
    pub fn count(&self, table: &str, filters: &[Filter]) -> Result<usize, DbError> {
        Ok(self.query(table, filters)?.len())
    }

    /// Insert a single row in its own transaction.
    pub fn insert<T: Serialize>(&self, table: &str, value: &T) -> Result<(), DbError> {
        self.transaction(|tx| tx.insert(table, value))
    }

    /// Run `body` as one atomic transaction.
    ///
    /// Changes become visible only if `body` returns `Ok`; on `Err` they are
    /// discarded and the error is returned unchanged.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.transaction(|tx| {
    ///     let existing: Vec<Variant> = tx.query_as("variants", &[Filter::eq("product_id", id)])?;
    ///     tx.insert("variants", &next)?;
    ///     Ok::<_, DbError>(())
    /// })?;
    /// ```
    pub fn transaction<R, E>(
        &self,
        body: impl FnOnce(&mut Transaction<'_>) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut committed = self.tables.lock();
        let mut working = committed.clone();

        let out = body(&mut Transaction {
            tables: &mut working,
        })?;

        *committed = working;
        Ok(out)
    }
}

/// An open transaction. Obtained through [`Db::transaction`].
pub struct Transaction<'a> {
    tables: &'a mut Tables,
}

impl Transaction<'_> {
    /// Insert a row, enforcing unique indexes.
    pub fn insert<T: Serialize>(&mut self, table: &str, value: &T) -> Result<(), DbError> {
        self.insert_row(table, Row::from_serializable(value)?)
    }

    /// Insert a prepared row, enforcing unique indexes.
    pub fn insert_row(&mut self, table: &str, row: Row) -> Result<(), DbError> {
        let table = table_mut(&mut *self.tables, table)?;
        table.check_unique(&row, None)?;
        table.rows.push(row);
        Ok(())
    }

    /// Return matching rows, including writes made earlier in this transaction.
    pub fn query(&self, table: &str, filters: &[Filter]) -> Result<QueryResult, DbError> {
        select(&*self.tables, table, filters)
    }

    /// Return matching rows deserialized into `T`.
    pub fn query_as<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, DbError> {
        self.query(table, filters)?.deserialize_all()
    }

    /// Return the first matching row if there is one.
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<T>, DbError> {
        match self.query(table, filters)?.first() {
            Some(row) => Ok(Some(row.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Replace every matching row with `value`. Returns the number of rows replaced.
    pub fn update<T: Serialize>(
        &mut self,
        table: &str,
        filters: &[Filter],
        value: &T,
    ) -> Result<usize, DbError> {
        let row = Row::from_serializable(value)?;
        let table = table_mut(&mut *self.tables, table)?;

        let positions: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_all(filters, r))
            .map(|(i, _)| i)
            .collect();

        for &i in &positions {
            table.check_unique(&row, Some(i))?;
            table.rows[i] = row.clone();
        }
        Ok(positions.len())
    }

    /// Delete matching rows. Returns the number of rows deleted.
    pub fn delete(&mut self, table: &str, filters: &[Filter]) -> Result<usize, DbError> {
        let table = table_mut(&mut *self.tables, table)?;
        let before = table.rows.len();
        table.rows.retain(|r| !matches_all(filters, r));
        Ok(before - table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Material {
        id: String,
        code: String,
        stock: i64,
    }

    fn material(id: &str, code: &str, stock: i64) -> Material {
        Material {
            id: id.to_string(),
            code: code.to_string(),
            stock,
        }
    }

    fn db() -> Db {
        let db = Db::open_in_memory();
        db.create_table(TableSchema::new("materials").unique("materials_code", &["code"]))
            .unwrap();
        db
    }

    #[test]
    fn test_insert_and_query_in_insertion_order() {
        let db = db();
        db.insert("materials", &material("m-2", "THREAD", 100)).unwrap();
        db.insert("materials", &material("m-1", "LEATHER", 10)).unwrap();

        let all: Vec<Material> = db.query_as("materials", &[]).unwrap();
        assert_eq!(all[0].id, "m-2");
        assert_eq!(all[1].id, "m-1");

        let one: Material = db
            .query_one("materials", &[Filter::eq("code", "LEATHER")])
            .unwrap();
        assert_eq!(one.stock, 10);
    }

    #[test]
    fn test_unique_violation() {
        let db = db();
        db.insert("materials", &material("m-1", "LEATHER", 10)).unwrap();
        let err = db
            .insert("materials", &material("m-2", "LEATHER", 3))
            .unwrap_err();
        assert!(err.is_unique_violation_on("materials_code"));
        assert_eq!(db.count("materials", &[]).unwrap(), 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = db();
        let result: Result<(), DbError> = db.transaction(|tx| {
            tx.insert("materials", &material("m-1", "LEATHER", 10))?;
            tx.insert("materials", &material("m-2", "LEATHER", 3))?;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(db.count("materials", &[]).unwrap(), 0);
    }

    #[test]
    fn test_transaction_sees_own_writes() {
        let db = db();
        let seen = db
            .transaction(|tx| {
                tx.insert("materials", &material("m-1", "LEATHER", 10))?;
                tx.query("materials", &[]).map(|r| r.len())
            })
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_update_and_delete() {
        let db = db();
        db.insert("materials", &material("m-1", "LEATHER", 10)).unwrap();
        db.insert("materials", &material("m-2", "THREAD", 100)).unwrap();

        let updated = db
            .transaction(|tx| {
                tx.update(
                    "materials",
                    &[Filter::eq("id", "m-1")],
                    &material("m-1", "LEATHER", 4),
                )
            })
            .unwrap();
        assert_eq!(updated, 1);

        let clash = db.transaction(|tx| {
            tx.update(
                "materials",
                &[Filter::eq("id", "m-2")],
                &material("m-2", "LEATHER", 1),
            )
        });
        assert!(clash.is_err());

        let deleted = db
            .transaction(|tx| tx.delete("materials", &[Filter::eq("id", "m-2")]))
            .unwrap();
        assert_eq!(deleted, 1);

        let left: Vec<Material> = db.query_as("materials", &[]).unwrap();
        assert_eq!(left, vec![material("m-1", "LEATHER", 4)]);
    }

    #[test]
    fn test_missing_table() {
        let db = Db::open_in_memory();
        assert_eq!(
            db.query("nope", &[]).unwrap_err(),
            DbError::TableNotFound("nope".to_string())
        );
        assert!(db.create_table(TableSchema::new("t")).is_ok());
        assert!(matches!(
            db.create_table(TableSchema::new("t")),
            Err(DbError::TableExists(_))
        ));
    }
}
