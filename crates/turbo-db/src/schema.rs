//! Table definitions.

/// A unique index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueIndex {
    /// Index name, reported in [`DbError::UniqueViolation`](crate::DbError).
    pub name: String,
    /// Indexed columns. A missing column counts as null.
    pub columns: Vec<String>,
}

/// Schema of a table: its name and the unique indexes enforced on writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub unique_indexes: Vec<UniqueIndex>,
}

impl TableSchema {
    /// Create a table schema with no indexes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_indexes: Vec::new(),
        }
    }

    /// Add a unique index.
    ///
    /// ```
    /// use turbo_db::TableSchema;
    ///
    /// let schema = TableSchema::new("variants")
    ///     .unique("variants_identity", &["product_id", "identity_hash"])
    ///     .unique("variants_sku", &["sku"]);
    /// assert_eq!(schema.unique_indexes.len(), 2);
    /// ```
    pub fn unique(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.unique_indexes.push(UniqueIndex {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }
}
