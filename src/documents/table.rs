use thiserror::Error;

/// Errors raised when building a [`TableName`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableNameError {
    /// Schema was blank.
    #[error("schema name is required")]
    EmptySchema,
    /// Table was blank.
    #[error("table name is required")]
    EmptyTable,
}

/// Fully-qualified Postgres table name (schema + table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    /// Builds a new table identifier.
    pub fn new<S, T>(schema: S, table: T) -> Result<Self, TableNameError>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let schema = schema.into();
        let table = table.into();
        if schema.trim().is_empty() {
            return Err(TableNameError::EmptySchema);
        }
        if table.trim().is_empty() {
            return Err(TableNameError::EmptyTable);
        }
        Ok(Self { schema, table })
    }

    /// Fully-qualified table reference with quoted identifiers.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
pub fn quote_ident(input: &str) -> String {
    let escaped = input.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}
