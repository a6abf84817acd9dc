//! Table definition types

use serde::Serialize;

/// Column value type as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Bool,
    Timestamp,
    Json,
}

/// What to do when a hydrated column's sub-resource is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationPolicy {
    /// Leave the column null and keep the row
    NullOnNotFound,
    /// Fail the row, and with it the operation
    FailRow,
}

/// Where a column's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ColumnSource {
    /// A field of the listed object, by dotted path
    Field(&'static str),
    /// A secondary request per row, only made when the column is requested
    Hydrated(HydrationPolicy),
    /// Filled in by the table itself (qualifier echo, parent id)
    Computed,
}

/// One column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub description: &'static str,
    pub source: ColumnSource,
}

impl ColumnDef {
    const fn new(name: &'static str, column_type: ColumnType, description: &'static str) -> Self {
        Self {
            name,
            column_type,
            description,
            source: ColumnSource::Field(name),
        }
    }

    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ColumnType::String, description)
    }

    pub const fn int(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ColumnType::Int, description)
    }

    pub const fn bool(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ColumnType::Bool, description)
    }

    pub const fn timestamp(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ColumnType::Timestamp, description)
    }

    pub const fn json(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ColumnType::Json, description)
    }

    /// Read the value from a different field path
    pub const fn from_field(self, path: &'static str) -> Self {
        Self {
            source: ColumnSource::Field(path),
            ..self
        }
    }

    /// Fetch the value with a secondary request
    pub const fn hydrated(self, policy: HydrationPolicy) -> Self {
        Self {
            source: ColumnSource::Hydrated(policy),
            ..self
        }
    }

    /// Fill the value in table code
    pub const fn computed(self) -> Self {
        Self {
            source: ColumnSource::Computed,
            ..self
        }
    }

    /// True if the column needs a secondary request
    pub fn is_hydrated(&self) -> bool {
        matches!(self.source, ColumnSource::Hydrated(_))
    }
}

/// Whether a key column must be supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

/// A column the table can push down into the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyColumn {
    pub name: &'static str,
    pub require: Requirement,
    pub operators: &'static [&'static str],
}

impl KeyColumn {
    /// Optional equality key
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            require: Requirement::Optional,
            operators: &["="],
        }
    }

    /// Required equality key
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            require: Requirement::Required,
            operators: &["="],
        }
    }

    /// Optional key accepting range operators
    pub const fn range(name: &'static str) -> Self {
        Self {
            name,
            require: Requirement::Optional,
            operators: &[">", ">=", "=", "<", "<="],
        }
    }
}

/// Everything the host needs to know about a table
#[derive(Debug, Clone, Serialize)]
pub struct TableDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub columns: Vec<ColumnDef>,
    /// Columns pushed down into list requests
    pub list_keys: Vec<KeyColumn>,
    /// Columns identifying a single row; empty if the table has no get
    pub get_keys: Vec<&'static str>,
}

impl TableDefinition {
    /// Look up a column
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True if the table supports single-row lookup
    pub fn supports_get(&self) -> bool {
        !self.get_keys.is_empty()
    }

    /// Required list keys
    pub fn required_keys(&self) -> impl Iterator<Item = &KeyColumn> {
        self.list_keys
            .iter()
            .filter(|k| k.require == Requirement::Required)
    }
}
