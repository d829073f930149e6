//! Column value types as the catalog reports them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a column or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint64,
    Float32,
    Float64,
    Decimal,
    VarChar,
    VarBinary,
    Text,
    Date,
    DateTime,
    Timestamp,
    Time,
    Json,
}

impl SqlType {
    /// Whether the type is numeric
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint64
                | Self::Float32
                | Self::Float64
                | Self::Decimal
        )
    }

    /// Whether the type is a character type
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::VarChar | Self::Text)
    }

    /// Whether the type is a date or time type
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::DateTime | Self::Timestamp | Self::Time
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Decimal => "decimal",
            Self::VarChar => "varchar",
            Self::VarBinary => "varbinary",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Time => "time",
            Self::Json => "json",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SqlType::Int64.is_numeric());
        assert!(SqlType::VarChar.is_text());
        assert!(SqlType::Timestamp.is_temporal());
        assert!(!SqlType::Json.is_numeric());
    }
}
