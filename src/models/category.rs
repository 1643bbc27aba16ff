use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The fixed set of categories a transaction can be tagged with.
///
/// Only meaningful for expenses; income records carry a category too but
/// every aggregation ignores it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Utilities,
    Health,
    Shopping,
    Housing,
    Education,
    #[default]
    Other,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Utilities,
            Self::Health,
            Self::Shopping,
            Self::Housing,
            Self::Education,
            Self::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Utilities => "Utilities",
            Self::Health => "Health",
            Self::Shopping => "Shopping",
            Self::Housing => "Housing",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }

    /// Chart colour for the category.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Food => "#f97316",
            Self::Transport => "#3b82f6",
            Self::Entertainment => "#a855f7",
            Self::Utilities => "#eab308",
            Self::Health => "#ec4899",
            Self::Shopping => "#06b6d4",
            Self::Housing => "#84cc16",
            Self::Education => "#14b8a6",
            Self::Other => "#6b7280",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// Entry of the static category table served to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub name: Category,
    pub color: &'static str,
}

pub fn category_table() -> Vec<CategoryInfo> {
    Category::all()
        .iter()
        .map(|c| CategoryInfo {
            name: *c,
            color: c.color(),
        })
        .collect()
}
