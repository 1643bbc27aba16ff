use std::cmp::Ordering;

/// Sort direction for table columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Trait for column enums. Each sortable table defines its own column enum
/// implementing this trait.
pub trait SortableColumn: Sized + Default + Clone + PartialEq {
    /// Row type the column reads its key from.
    type Row;

    /// Parse column name from query string parameter.
    fn from_str(s: &str) -> Option<Self>;

    /// Convert column to query string parameter value.
    fn as_str(&self) -> &'static str;

    /// SQL expression for ORDER BY clause (e.g., "t.date", "t.amount_cents").
    fn sql_expression(&self) -> &'static str;

    /// Ascending comparison of two rows by this column.
    fn compare(&self, a: &Self::Row, b: &Self::Row) -> Ordering;
}

/// Trait for filter params that support sorting (similar to PeriodFilterable).
pub trait Sortable {
    fn sort_by(&self) -> Option<&String>;
    fn sort_dir(&self) -> Option<&String>;

    /// Resolve sort parameters into a TableSort config.
    fn resolve_sort<C: SortableColumn>(&self) -> TableSort<C> {
        let column = self
            .sort_by()
            .and_then(|s| C::from_str(s))
            .unwrap_or_default();

        let direction = self
            .sort_dir()
            .map(|s| SortDirection::from_str(s))
            .unwrap_or_default();

        TableSort { column, direction }
    }
}

/// Sort configuration for a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSort<C: SortableColumn> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: SortableColumn> TableSort<C> {
    pub fn new(column: C, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Generate SQL ORDER BY expression (e.g., "t.date DESC").
    pub fn sql_order_by(&self) -> String {
        format!("{} {}", self.column.sql_expression(), self.direction.sql())
    }

    /// Check if this column is currently being sorted.
    pub fn is_active(&self, col: &C) -> bool {
        &self.column == col
    }

    /// Get the direction to use when clicking a column header.
    /// If already sorted by this column, toggle direction; otherwise start ascending.
    pub fn next_direction_for(&self, col: &C) -> SortDirection {
        if self.is_active(col) {
            self.direction.toggle()
        } else {
            SortDirection::Asc
        }
    }

    /// State after the user picks `col`.
    pub fn select(&self, col: C) -> Self {
        let direction = self.next_direction_for(&col);
        Self {
            column: col,
            direction,
        }
    }

    /// Generate query string for current sort state.
    pub fn query_string(&self) -> String {
        format!(
            "sort={}&order={}",
            self.column.as_str(),
            self.direction.as_str()
        )
    }

    /// Return the rows reordered by this column.
    ///
    /// Rows with equal keys keep their input order in both directions: the
    /// comparator is reversed for descending order, never the output.
    pub fn apply(&self, rows: &[C::Row]) -> Vec<C::Row>
    where
        C::Row: Clone,
    {
        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| self.direction.apply(self.column.compare(a, b)));
        sorted
    }
}

impl<C: SortableColumn> Default for TableSort<C> {
    fn default() -> Self {
        Self {
            column: C::default(),
            direction: SortDirection::default(),
        }
    }
}
