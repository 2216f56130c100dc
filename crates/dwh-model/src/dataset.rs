//! Tabular datasets built from flattened rows.

use std::collections::{BTreeMap, BTreeSet};

use crate::value::CellValue;

/// A flattened row: column name to value. Absent columns read as null.
pub type Row = BTreeMap<String, CellValue>;

const NULL: CellValue = CellValue::Null;

/// Inferred type of a column, from its non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every value is null.
    Empty,
    Bool,
    Number,
    Text,
    Date,
    Identifier,
    /// Non-null values of more than one kind.
    Mixed,
}

impl ColumnType {
    fn of(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Null => None,
            CellValue::Bool(_) => Some(ColumnType::Bool),
            CellValue::Number(_) => Some(ColumnType::Number),
            CellValue::Text(_) => Some(ColumnType::Text),
            CellValue::Date(_) => Some(ColumnType::Date),
            CellValue::ObjectId(_) => Some(ColumnType::Identifier),
        }
    }

    /// Types a warehouse column accepts without stringification.
    pub fn is_warehouse_native(self) -> bool {
        matches!(
            self,
            ColumnType::Empty | ColumnType::Bool | ColumnType::Number | ColumnType::Date
        )
    }
}

/// Ordered rows sharing the union of their columns.
///
/// Columns keep first-seen order; row order is insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    /// Same names as `columns`, for membership checks.
    column_index: BTreeSet<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut dataset = Self::new();
        for row in rows {
            dataset.push_row(row);
        }
        dataset
    }

    pub fn push_row(&mut self, row: Row) {
        for name in row.keys() {
            self.register_column(name);
        }
        self.rows.push(row);
    }

    fn register_column(&mut self, name: &str) {
        if !self.column_index.contains(name) {
            self.column_index.insert(name.to_string());
            self.columns.push(name.to_string());
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains(name)
    }

    /// Value at `row` / `column`; null when the row lacks the column.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        self.rows[row].get(column).unwrap_or(&NULL)
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&NULL))
    }

    /// Replaces (or appends) a column.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        assert_eq!(
            values.len(),
            self.rows.len(),
            "column '{name}' must have one value per row"
        );
        self.register_column(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(name.to_string(), value);
        }
    }

    /// Rewrites every value of an existing column in place.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        if !self.has_column(name) {
            return;
        }
        let values: Vec<CellValue> = self.column_values(name).map(&mut f).collect();
        self.set_column(name, values);
    }

    /// Removes every column matching `predicate`, returning the removed names.
    pub fn drop_columns<F>(&mut self, predicate: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let (dropped, kept): (Vec<String>, Vec<String>) = std::mem::take(&mut self.columns)
            .into_iter()
            .partition(|column| predicate(column));
        for column in &dropped {
            self.column_index.remove(column);
        }
        self.columns = kept;
        if !dropped.is_empty() {
            for row in &mut self.rows {
                row.retain(|column, _| !predicate(column));
            }
        }
        dropped
    }

    pub fn retain_rows<F>(&mut self, f: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(f);
    }

    /// Classifies a column from its non-null values.
    pub fn column_type(&self, name: &str) -> ColumnType {
        let mut kinds = self.column_values(name).filter_map(ColumnType::of);
        let Some(first) = kinds.next() else {
            return ColumnType::Empty;
        };
        if kinds.all(|kind| kind == first) {
            first
        } else {
            ColumnType::Mixed
        }
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for row in iter {
            dataset.push_row(row);
        }
        dataset
    }
}
