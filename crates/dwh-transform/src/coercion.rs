//! Field coercion for freshly flattened datasets.
//!
//! Text, identifier and mixed columns are normalized in two steps: foreign
//! identifiers become their hex strings, then the column is cast to numbers
//! when every non-null value reads as one. A failed cast leaves the column
//! as it was.

use dwh_model::{CellValue, ColumnType, Dataset};
use thiserror::Error;
use tracing::debug;

use crate::normalization::numeric::{Numeric, numeric_value};

/// A value that blocked a numeric cast.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: '{value}' is not numeric")]
pub struct CastError {
    pub row: usize,
    pub value: String,
}

/// What coercion did to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionOutcome {
    /// Column type needs no coercion.
    Skipped,
    /// Every non-null value was cast to a number.
    Numeric,
    /// Cast failed; values kept (identifiers stringified).
    Text,
}

/// Per-dataset coercion result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionSummary {
    pub numeric: Vec<String>,
    pub text: Vec<String>,
}

/// Replaces identifier cells with their string form.
pub fn stringify_references(values: &[CellValue]) -> Vec<CellValue> {
    values
        .iter()
        .map(|value| match value {
            CellValue::ObjectId(id) => CellValue::Text(id.to_hex()),
            other => other.clone(),
        })
        .collect()
}

/// Casts every value to a number, or reports the first value that is not one.
pub fn cast_numeric(values: &[CellValue]) -> Result<Vec<CellValue>, CastError> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| match numeric_value(value) {
            Numeric::Null => Ok(CellValue::Null),
            Numeric::Value(number) => Ok(CellValue::Number(number)),
            Numeric::Invalid => Err(CastError {
                row,
                value: value.render().unwrap_or_default(),
            }),
        })
        .collect()
}

/// Coerces one column in place.
pub fn coerce_column(dataset: &mut Dataset, column: &str) -> CoercionOutcome {
    let column_type = dataset.column_type(column);
    if !matches!(
        column_type,
        ColumnType::Text | ColumnType::Identifier | ColumnType::Mixed
    ) {
        return CoercionOutcome::Skipped;
    }

    let values: Vec<CellValue> = dataset.column_values(column).cloned().collect();
    let values = stringify_references(&values);
    match cast_numeric(&values) {
        Ok(numbers) => {
            dataset.set_column(column, numbers);
            CoercionOutcome::Numeric
        }
        Err(error) => {
            debug!(column, %error, "column kept as text");
            if column_type != ColumnType::Text {
                dataset.set_column(column, values);
            }
            CoercionOutcome::Text
        }
    }
}

/// Coerces every column of the dataset.
pub fn coerce_dataset(dataset: &mut Dataset) -> CoercionSummary {
    let mut summary = CoercionSummary::default();
    let columns: Vec<String> = dataset.columns().to_vec();
    for column in columns {
        match coerce_column(dataset, &column) {
            CoercionOutcome::Numeric => summary.numeric.push(column),
            CoercionOutcome::Text => summary.text.push(column),
            CoercionOutcome::Skipped => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwh_model::{ObjectId, Row};

    fn dataset(column: &str, values: Vec<CellValue>) -> Dataset {
        values
            .into_iter()
            .map(|value| {
                let mut row = Row::new();
                row.insert(column.to_string(), value);
                row
            })
            .collect()
    }

    #[test]
    fn numeric_strings_are_cast() {
        let mut ds = dataset("amount", vec!["10".into(), CellValue::Null, " 2.5 ".into()]);
        assert_eq!(coerce_column(&mut ds, "amount"), CoercionOutcome::Numeric);
        assert_eq!(ds.value(0, "amount"), &CellValue::Number(10.0));
        assert_eq!(ds.value(1, "amount"), &CellValue::Null);
        assert_eq!(ds.value(2, "amount"), &CellValue::Number(2.5));
    }

    #[test]
    fn failed_cast_leaves_column_unchanged() {
        let mut ds = dataset("code", vec!["10".into(), "A1".into()]);
        assert_eq!(coerce_column(&mut ds, "code"), CoercionOutcome::Text);
        assert_eq!(ds.value(0, "code"), &CellValue::from("10"));
        assert_eq!(ds.value(1, "code"), &CellValue::from("A1"));
    }

    #[test]
    fn identifiers_become_hex_strings() {
        let id = ObjectId::parse_str("5f8d0d55b54764421b7156c3").unwrap();
        let mut ds = dataset("ref", vec![CellValue::ObjectId(id), CellValue::Null]);
        assert_eq!(coerce_column(&mut ds, "ref"), CoercionOutcome::Text);
        assert_eq!(ds.value(0, "ref"), &CellValue::from("5f8d0d55b54764421b7156c3"));
    }

    #[test]
    fn native_columns_are_skipped() {
        let mut ds = dataset("flag", vec![true.into(), false.into()]);
        assert_eq!(coerce_column(&mut ds, "flag"), CoercionOutcome::Skipped);
        assert_eq!(ds.value(0, "flag"), &CellValue::Bool(true));
    }

    #[test]
    fn cast_error_reports_first_offender() {
        let err = cast_numeric(&["1".into(), "x".into(), "y".into()]).unwrap_err();
        assert_eq!(err, CastError { row: 1, value: "x".to_string() });
    }
}
