//! Key queries.
//!
//! The pipeline only ever reads one column from one table:
//!
//! ```text
//! SELECT [DISTINCT] `<column>` FROM `<project.dataset.table>`
//! ```
//!
//! Column names are always quoted so flattened paths (`lessor.name`), names
//! with spaces and reserved words reach the warehouse intact. A name can
//! not itself contain a backtick.
//!
//! [`KeyQuery`] builds that statement and parses it back for backends that
//! do not speak SQL.

use std::collections::BTreeSet;
use std::fmt;

use dwh_model::{CellValue, Dataset, Row, TableId};

use crate::error::{Result, WarehouseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    pub column: String,
    pub table: TableId,
    pub distinct: bool,
}

impl KeyQuery {
    pub fn distinct(column: &str, table: &TableId) -> Self {
        Self {
            column: column.to_string(),
            table: table.clone(),
            distinct: true,
        }
    }

    pub fn to_sql(&self) -> String {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        format!("SELECT {distinct}`{}` FROM `{}`", self.column, self.table)
    }

    /// Parses a key query.
    ///
    /// Keywords are case-insensitive. The column may be bare or
    /// backtick-quoted; a quoted column may contain whitespace and dots.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::UnsupportedQuery`] for any other statement.
    pub fn parse(sql: &str) -> Result<Self> {
        let unsupported = || WarehouseError::UnsupportedQuery {
            sql: sql.to_string(),
        };
        let tokens = tokenize(sql.trim().trim_end_matches(';')).ok_or_else(unsupported)?;

        let (distinct, rest) = match tokens.as_slice() {
            [select, distinct, rest @ ..]
                if select.eq_ignore_ascii_case("SELECT")
                    && distinct.eq_ignore_ascii_case("DISTINCT") =>
            {
                (true, rest)
            }
            [select, rest @ ..] if select.eq_ignore_ascii_case("SELECT") => (false, rest),
            _ => return Err(unsupported()),
        };

        let &[column, from, table] = rest else {
            return Err(unsupported());
        };
        if !from.eq_ignore_ascii_case("FROM") {
            return Err(unsupported());
        }

        let column = match strip_backticks(column) {
            Some(quoted) if !quoted.contains('`') => quoted,
            Some(_) => return Err(unsupported()),
            None if column.contains(['`', '.']) || column == "*" => return Err(unsupported()),
            None => column,
        };
        if column.is_empty() {
            return Err(unsupported());
        }
        let table = strip_backticks(table)
            .and_then(|id| id.parse::<TableId>().ok())
            .ok_or_else(unsupported)?;

        Ok(Self {
            column: column.to_string(),
            table,
            distinct,
        })
    }

    /// Evaluates the query against a table's rows.
    ///
    /// Distinct queries drop null keys and repeated keys (compared by
    /// rendered form), keeping first occurrences.
    pub fn evaluate<'a, I>(&self, rows: I) -> Dataset
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let mut seen = BTreeSet::new();
        let mut result = Dataset::new();
        for row in rows {
            let value = row.get(&self.column).cloned().unwrap_or(CellValue::Null);
            if self.distinct {
                let Some(key) = value.render() else {
                    continue;
                };
                if !seen.insert(key) {
                    continue;
                }
            }
            result.push_row(Row::from([(self.column.clone(), value)]));
        }
        result
    }
}

impl fmt::Display for KeyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn strip_backticks(token: &str) -> Option<&str> {
    token.strip_prefix('`')?.strip_suffix('`')
}

/// Splits on whitespace outside backtick quotes. `None` on an unclosed quote.
fn tokenize(sql: &str) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut quoted = false;
    for (index, ch) in sql.char_indices() {
        if ch == '`' {
            quoted = !quoted;
            start.get_or_insert(index);
        } else if ch.is_whitespace() && !quoted {
            if let Some(begin) = start.take() {
                tokens.push(&sql[begin..index]);
            }
        } else {
            start.get_or_insert(index);
        }
    }
    if quoted {
        return None;
    }
    if let Some(begin) = start {
        tokens.push(&sql[begin..]);
    }
    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableId {
        TableId::new("local", "esi_dataset", "esis").unwrap()
    }

    #[test]
    fn builds_distinct_key_query() {
        assert_eq!(
            KeyQuery::distinct("_id", &table()).to_sql(),
            "SELECT DISTINCT `_id` FROM `local.esi_dataset.esis`"
        );
    }

    #[test]
    fn quoted_column_keeps_spaces_and_dots() {
        for column in ["order id", "lessor.name", "from"] {
            let query = KeyQuery::distinct(column, &table());
            let parsed = KeyQuery::parse(&query.to_sql()).unwrap();
            assert_eq!(parsed.column, column);
            assert_eq!(parsed, query);
        }
    }

    #[test]
    fn parses_its_own_output() {
        let query = KeyQuery::distinct("_id", &table());
        assert_eq!(KeyQuery::parse(&query.to_sql()).unwrap(), query);
    }

    #[test]
    fn parses_plain_select_with_quoted_column() {
        let query = KeyQuery::parse("select `_id` from `local.esi_dataset.esis`;").unwrap();
        assert!(!query.distinct);
        assert_eq!(query.column, "_id");
        assert_eq!(query.table, table());
    }

    #[test]
    fn rejects_other_statements() {
        for sql in [
            "SELECT * FROM `local.esi_dataset.esis`",
            "SELECT _id FROM local.esi_dataset.esis",
            "SELECT _id, name FROM `local.esi_dataset.esis`",
            "DELETE FROM `local.esi_dataset.esis`",
            "SELECT _id FROM `esi_dataset.esis`",
            "SELECT `order id FROM `local.esi_dataset.esis`",
            "SELECT order id FROM `local.esi_dataset.esis`",
            "SELECT `` FROM `local.esi_dataset.esis`",
            "",
        ] {
            assert!(
                matches!(
                    KeyQuery::parse(sql),
                    Err(WarehouseError::UnsupportedQuery { .. })
                ),
                "{sql}"
            );
        }
    }

    #[test]
    fn distinct_skips_nulls_and_repeats() {
        let rows: Vec<Row> = [Some(1.0), Some(1.0), None, Some(2.0)]
            .into_iter()
            .map(|key| Row::from([("_id".to_string(), CellValue::from(key))]))
            .collect();
        let result = KeyQuery::distinct("_id", &table()).evaluate(&rows);
        assert_eq!(result.len(), 2);
        assert_eq!(result.value(1, "_id"), &CellValue::Number(2.0));
    }
}
