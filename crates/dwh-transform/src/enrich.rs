//! Enrichment profiles applied to flattened collections.
//!
//! A profile names the date fields to normalize, the derived business
//! columns to compute and the artifact rule that finishes the pass. Derived
//! columns are added only when every input column is present in the
//! dataset; a null input on a given row yields a null on that row.

use std::fmt;

use chrono::Datelike;
use dwh_model::{CellValue, Dataset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifacts::ArtifactRule;
use crate::error::{Result, TransformError};
use crate::normalization::datetime::parse_cell;
use crate::normalization::duration::whole_days_between;
use crate::normalization::numeric::{Numeric, numeric_value};

/// Suffix of the raw column a `$date` wrapper flattens into.
pub const RAW_DATE_SUFFIX: &str = ".$date";

/// Built-in profile selector used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Lease agreements: term dates, duration and amount variance.
    Lease,
    /// Orders and supplies: creation and update timestamps.
    Order,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 2] = [ProfileKind::Lease, ProfileKind::Order];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Lease => "lease",
            ProfileKind::Order => "order",
        }
    }

    pub fn profile(self) -> EnrichmentProfile {
        match self {
            ProfileKind::Lease => EnrichmentProfile::lease(),
            ProfileKind::Order => EnrichmentProfile::order(),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lease term columns derived from a start and an end date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseTermRule {
    pub start: String,
    pub end: String,
    /// Whole days from start to end.
    pub duration_column: String,
    /// Calendar year of the start date.
    pub year_column: String,
    /// Calendar month (1-12) of the start date.
    pub month_column: String,
}

/// Difference between an engaged and an invoiced amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarianceRule {
    pub engaged: String,
    pub invoiced: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentProfile {
    pub name: String,
    pub date_fields: Vec<String>,
    pub lease_term: Option<LeaseTermRule>,
    pub variance: Option<VarianceRule>,
    pub artifacts: ArtifactRule,
}

impl EnrichmentProfile {
    pub fn lease() -> Self {
        Self {
            name: ProfileKind::Lease.as_str().to_string(),
            date_fields: strings(&[
                "dateDebutBail",
                "dateFinBail",
                "datePriseBail",
                "dateResiliation",
            ]),
            lease_term: Some(LeaseTermRule {
                start: "dateDebutBail".to_string(),
                end: "dateFinBail".to_string(),
                duration_column: "duree_bail_jours".to_string(),
                year_column: "annee_debut".to_string(),
                month_column: "mois_debut".to_string(),
            }),
            variance: Some(VarianceRule {
                engaged: "engageTTC".to_string(),
                invoiced: "factureTTC".to_string(),
                column: "ecart_engage_facture".to_string(),
            }),
            artifacts: ArtifactRule::default(),
        }
    }

    pub fn order() -> Self {
        Self {
            name: ProfileKind::Order.as_str().to_string(),
            date_fields: strings(&["createdAt", "updatedAt"]),
            lease_term: None,
            variance: None,
            artifacts: ArtifactRule::default(),
        }
    }

    #[must_use]
    pub fn with_artifacts(mut self, artifacts: ArtifactRule) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Columns this profile may add, in the order they are computed.
    pub fn derived_columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        if let Some(term) = &self.lease_term {
            columns.extend([
                term.duration_column.as_str(),
                term.year_column.as_str(),
                term.month_column.as_str(),
            ]);
        }
        if let Some(variance) = &self.variance {
            columns.push(variance.column.as_str());
        }
        columns
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

/// What an enrichment pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub parsed_dates: Vec<String>,
    pub derived: Vec<String>,
    pub dropped: Vec<String>,
}

/// Applies `profile` to `dataset` in place.
///
/// # Errors
///
/// Returns [`TransformError::NonNumeric`] when a variance amount holds a
/// value that cannot be read as a number.
pub fn enrich(dataset: &mut Dataset, profile: &EnrichmentProfile) -> Result<EnrichmentReport> {
    let mut report = EnrichmentReport::default();

    for field in &profile.date_fields {
        if parse_date_field(dataset, field) {
            report.parsed_dates.push(field.clone());
        }
    }

    if let Some(term) = &profile.lease_term
        && dataset.has_column(&term.start)
        && dataset.has_column(&term.end)
    {
        derive_lease_term(dataset, term);
        report.derived.extend([
            term.duration_column.clone(),
            term.year_column.clone(),
            term.month_column.clone(),
        ]);
    }

    if let Some(variance) = &profile.variance
        && dataset.has_column(&variance.engaged)
        && dataset.has_column(&variance.invoiced)
    {
        derive_variance(dataset, variance)?;
        report.derived.push(variance.column.clone());
    }

    report.dropped = profile.artifacts.apply(dataset);

    debug!(
        profile = %profile.name,
        parsed_dates = report.parsed_dates.len(),
        derived = report.derived.len(),
        dropped = report.dropped.len(),
        "enrichment applied"
    );
    Ok(report)
}

/// Parses `<field>.$date` (or `<field>` itself) into the `<field>` column.
///
/// Returns false when neither column exists.
fn parse_date_field(dataset: &mut Dataset, field: &str) -> bool {
    let raw = format!("{field}{RAW_DATE_SUFFIX}");
    let source = if dataset.has_column(&raw) {
        raw
    } else if dataset.has_column(field) {
        field.to_string()
    } else {
        return false;
    };
    let parsed: Vec<CellValue> = dataset.column_values(&source).map(parse_cell).collect();
    dataset.set_column(field, parsed);
    true
}

fn derive_lease_term(dataset: &mut Dataset, term: &LeaseTermRule) {
    let mut durations = Vec::with_capacity(dataset.len());
    let mut years = Vec::with_capacity(dataset.len());
    let mut months = Vec::with_capacity(dataset.len());

    for row in 0..dataset.len() {
        let start = dataset.value(row, &term.start).as_date();
        let end = dataset.value(row, &term.end).as_date();

        durations.push(match (start, end) {
            (Some(start), Some(end)) => CellValue::from(whole_days_between(start, end)),
            _ => CellValue::Null,
        });
        years.push(start.map_or(CellValue::Null, |s| CellValue::from(i64::from(s.year()))));
        months.push(start.map_or(CellValue::Null, |s| CellValue::from(i64::from(s.month()))));
    }

    dataset.set_column(&term.duration_column, durations);
    dataset.set_column(&term.year_column, years);
    dataset.set_column(&term.month_column, months);
}

fn derive_variance(dataset: &mut Dataset, rule: &VarianceRule) -> Result<()> {
    let mut values = Vec::with_capacity(dataset.len());
    for row in 0..dataset.len() {
        let engaged = amount(dataset, row, &rule.engaged)?;
        let invoiced = amount(dataset, row, &rule.invoiced)?;
        values.push(match (engaged, invoiced) {
            (Some(engaged), Some(invoiced)) => CellValue::Number(engaged - invoiced),
            _ => CellValue::Null,
        });
    }
    dataset.set_column(&rule.column, values);
    Ok(())
}

fn amount(dataset: &Dataset, row: usize, column: &str) -> Result<Option<f64>> {
    let value = dataset.value(row, column);
    match numeric_value(value) {
        Numeric::Null => Ok(None),
        Numeric::Value(number) => Ok(Some(number)),
        Numeric::Invalid => Err(TransformError::NonNumeric {
            column: column.to_string(),
            row,
            value: value.render().unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwh_model::Row;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn raw_date_column_wins_over_plain_column() {
        let mut dataset = Dataset::from_rows(vec![row(&[
            ("createdAt", "garbage".into()),
            ("createdAt.$date", "2023-05-01T10:00:00Z".into()),
        ])]);
        enrich(&mut dataset, &EnrichmentProfile::order()).unwrap();
        assert_eq!(
            dataset.value(0, "createdAt").render().as_deref(),
            Some("2023-05-01T10:00:00")
        );
        assert!(!dataset.has_column("createdAt.$date"));
    }

    #[test]
    fn missing_date_field_is_not_created() {
        let mut dataset = Dataset::from_rows(vec![row(&[("ref", "A".into())])]);
        let report = enrich(&mut dataset, &EnrichmentProfile::order()).unwrap();
        assert!(report.parsed_dates.is_empty());
        assert_eq!(dataset.columns(), ["ref"]);
    }

    #[test]
    fn year_and_month_need_only_start() {
        let mut dataset = Dataset::from_rows(vec![row(&[
            ("dateDebutBail", "2022-03-15".into()),
            ("dateFinBail", CellValue::Null),
        ])]);
        enrich(&mut dataset, &EnrichmentProfile::lease()).unwrap();
        assert_eq!(dataset.value(0, "duree_bail_jours"), &CellValue::Null);
        assert_eq!(dataset.value(0, "annee_debut"), &CellValue::Number(2022.0));
        assert_eq!(dataset.value(0, "mois_debut"), &CellValue::Number(3.0));
    }

    #[test]
    fn variance_null_side_is_null() {
        let mut dataset = Dataset::from_rows(vec![row(&[
            ("engageTTC", 10.0.into()),
            ("factureTTC", CellValue::Null),
        ])]);
        enrich(&mut dataset, &EnrichmentProfile::lease()).unwrap();
        assert_eq!(dataset.value(0, "ecart_engage_facture"), &CellValue::Null);
    }

    #[test]
    fn profile_kind_round_trips_through_serde() {
        let kind: ProfileKind = serde_json::from_str("\"lease\"").unwrap();
        assert_eq!(kind, ProfileKind::Lease);
        assert_eq!(ProfileKind::Order.to_string(), "order");
        assert_eq!(
            EnrichmentProfile::lease().derived_columns(),
            ["duree_bail_jours", "annee_debut", "mois_debut", "ecart_engage_facture"]
        );
    }
}
