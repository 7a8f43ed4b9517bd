//! Quantile based conditional cell highlighting.
//!
//! Every numeric column yields two rules: values above its 10th percentile
//! are filled dark orange, values at or below its median are filled amber.
//! All dark orange rules are listed before all amber rules and the first
//! matching rule wins, so a value above the 10th percentile is always dark
//! orange.

use polars::prelude::*;
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, trace, warn};

use crate::domain::DashboardError;
use crate::model::NumericView;

pub const LOWER_QUANTILE: f64 = 0.1;
pub const UPPER_QUANTILE: f64 = 0.5;

pub const DARK_ORANGE: &str = "#ff8000";
pub const AMBER: &str = "#ffbf00";
pub const TEXT_WHITE: &str = "white";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    pub p10: f64,
    pub p50: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessOrEqual,
}

impl Comparison {
    pub fn matches(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::LessOrEqual => value <= threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::GreaterThan => ">",
            Comparison::LessOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRule {
    pub column: String,
    pub comparison: Comparison,
    pub threshold: f64,
    pub background: &'static str,
    pub color: &'static str,
}

impl HighlightRule {
    pub fn applies_to(&self, column: &str, value: f64) -> bool {
        self.column == column && self.comparison.matches(value, self.threshold)
    }

    /// Inline declaration block for a matching cell.
    pub fn css(&self) -> String {
        format!("background-color: {}; color: {};", self.background, self.color)
    }
}

impl fmt::Display for HighlightRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} {} {} -> {}/{}",
            self.column,
            self.comparison.symbol(),
            self.threshold,
            self.background,
            self.color
        )
    }
}

/// Ordered, immutable list of highlight rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    thresholds: Vec<(String, ThresholdPair)>,
    rules: Vec<HighlightRule>,
}

impl RuleSet {
    pub fn from_view(view: &NumericView) -> Result<Self, DashboardError> {
        debug!(
            "Computing thresholds for {} numeric columns: {:?}",
            view.width(),
            view.column_names()
        );
        let thresholds = compute_thresholds(view)?;
        let rules = generate_rules(&thresholds);
        debug!("Generated {} highlight rules", rules.len());
        for rule in rules.iter() {
            trace!("Rule: {rule}");
        }
        Ok(RuleSet { thresholds, rules })
    }

    #[cfg(test)]
    pub fn rules(&self) -> &[HighlightRule] {
        &self.rules
    }

    #[cfg(test)]
    pub fn thresholds(&self) -> &[(String, ThresholdPair)] {
        &self.thresholds
    }

    pub fn thresholds_for(&self, column: &str) -> Option<&ThresholdPair> {
        self.thresholds
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, pair)| pair)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// The first rule in list order that matches the cell, if any.
    pub fn resolve(&self, column: &str, value: Option<f64>) -> Option<&HighlightRule> {
        let value = value?;
        self.rules.iter().find(|r| r.applies_to(column, value))
    }
}

/// p10 and p50 of every column of the view, in column order.
/// Nulls and NaN are ignored; a column without any value gets NaN thresholds.
pub fn compute_thresholds(
    view: &NumericView,
) -> Result<Vec<(String, ThresholdPair)>, DashboardError> {
    let thresholds: Result<Vec<(String, ThresholdPair)>, PolarsError> = view
        .frame()
        .get_columns()
        .par_iter()
        .map(column_thresholds)
        .collect();
    Ok(thresholds?)
}

fn column_thresholds(column: &Column) -> Result<(String, ThresholdPair), PolarsError> {
    let values = column.cast(&DataType::Float64)?;
    // NaN counts as missing, like a null
    let values: Float64Chunked = values
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    let p10 = values.quantile(LOWER_QUANTILE, QuantileMethod::Linear)?;
    let p50 = values.quantile(UPPER_QUANTILE, QuantileMethod::Linear)?;
    let pair = match (p10, p50) {
        (Some(p10), Some(p50)) => ThresholdPair { p10, p50 },
        _ => {
            warn!("Column \"{}\" has no values, its rules never match", column.name());
            ThresholdPair {
                p10: f64::NAN,
                p50: f64::NAN,
            }
        }
    };
    Ok((column.name().to_string(), pair))
}

/// All "above p10" rules first, then all "at or below p50" rules, each group
/// in column order.
pub fn generate_rules(thresholds: &[(String, ThresholdPair)]) -> Vec<HighlightRule> {
    let mut rules = Vec::with_capacity(thresholds.len() * 2);
    for (column, pair) in thresholds {
        rules.push(HighlightRule {
            column: column.clone(),
            comparison: Comparison::GreaterThan,
            threshold: pair.p10,
            background: DARK_ORANGE,
            color: TEXT_WHITE,
        });
    }
    for (column, pair) in thresholds {
        rules.push(HighlightRule {
            column: column.clone(),
            comparison: Comparison::LessOrEqual,
            threshold: pair.p50,
            background: AMBER,
            color: TEXT_WHITE,
        });
    }
    rules
}
