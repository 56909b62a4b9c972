use anyhow::Result;
use arrow::datatypes::Int64Type;
use arrow::{array::AsArray, compute::cast, datatypes::DataType};
use std::collections::HashMap;

use crate::process::features::{HOUR_COLUMN, WEEKDAYS, WEEKDAY_COLUMN};
use crate::table::Dataset;

/// Bar-chart input: one label and one count per category, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl CategoryCounts {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Accidents per hour of day. Always 24 buckets, `0` through `23`.
pub fn hourly_counts(ds: &Dataset) -> Result<CategoryCounts> {
    let col = cast(ds.column(HOUR_COLUMN)?, &DataType::Int64)?;
    let mut counts = vec![0u64; 24];
    for hour in col.as_primitive::<Int64Type>().iter().flatten() {
        if (0..24).contains(&hour) {
            counts[hour as usize] += 1;
        }
    }
    Ok(CategoryCounts {
        labels: (0..24).map(|h| h.to_string()).collect(),
        counts,
    })
}

/// Accidents per weekday, Monday through Sunday.
pub fn weekday_counts(ds: &Dataset) -> Result<CategoryCounts> {
    let days = ds.string_values(WEEKDAY_COLUMN)?;
    let mut counts = vec![0u64; WEEKDAYS.len()];
    for day in days.iter().flatten() {
        if let Some(i) = WEEKDAYS.iter().position(|d| *d == day) {
            counts[i] += 1;
        }
    }
    Ok(CategoryCounts {
        labels: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        counts,
    })
}

/// Non-null value frequencies, most frequent first; ties by label.
pub fn value_counts<'a, I>(values: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut freq: HashMap<&'a str, u64> = HashMap::new();
    for v in values.into_iter().flatten() {
        *freq.entry(v).or_default() += 1;
    }
    let mut out: Vec<(String, u64)> = freq
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// The `n` most frequent values of `column`.
pub fn top_values(ds: &Dataset, column: &str, n: usize) -> Result<CategoryCounts> {
    let values = ds.string_values(column)?;
    let (labels, counts) = value_counts(values.iter()).into_iter().take(n).unzip();
    Ok(CategoryCounts { labels, counts })
}
