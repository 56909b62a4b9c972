use anyhow::Result;
use arrow::array::{Array, ArrayRef, Int32Array, StringArray, TimestampSecondArray};
use chrono::{Datelike, Timelike, Weekday};
use std::sync::Arc;
use tracing::{info, warn};

use crate::process::date_parser::parse_datetime;
use crate::table::Dataset;

pub const HOUR_COLUMN: &str = "Hour";
pub const WEEKDAY_COLUMN: &str = "Weekday";
pub const MONTH_COLUMN: &str = "Month";

/// Day names in calendar order, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFeatureStats {
    pub parsed: usize,
    pub unparsed: usize,
    pub missing: usize,
}

/// Parse `column` into a `Timestamp(Second)` column and append `Hour`,
/// `Weekday` and `Month`. A value that does not parse is null in all four.
#[tracing::instrument(level = "info", skip(ds))]
pub fn derive_time_features(ds: &Dataset, column: &str) -> Result<(Dataset, TimeFeatureStats)> {
    let raw = ds.string_values(column)?;

    let mut stats = TimeFeatureStats::default();
    let mut stamps = Vec::with_capacity(raw.len());
    let mut hours = Vec::with_capacity(raw.len());
    let mut weekdays = Vec::with_capacity(raw.len());
    let mut months = Vec::with_capacity(raw.len());

    for opt in raw.iter() {
        let parsed = match opt {
            None => {
                stats.missing += 1;
                None
            }
            Some(s) => {
                let dt = parse_datetime(s);
                if dt.is_some() {
                    stats.parsed += 1;
                } else {
                    stats.unparsed += 1;
                }
                dt
            }
        };
        stamps.push(parsed.map(|dt| dt.and_utc().timestamp()));
        hours.push(parsed.map(|dt| dt.hour() as i32));
        weekdays.push(parsed.map(|dt| weekday_name(dt.weekday())));
        months.push(parsed.map(|dt| dt.month() as i32));
    }

    if stats.unparsed > 0 {
        warn!(
            column,
            unparsed = stats.unparsed,
            "values could not be parsed as datetimes; left null"
        );
    }

    let out = ds
        .with_column(column, Arc::new(TimestampSecondArray::from(stamps)) as ArrayRef)?
        .with_column(HOUR_COLUMN, Arc::new(Int32Array::from(hours)) as ArrayRef)?
        .with_column(WEEKDAY_COLUMN, Arc::new(StringArray::from(weekdays)) as ArrayRef)?
        .with_column(MONTH_COLUMN, Arc::new(Int32Array::from(months)) as ArrayRef)?;

    info!(parsed = stats.parsed, missing = stats.missing, "derived time features");
    Ok((out, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::AsArray,
        datatypes::{DataType, Field, Int32Type, Schema, TimeUnit},
        record_batch::RecordBatch,
    };

    fn dataset(times: Vec<Option<&str>>) -> Dataset {
        let schema = Schema::new(vec![Field::new("Start_Time", DataType::Utf8, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(times)) as ArrayRef],
        )
        .unwrap();
        Dataset::new(batch)
    }

    #[test]
    fn derives_hour_weekday_month() -> Result<()> {
        // 2016-02-08 was a Monday, 2023-03-31 a Friday
        let ds = dataset(vec![
            Some("2016-02-08 05:46:00"),
            Some("2023-03-31 23:59:59.000000000"),
        ]);
        let (out, stats) = derive_time_features(&ds, "Start_Time")?;

        assert_eq!(stats.parsed, 2);
        assert_eq!(
            out.column_names(),
            vec!["Start_Time", "Hour", "Weekday", "Month"]
        );
        assert_eq!(
            out.column("Start_Time")?.data_type(),
            &DataType::Timestamp(TimeUnit::Second, None)
        );

        let hours = out.column(HOUR_COLUMN)?.as_primitive::<Int32Type>();
        assert_eq!(hours.values().to_vec(), vec![5, 23]);
        let months = out.column(MONTH_COLUMN)?.as_primitive::<Int32Type>();
        assert_eq!(months.values().to_vec(), vec![2, 3]);
        let days = out.column(WEEKDAY_COLUMN)?.as_string::<i32>();
        assert_eq!(days.value(0), "Monday");
        assert_eq!(days.value(1), "Friday");
        Ok(())
    }

    #[test]
    fn bad_and_missing_values_become_null() -> Result<()> {
        let ds = dataset(vec![Some("yesterday"), None, Some("2020-01-01 00:00:00")]);
        let (out, stats) = derive_time_features(&ds, "Start_Time")?;

        assert_eq!(
            stats,
            TimeFeatureStats {
                parsed: 1,
                unparsed: 1,
                missing: 1
            }
        );
        for name in ["Start_Time", HOUR_COLUMN, WEEKDAY_COLUMN, MONTH_COLUMN] {
            assert_eq!(out.column(name)?.null_count(), 2, "{}", name);
        }
        Ok(())
    }

    #[test]
    fn missing_time_column_is_an_error() {
        let ds = dataset(vec![Some("2020-01-01")]);
        assert!(derive_time_features(&ds, "End_Time").is_err());
    }
}
