use anyhow::Result;
use arrow::{array::Array, datatypes::DataType};
use rayon::prelude::*;

use super::{finite_values, mean, quantile_sorted, sort_values, std_dev};
use crate::table::Dataset;

/// One row of the `info` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: String,
}

/// One row of the `describe` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

fn is_numeric(ty: &DataType) -> bool {
    matches!(
        ty,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn column_info(ds: &Dataset) -> Vec<ColumnInfo> {
    ds.schema()
        .fields()
        .iter()
        .zip(ds.batch().columns())
        .map(|(f, c)| ColumnInfo {
            name: f.name().clone(),
            non_null: c.len() - c.null_count(),
            dtype: format!("{:?}", f.data_type()),
        })
        .collect()
}

pub fn summarize(name: &str, values: &[Option<f64>]) -> ColumnSummary {
    let mut v = finite_values(values);
    sort_values(&mut v);
    ColumnSummary {
        name: name.to_string(),
        count: v.len(),
        mean: mean(&v),
        std: std_dev(&v),
        min: v.first().copied().unwrap_or(f64::NAN),
        q25: quantile_sorted(&v, 0.25),
        q50: quantile_sorted(&v, 0.5),
        q75: quantile_sorted(&v, 0.75),
        max: v.last().copied().unwrap_or(f64::NAN),
    }
}

/// Count, mean, std, min, quartiles and max for every numeric column.
pub fn describe(ds: &Dataset) -> Result<Vec<ColumnSummary>> {
    let numeric: Vec<String> = ds
        .schema()
        .fields()
        .iter()
        .filter(|f| is_numeric(f.data_type()))
        .map(|f| f.name().clone())
        .collect();

    numeric
        .par_iter()
        .map(|name| -> Result<ColumnSummary> { Ok(summarize(name, &ds.f64_values(name)?)) })
        .collect()
}
