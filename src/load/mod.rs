// src/load/mod.rs
use anyhow::{Context, Result};
use arrow::{
    compute::concat_batches,
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
};
use std::{fs::File, path::Path, sync::Arc, time::Instant};
use tracing::{debug, info};

use crate::table::Dataset;

pub mod infer;

/// Read the header row only; every column name, in file order.
pub fn read_headers<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read CSV header of {:?}", path))?;
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

/// Load `path` into a single in-memory table.
///
/// Every column is first read as nullable text (empty fields are null), then
/// promoted to Int64 / Float64 / Boolean where all of its values allow it.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Dataset> {
    let path = path.as_ref();
    let start = Instant::now();

    // 1) header → all-Utf8 schema
    let headers = read_headers(path)?;
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| Field::new(h, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    debug!(columns = headers.len(), "read header");

    // 2) stream the body as text batches
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(batch_size)
        .build(file)
        .with_context(|| format!("Failed to build CSV reader for {:?}", path))?;

    let mut batches = Vec::new();
    for (idx, batch) in reader.enumerate() {
        let batch =
            batch.with_context(|| format!("CSV parse error in {:?} at batch {}", path, idx))?;
        batches.push(batch);
    }
    let raw = concat_batches(&schema, &batches).context("concatenating CSV batches")?;
    drop(batches);

    // 3) promote column types
    let typed = infer::promote_types(&raw)?;

    info!(
        rows = typed.num_rows(),
        columns = typed.num_columns(),
        elapsed = ?start.elapsed(),
        "loaded"
    );
    Ok(Dataset::new(typed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(content.as_bytes()).unwrap();
        tmp
    }

    #[test]
    fn loads_and_promotes_columns() -> Result<()> {
        let tmp = write_csv(
            "ID,Severity,Start_Time,Temperature(F),Weather_Condition,Amenity\n\
             A-1,3,2016-02-08 05:46:00,42.1,Light Rain,False\n\
             A-2,2,2016-02-08 06:07:59,,Overcast,True\n\
             A-3,2,2016-02-08 06:49:27,36.0,,False\n",
        );
        let ds = load_csv(tmp.path(), 2)?;

        assert_eq!(ds.num_rows(), 3);
        assert_eq!(
            ds.column_names(),
            vec![
                "ID",
                "Severity",
                "Start_Time",
                "Temperature(F)",
                "Weather_Condition",
                "Amenity"
            ]
        );
        assert_eq!(ds.column("Severity")?.data_type(), &DataType::Int64);
        assert_eq!(ds.column("Temperature(F)")?.data_type(), &DataType::Float64);
        assert_eq!(ds.column("Amenity")?.data_type(), &DataType::Boolean);
        assert_eq!(ds.column("Start_Time")?.data_type(), &DataType::Utf8);
        assert_eq!(ds.column("Temperature(F)")?.null_count(), 1);
        assert_eq!(ds.column("Weather_Condition")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn header_only_file_is_an_empty_table() -> Result<()> {
        let tmp = write_csv("Start_Lat,Start_Lng\n");
        let ds = load_csv(tmp.path(), 1024)?;
        assert_eq!(ds.num_rows(), 0);
        assert_eq!(ds.num_columns(), 2);
        Ok(())
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let tmp = write_csv("a,b\n1,2\n3\n");
        assert!(load_csv(tmp.path(), 1024).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_csv("/definitely/not/here.csv", 1024).unwrap_err();
        assert!(format!("{:#}", err).contains("here.csv"));
    }
}
