use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, AsArray, StringArray},
    compute::cast,
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// The in-memory accident table. Every stage consumes and returns one of these.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| anyhow!("column `{}` not found", name))
    }

    /// Numeric view of a column. Integer and boolean columns are cast to f64;
    /// text that does not parse becomes `None`.
    pub fn f64_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.column(name)?;
        let as_f64 = cast(col, &DataType::Float64)
            .with_context(|| format!("casting `{}` to Float64", name))?;
        Ok(as_f64.as_primitive::<arrow::datatypes::Float64Type>().iter().collect())
    }

    pub fn string_values(&self, name: &str) -> Result<StringArray> {
        let col = self.column(name)?;
        let as_str =
            cast(col, &DataType::Utf8).with_context(|| format!("casting `{}` to Utf8", name))?;
        Ok(as_str.as_string::<i32>().clone())
    }

    /// Replace `name` in place if present, otherwise append it.
    pub fn with_column(&self, name: &str, array: ArrayRef) -> Result<Dataset> {
        if array.len() != self.num_rows() {
            return Err(anyhow!(
                "column `{}` has {} rows, table has {}",
                name,
                array.len(),
                self.num_rows()
            ));
        }
        let schema = self.batch.schema();
        let field = Arc::new(Field::new(name, array.data_type().clone(), true));

        let mut fields: Vec<Arc<Field>> = schema.fields().iter().cloned().collect();
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        match schema.index_of(name) {
            Ok(i) => {
                fields[i] = field;
                columns[i] = array;
            }
            Err(_) => {
                fields.push(field);
                columns.push(array);
            }
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
            .with_context(|| format!("adding column `{}`", name))?;
        Ok(Dataset { batch })
    }

    /// Keep every column except `names`. Returns the names that were not present.
    pub fn drop_columns(&self, names: &[String]) -> Result<(Dataset, Vec<String>)> {
        let schema = self.batch.schema();
        let missing: Vec<String> = names
            .iter()
            .filter(|n| schema.index_of(n).is_err())
            .cloned()
            .collect();

        let keep: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| !names.contains(f.name()))
            .map(|(i, _)| i)
            .collect();

        let batch = self.batch.project(&keep).context("projecting kept columns")?;
        Ok((Dataset { batch }, missing))
    }
}
