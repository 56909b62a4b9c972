use anyhow::Result;
use arrow::{
    array::{Array, ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Narrowest type every non-null value of `arr` fits. All-null columns stay text.
pub fn infer_column_type(arr: &StringArray) -> DataType {
    let mut values = arr.iter().flatten().map(clean_str).peekable();
    if values.peek().is_none() {
        return DataType::Utf8;
    }

    let (mut int_ok, mut float_ok, mut bool_ok) = (true, true, true);
    for s in values {
        if int_ok && s.parse::<i64>().is_err() {
            int_ok = false;
        }
        if float_ok && !int_ok && s.parse::<f64>().is_err() {
            float_ok = false;
        }
        if bool_ok && parse_bool(s).is_none() {
            bool_ok = false;
        }
        if !int_ok && !float_ok && !bool_ok {
            return DataType::Utf8;
        }
    }

    if int_ok {
        DataType::Int64
    } else if float_ok {
        DataType::Float64
    } else if bool_ok {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

fn convert_column(arr: &StringArray, ty: &DataType) -> ArrayRef {
    match ty {
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(arr.len());
            for opt in arr.iter() {
                b.append_option(opt.and_then(|s| clean_str(s).parse().ok()));
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(arr.len());
            for opt in arr.iter() {
                b.append_option(opt.and_then(|s| clean_str(s).parse().ok()));
            }
            Arc::new(b.finish())
        }
        DataType::Boolean => {
            let mut b = BooleanBuilder::with_capacity(arr.len());
            for opt in arr.iter() {
                b.append_option(opt.and_then(|s| parse_bool(clean_str(s))));
            }
            Arc::new(b.finish())
        }
        _ => Arc::new(arr.clone()),
    }
}

/// Convert the all-text batch produced by the CSV reader into typed columns.
pub fn promote_types(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();

    let converted: Vec<(Field, ArrayRef)> = schema
        .fields()
        .par_iter()
        .zip(batch.columns().par_iter())
        .map(|(field, col)| match col.as_any().downcast_ref::<StringArray>() {
            Some(sarr) => {
                let ty = infer_column_type(sarr);
                debug!(column = %field.name(), dtype = ?ty, "inferred");
                (
                    Field::new(field.name(), ty.clone(), true),
                    convert_column(sarr, &ty),
                )
            }
            None => (Field::clone(field), col.clone()),
        })
        .collect();

    let (fields, columns): (Vec<Field>, Vec<ArrayRef>) = converted.into_iter().unzip();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_quotes_and_whitespace() {
        assert_eq!(clean_str("  \"Fair\" "), "Fair");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" 10.0"), "10.0");
    }

    #[test]
    fn picks_narrowest_type() {
        let ints = StringArray::from(vec![Some("1"), None, Some(" 4 ")]);
        assert_eq!(infer_column_type(&ints), DataType::Int64);

        let floats = StringArray::from(vec![Some("1"), Some("2.5"), Some("-3e2")]);
        assert_eq!(infer_column_type(&floats), DataType::Float64);

        let bools = StringArray::from(vec![Some("True"), Some("false"), None]);
        assert_eq!(infer_column_type(&bools), DataType::Boolean);

        let text = StringArray::from(vec![Some("1"), Some("Fair")]);
        assert_eq!(infer_column_type(&text), DataType::Utf8);

        let nulls = StringArray::from(vec![None::<&str>, None]);
        assert_eq!(infer_column_type(&nulls), DataType::Utf8);
    }

    #[test]
    fn promotes_whole_batch() {
        let schema = Schema::new(vec![
            Field::new("n", DataType::Utf8, true),
            Field::new("s", DataType::Utf8, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("0.5"), None])) as ArrayRef,
                Arc::new(StringArray::from(vec![Some("Clear"), Some("Rain")])) as ArrayRef,
            ],
        )
        .unwrap();

        let typed = promote_types(&batch).unwrap();
        assert_eq!(typed.schema().field(0).data_type(), &DataType::Float64);
        assert_eq!(typed.schema().field(1).data_type(), &DataType::Utf8);
        assert_eq!(typed.column(0).null_count(), 1);
    }
}
