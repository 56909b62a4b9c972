use anyhow::Result;
use prettytable::{format, Cell, Row, Table};

use crate::stats::describe::{column_info, describe, ColumnInfo, ColumnSummary};
use crate::table::Dataset;

fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
    }
}

fn header(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c).style_spec("bFg")).collect())
}

pub fn info_table(info: &[ColumnInfo]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(header(&["#", "Column", "Non-Null Count", "Dtype"]));
    for (i, col) in info.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&i.to_string()).style_spec("r"),
            Cell::new(&col.name),
            Cell::new(&format!("{} non-null", col.non_null)).style_spec("r"),
            Cell::new(&col.dtype),
        ]));
    }
    table
}

pub fn describe_table(summaries: &[ColumnSummary]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(header(&[
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]));
    for s in summaries {
        let mut cells = vec![
            Cell::new(&s.name),
            Cell::new(&s.count.to_string()).style_spec("r"),
        ];
        for v in [s.mean, s.std, s.min, s.q25, s.q50, s.q75, s.max] {
            cells.push(Cell::new(&fmt_stat(v)).style_spec("r"));
        }
        table.add_row(Row::new(cells));
    }
    table
}

/// Shape, column list, per-column info and numeric summary, to stdout.
#[tracing::instrument(level = "info", skip_all)]
pub fn print_summary(ds: &Dataset) -> Result<()> {
    println!("({}, {})", ds.num_rows(), ds.num_columns());
    println!("{:?}", ds.column_names());

    println!("\n--- Column Info ---");
    info_table(&column_info(ds)).printstd();

    let summaries = describe(ds)?;
    if summaries.is_empty() {
        println!("\nNo numeric columns to describe.");
    } else {
        println!("\n--- Numeric Summary ---");
        describe_table(&summaries).printstd();
    }
    Ok(())
}
