use anyhow::Result;
use tracing::debug;

use crate::table::Dataset;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` × `labels.len()`. NaN where a column is constant.
    pub values: Vec<Vec<f64>>,
    /// Rows with every column present.
    pub rows_used: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Smallest and largest finite coefficient; (0, 1) when there are none.
    pub fn finite_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.values.iter().flatten().filter(|v| v.is_finite()) {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
        if lo.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    }
}

/// Pearson coefficients between `columns`, keeping only rows where every
/// column holds a finite value.
pub fn pearson(columns: &[Vec<Option<f64>>]) -> (Vec<Vec<f64>>, usize) {
    let k = columns.len();
    let n = columns.iter().map(Vec::len).min().unwrap_or(0);

    let rows: Vec<Vec<f64>> = (0..n)
        .filter_map(|r| {
            columns
                .iter()
                .map(|c| c[r].filter(|v| v.is_finite()))
                .collect::<Option<Vec<f64>>>()
        })
        .collect();
    let m = rows.len();

    let means: Vec<f64> = (0..k)
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / m as f64)
        .collect();

    let mut cov = vec![vec![0.0; k]; k];
    for r in &rows {
        for i in 0..k {
            let di = r[i] - means[i];
            for j in i..k {
                cov[i][j] += di * (r[j] - means[j]);
            }
        }
    }

    let mut out = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let denom = (cov[i][i] * cov[j][j]).sqrt();
            let v = if m > 1 && denom > 0.0 {
                (cov[i][j] / denom).clamp(-1.0, 1.0)
            } else {
                f64::NAN
            };
            out[i][j] = v;
            out[j][i] = v;
        }
    }
    (out, m)
}

/// Correlation matrix of the named numeric columns.
pub fn correlation_matrix(ds: &Dataset, names: &[String]) -> Result<CorrelationMatrix> {
    let columns = names
        .iter()
        .map(|n| ds.f64_values(n))
        .collect::<Result<Vec<_>>>()?;
    let (values, rows_used) = pearson(&columns);
    debug!(rows_used, columns = names.len(), "correlation computed");
    Ok(CorrelationMatrix {
        labels: names.to_vec(),
        values,
        rows_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(v: &[Option<f64>]) -> Vec<Option<f64>> {
        v.to_vec()
    }

    #[test]
    fn perfect_and_inverse_relationships() {
        let a = col(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let b = col(&[Some(2.0), Some(4.0), Some(6.0), Some(8.0)]);
        let c = col(&[Some(4.0), Some(3.0), Some(2.0), Some(1.0)]);
        let (m, used) = pearson(&[a, b, c]);

        assert_eq!(used, 4);
        assert!((m[0][0] - 1.0).abs() < 1e-12);
        assert!((m[0][1] - 1.0).abs() < 1e-12);
        assert!((m[0][2] + 1.0).abs() < 1e-12);
        assert_eq!(m[1][2], m[2][1]);
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let a = col(&[Some(1.0), None, Some(3.0), Some(5.0)]);
        let b = col(&[Some(1.0), Some(9.0), Some(2.0), Some(f64::NAN)]);
        let (_, used) = pearson(&[a, b]);
        assert_eq!(used, 2);
    }

    #[test]
    fn constant_column_is_nan() {
        let a = col(&[Some(1.0), Some(2.0), Some(3.0)]);
        let b = col(&[Some(5.0), Some(5.0), Some(5.0)]);
        let (m, _) = pearson(&[a, b]);
        assert!(m[0][1].is_nan());
        assert!(m[1][1].is_nan());
        assert!((m[0][0] - 1.0).abs() < 1e-12);

        let cm = CorrelationMatrix {
            labels: vec!["a".into(), "b".into()],
            values: m,
            rows_used: 3,
        };
        assert_eq!(cm.finite_range(), (1.0, 1.0));
    }
}
