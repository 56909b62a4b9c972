use super::{quantile_sorted, sort_values, std_dev};

/// Equal-width bins. `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, .., last] => (last - first) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn range(&self) -> (f64, f64) {
        (
            self.edges.first().copied().unwrap_or(0.0),
            self.edges.last().copied().unwrap_or(1.0),
        )
    }
}

/// Density estimate sampled on a grid, scaled to histogram counts.
#[derive(Debug, Clone, PartialEq)]
pub struct KdeCurve {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

const KDE_GRID_POINTS: usize = 200;
const KDE_PREBIN: usize = 2048;

/// Bin count chosen like numpy's `"auto"`: the narrower of the Sturges and
/// Freedman–Diaconis widths, Sturges alone when the IQR is zero.
pub fn auto_bin_count(sorted: &[f64], max_bins: usize) -> usize {
    let n = sorted.len();
    if n == 0 {
        return 1;
    }
    let range = sorted[n - 1] - sorted[0];
    if range <= 0.0 {
        return 1;
    }

    let sturges = range / ((n as f64).log2() + 1.0);
    let iqr = quantile_sorted(sorted, 0.75) - quantile_sorted(sorted, 0.25);
    let fd = 2.0 * iqr / (n as f64).cbrt();
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };

    ((range / width).ceil() as usize).clamp(1, max_bins.max(1))
}

/// Histogram of the finite values in `values`, or `None` when there are none.
pub fn histogram(values: &[f64], max_bins: usize) -> Option<Histogram> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sort_values(&mut sorted);

    let (mut lo, mut hi) = (sorted[0], sorted[sorted.len() - 1]);
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let bins = auto_bin_count(&sorted, max_bins);
    let width = (hi - lo) / bins as f64;

    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    edges[bins] = hi;
    let mut counts = vec![0u64; bins];
    for v in &sorted {
        // last bin is closed on the right
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram { edges, counts })
}

/// Gaussian KDE with Scott's bandwidth over the data range.
///
/// Values are first binned on a fine grid so evaluation cost does not grow
/// with the sample. Returns `None` for fewer than two values or zero variance.
pub fn kde(values: &[f64], bin_width: f64) -> Option<KdeCurve> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = data.len();
    if n < 2 {
        return None;
    }
    let sigma = std_dev(&data);
    if sigma.is_nan() || sigma <= 0.0 {
        return None;
    }
    let bandwidth = sigma * (n as f64).powf(-0.2);

    let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let step = (hi - lo) / KDE_PREBIN as f64;
    let mut weights = vec![0u64; KDE_PREBIN];
    for v in &data {
        let idx = (((v - lo) / step) as usize).min(KDE_PREBIN - 1);
        weights[idx] += 1;
    }
    let centers: Vec<(f64, f64)> = weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w > 0)
        .map(|(i, w)| (lo + step * (i as f64 + 0.5), *w as f64))
        .collect();

    let norm = 1.0 / (bandwidth * (2.0 * std::f64::consts::PI).sqrt() * n as f64);
    let scale = n as f64 * bin_width;

    let grid_step = (hi - lo) / (KDE_GRID_POINTS - 1) as f64;
    let xs: Vec<f64> = (0..KDE_GRID_POINTS)
        .map(|i| lo + grid_step * i as f64)
        .collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|x| {
            let density: f64 = centers
                .iter()
                .map(|(c, w)| {
                    let z = (x - c) / bandwidth;
                    w * (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            density * scale
        })
        .collect();

    Some(KdeCurve { xs, ys })
}
