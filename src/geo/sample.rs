use anyhow::Result;
use rand::{seq::index, seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::table::Dataset;

/// One accident location. Serializes as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint(pub f64, pub f64);

impl GeoPoint {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-90.0..=90.0).contains(&self.0)
            && (-180.0..=180.0).contains(&self.1)
    }
}

/// Rows where both coordinates are present and on the globe.
pub fn collect_points(ds: &Dataset, lat_column: &str, lng_column: &str) -> Result<Vec<GeoPoint>> {
    let lats = ds.f64_values(lat_column)?;
    let lngs = ds.f64_values(lng_column)?;

    let points: Vec<GeoPoint> = lats
        .into_iter()
        .zip(lngs)
        .filter_map(|(lat, lng)| Some(GeoPoint(lat?, lng?)))
        .filter(GeoPoint::is_valid)
        .collect();
    debug!(
        rows = ds.num_rows(),
        usable = points.len(),
        "collected coordinates"
    );
    Ok(points)
}

/// Uniform sample of `n` points without replacement. With fewer than `n`
/// points available, all of them come back in random order.
pub fn sample_points<R: Rng + ?Sized>(points: &[GeoPoint], n: usize, rng: &mut R) -> Vec<GeoPoint> {
    if points.len() <= n {
        if points.len() < n {
            warn!(
                requested = n,
                available = points.len(),
                "fewer points than the sample size; using all of them"
            );
        }
        let mut all = points.to_vec();
        all.shuffle(rng);
        return all;
    }
    index::sample(rng, points.len(), n)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{ArrayRef, Float64Array},
        datatypes::{DataType, Field, Schema},
        record_batch::RecordBatch,
    };
    use rand::{rngs::StdRng, SeedableRng};
    use std::{collections::HashSet, sync::Arc};

    fn grid(n: usize) -> Vec<GeoPoint> {
        (0..n).map(|i| GeoPoint(30.0 + i as f64 * 1e-3, -100.0)).collect()
    }

    #[test]
    fn drops_incomplete_and_out_of_range_rows() -> Result<()> {
        let schema = Schema::new(vec![
            Field::new("Start_Lat", DataType::Float64, true),
            Field::new("Start_Lng", DataType::Float64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Float64Array::from(vec![
                    Some(39.86),
                    None,
                    Some(39.1),
                    Some(95.0),
                ])) as ArrayRef,
                Arc::new(Float64Array::from(vec![
                    Some(-84.06),
                    Some(-84.0),
                    None,
                    Some(-84.0),
                ])) as ArrayRef,
            ],
        )?;
        let points = collect_points(&Dataset::new(batch), "Start_Lat", "Start_Lng")?;
        assert_eq!(points, vec![GeoPoint(39.86, -84.06)]);
        Ok(())
    }

    #[test]
    fn sample_is_distinct_and_sized() {
        let points = grid(5000);
        let mut rng = StdRng::seed_from_u64(7);
        let sample = sample_points(&points, 1000, &mut rng);
        assert_eq!(sample.len(), 1000);

        let distinct: HashSet<u64> = sample.iter().map(|p| p.lat().to_bits()).collect();
        assert_eq!(distinct.len(), 1000);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let points = grid(300);
        let a = sample_points(&points, 50, &mut StdRng::seed_from_u64(42));
        let b = sample_points(&points, 50, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn short_input_returns_everything() {
        let points = grid(10);
        let sample = sample_points(&points, 10_000, &mut StdRng::seed_from_u64(1));
        assert_eq!(sample.len(), 10);
        assert!(sample_points(&[], 5, &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn points_serialize_as_pairs() {
        let json = serde_json::to_string(&vec![GeoPoint(1.5, -2.0)]).unwrap();
        assert_eq!(json, "[[1.5,-2.0]]");
    }
}
