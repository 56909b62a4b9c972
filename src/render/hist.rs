use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::Figure;
use crate::stats::histogram::{Histogram, KdeCurve};

/// Histogram bars with an optional density curve on top.
#[derive(Debug, Clone)]
pub struct HistogramChart {
    pub title: String,
    pub x_desc: String,
    pub histogram: Option<Histogram>,
    pub kde: Option<KdeCurve>,
    pub color: RGBColor,
    pub size: (u32, u32),
}

impl Figure for HistogramChart {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let (x_lo, x_hi) = self
            .histogram
            .as_ref()
            .map(Histogram::range)
            .unwrap_or((0.0, 1.0));
        let peak_bar = self.histogram.as_ref().map_or(0, Histogram::max_count) as f64;
        let peak_kde = self
            .kde
            .as_ref()
            .map(|k| k.ys.iter().copied().fold(0.0, f64::max))
            .unwrap_or(0.0);
        let y_max = (peak_bar.max(peak_kde) * 1.05).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(x_lo..x_hi, 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc("Count")
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        if let Some(hist) = &self.histogram {
            let fill = self.color.mix(0.5).filled();
            let edge = self.color.stroke_width(1);
            let bins = || {
                hist.edges
                    .windows(2)
                    .zip(&hist.counts)
                    .filter(|(_, c)| **c > 0)
                    .map(|(w, c)| [(w[0], 0.0), (w[1], *c as f64)])
            };
            chart.draw_series(bins().map(|r| Rectangle::new(r, fill)))?;
            // outlines only on coarse histograms; fine ones turn into a solid block
            if hist.counts.len() <= 100 {
                chart.draw_series(bins().map(|r| Rectangle::new(r, edge)))?;
            }
        }

        if let Some(kde) = &self.kde {
            chart.draw_series(LineSeries::new(
                kde.xs.iter().copied().zip(kde.ys.iter().copied()),
                self.color.stroke_width(2),
            ))?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{palette::ORANGE, render_to_file, ChartFormat};
    use crate::stats::histogram::{histogram, kde};

    #[test]
    #[ignore = "text rendering needs system fonts"]
    fn renders_with_and_without_data() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let values: Vec<f64> = (0..500).map(|i| (i % 50) as f64 / 5.0).collect();
        let h = histogram(&values, 1000);
        let curve = h.as_ref().and_then(|h| kde(&values, h.bin_width()));

        let mut chart = HistogramChart {
            title: "Accidents vs Visibility".into(),
            x_desc: "Visibility(mi)".into(),
            histogram: h,
            kde: curve,
            color: ORANGE,
            size: (500, 250),
        };
        let path = dir.path().join("hist.svg");
        render_to_file(&chart, &path, ChartFormat::Svg)?;
        assert!(std::fs::read_to_string(&path)?.contains("Accidents vs Visibility"));

        chart.histogram = None;
        chart.kde = None;
        let empty = dir.path().join("empty.svg");
        render_to_file(&chart, &empty, ChartFormat::Svg)?;
        assert!(empty.exists());
        Ok(())
    }
}
