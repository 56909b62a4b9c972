use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::Figure;
use crate::stats::counts::CategoryCounts;

/// Vertical bars, one per category, each with its own colour.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_desc: Option<String>,
    pub y_desc: Option<String>,
    pub counts: CategoryCounts,
    pub colors: Vec<RGBColor>,
    pub size: (u32, u32),
    pub grid: bool,
    pub rotate_labels: bool,
}

impl Figure for BarChart {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let labels = &self.counts.labels;
        let n = labels.len().max(1);
        let y_max = ((self.counts.max() as f64 * 1.05).ceil() as u64).max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 26))
            .margin(15)
            .x_label_area_size(if self.rotate_labels { 140 } else { 50 })
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), 0u64..y_max)?;

        let formatter = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let label_font = if self.rotate_labels {
            TextStyle::from(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
        } else {
            TextStyle::from(("sans-serif", 14).into_font())
        };

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(n)
            .x_label_formatter(&formatter)
            .x_label_style(label_font);
        if !self.grid {
            mesh.disable_x_mesh().disable_y_mesh();
        }
        if let Some(desc) = &self.x_desc {
            mesh.x_desc(desc);
        }
        if let Some(desc) = &self.y_desc {
            mesh.y_desc(desc);
        }
        mesh.draw()?;

        let default_color = [RGBColor(31, 119, 180)];
        let colors: &[RGBColor] = if self.colors.is_empty() {
            &default_color
        } else {
            &self.colors
        };
        chart.draw_series(self.counts.counts.iter().enumerate().map(|(i, &count)| {
            let color = colors[i % colors.len()];
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), count)],
                color.filled(),
            );
            bar.set_margin(0, 0, 4, 4);
            bar
        }))?;

        root.present()?;
        Ok(())
    }
}
