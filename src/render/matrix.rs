use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::palette::{contrasting_text, Colormap};
use super::Figure;
use crate::stats::correlation::CorrelationMatrix;

const COLORBAR_WIDTH: u32 = 130;
const NAN_COLOR: RGBColor = RGBColor(220, 220, 220);

/// Annotated matrix heat map with a colour bar on the right.
#[derive(Debug, Clone)]
pub struct CorrelationHeatmap {
    pub title: String,
    pub matrix: CorrelationMatrix,
    pub colormap: Colormap,
    pub size: (u32, u32),
}

impl CorrelationHeatmap {
    fn scale(&self) -> (f64, f64) {
        let (lo, hi) = self.matrix.finite_range();
        if hi > lo {
            (lo, hi)
        } else {
            (lo - 0.5, hi + 0.5)
        }
    }

    fn color_for(&self, v: f64) -> RGBColor {
        if !v.is_finite() {
            return NAN_COLOR;
        }
        let (lo, hi) = self.scale();
        self.colormap.at((v - lo) / (hi - lo))
    }
}

impl Figure for CorrelationHeatmap {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let root = root.titled(&self.title, ("sans-serif", 24))?;
        let (w, _) = root.dim_in_pixel();
        let (cells_area, bar_area) =
            root.split_horizontally(w.saturating_sub(COLORBAR_WIDTH) as i32);

        let labels = &self.matrix.labels;
        let n = labels.len().max(1);

        let mut chart = ChartBuilder::on(&cells_area)
            .margin(10)
            .x_label_area_size(70)
            .y_label_area_size(130)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

        // row 0 is drawn at the top
        let x_fmt = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let y_fmt = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) if *i < n => {
                labels.get(n - 1 - *i).cloned().unwrap_or_default()
            }
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style(("sans-serif", 13))
            .draw()?;

        let k = labels.len();
        let cells: Vec<(usize, usize, f64)> = (0..k)
            .flat_map(|row| (0..k).map(move |col| (row, col)))
            .map(|(row, col)| (row, col, self.matrix.get(row, col)))
            .collect();

        chart.draw_series(cells.iter().map(|&(row, col, v)| {
            let y = n - 1 - row;
            Rectangle::new(
                [
                    (SegmentValue::Exact(col), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(col + 1), SegmentValue::Exact(y + 1)),
                ],
                self.color_for(v).filled(),
            )
        }))?;

        let centered = Pos::new(HPos::Center, VPos::Center);
        chart.draw_series(cells.iter().map(|&(row, col, v)| {
            let text = if v.is_finite() {
                format!("{:.2}", v)
            } else {
                "nan".to_string()
            };
            let style = ("sans-serif", 16)
                .into_font()
                .color(&contrasting_text(self.color_for(v)))
                .pos(centered);
            Text::new(
                text,
                (SegmentValue::CenterOf(col), SegmentValue::CenterOf(n - 1 - row)),
                style,
            )
        }))?;

        self.draw_colorbar(&bar_area)?;

        root.present()?;
        Ok(())
    }
}

impl CorrelationHeatmap {
    fn draw_colorbar<DB>(&self, area: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        const STEPS: usize = 100;
        let (lo, hi) = self.scale();

        let mut bar = ChartBuilder::on(area)
            .margin_top(20)
            .margin_bottom(80)
            .margin_left(10)
            .margin_right(10)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..1.0, lo..hi)?;
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_label_formatter(&|v| format!("{:.2}", v))
            .label_style(("sans-serif", 12))
            .draw()?;

        let step = (hi - lo) / STEPS as f64;
        bar.draw_series((0..STEPS).map(|i| {
            let y0 = lo + step * i as f64;
            let t = (i as f64 + 0.5) / STEPS as f64;
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], self.colormap.at(t).filled())
        }))?;
        Ok(())
    }
}
