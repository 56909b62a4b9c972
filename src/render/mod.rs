use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

pub mod bar;
pub mod hist;
pub mod matrix;
pub mod palette;

pub use bar::BarChart;
pub use hist::HistogramChart;
pub use matrix::CorrelationHeatmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ChartFormat::Png),
            "svg" => Ok(ChartFormat::Svg),
            other => Err(format!("unknown chart format `{}` (png | svg)", other)),
        }
    }
}

/// Something that can be drawn onto any plotters backend.
pub trait Figure {
    fn size(&self) -> (u32, u32);

    fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// The six charts of a run.
#[derive(Debug, Clone)]
pub enum Chart {
    Bar(BarChart),
    Histogram(HistogramChart),
    Correlation(CorrelationHeatmap),
}

impl Figure for Chart {
    fn size(&self) -> (u32, u32) {
        match self {
            Chart::Bar(c) => c.size(),
            Chart::Histogram(c) => c.size(),
            Chart::Correlation(c) => c.size(),
        }
    }

    fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        match self {
            Chart::Bar(c) => c.draw(root),
            Chart::Histogram(c) => c.draw(root),
            Chart::Correlation(c) => c.draw(root),
        }
    }
}

pub fn render_to_file<F: Figure>(figure: &F, path: &Path, format: ChartFormat) -> Result<()> {
    let size = figure.size();
    let drawn = match format {
        ChartFormat::Png => figure.draw(BitMapBackend::new(path, size).into_drawing_area()),
        ChartFormat::Svg => figure.draw(SVGBackend::new(path, size).into_drawing_area()),
    };
    drawn.with_context(|| format!("rendering {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_round_trips_through_text() {
        assert_eq!("PNG".parse::<ChartFormat>(), Ok(ChartFormat::Png));
        assert_eq!("svg".parse::<ChartFormat>(), Ok(ChartFormat::Svg));
        assert!("gif".parse::<ChartFormat>().is_err());
        assert_eq!(ChartFormat::Svg.to_string(), "svg");
    }

    /// Shapes only, so it draws without any font installed.
    struct Swatch;

    impl Figure for Swatch {
        fn size(&self) -> (u32, u32) {
            (40, 20)
        }

        fn draw<DB>(&self, root: DrawingArea<DB, Shift>) -> Result<()>
        where
            DB: DrawingBackend,
            DB::ErrorType: 'static,
        {
            root.fill(&WHITE)?;
            root.draw(&Rectangle::new([(5, 5), (35, 15)], palette::ORANGE.filled()))?;
            root.present()?;
            Ok(())
        }
    }

    #[test]
    fn writes_both_formats() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let svg = dir.path().join("swatch.svg");
        render_to_file(&Swatch, &svg, ChartFormat::Svg)?;
        let body = std::fs::read_to_string(&svg)?;
        assert!(body.contains("<svg"));
        assert!(body.contains("<rect"));

        let png = dir.path().join("swatch.png");
        render_to_file(&Swatch, &png, ChartFormat::Png)?;
        let bytes = std::fs::read(&png)?;
        assert!(bytes.starts_with(b"\x89PNG"));
        Ok(())
    }
}
