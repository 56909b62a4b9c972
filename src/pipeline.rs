use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use std::{fs, path::PathBuf, time::Instant};
use tracing::info;

use crate::{
    config::Config,
    geo,
    load,
    process::{features, prune},
    render::{
        palette::{Colormap, ORANGE, SKY_BLUE},
        render_to_file, BarChart, Chart, CorrelationHeatmap, HistogramChart,
    },
    stats::{counts, correlation, finite_values, histogram},
    summary,
    table::Dataset,
};

/// What the data looked like on the way through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareStats {
    pub rows: usize,
    pub columns_loaded: usize,
    pub columns_missing: Vec<String>,
    pub times_unparsed: usize,
    pub times_missing: usize,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: PrepareStats,
    pub charts: Vec<PathBuf>,
    pub heatmap: PathBuf,
    pub points_available: usize,
    pub points_sampled: usize,
}

/// A chart plus the file stem it is saved under.
#[derive(Debug, Clone)]
pub struct NamedChart {
    pub stem: &'static str,
    pub chart: Chart,
}

/// Load, optionally print the summary, drop columns and derive time features.
#[tracing::instrument(level = "info", skip_all, fields(input = %config.input.display()))]
pub fn prepare(config: &Config) -> Result<(Dataset, PrepareStats)> {
    let ds = load::load_csv(&config.input, config.batch_size)?;
    let columns_loaded = ds.num_columns();

    if config.print_summary {
        summary::print_summary(&ds)?;
    }

    let (ds, columns_missing) = prune::drop_columns(&ds, &config.drop_columns)?;
    let (ds, time_stats) = features::derive_time_features(&ds, &config.time_column)?;

    let stats = PrepareStats {
        rows: ds.num_rows(),
        columns_loaded,
        columns_missing,
        times_unparsed: time_stats.unparsed,
        times_missing: time_stats.missing,
    };
    Ok((ds, stats))
}

fn distribution_chart(
    ds: &Dataset,
    config: &Config,
    column: &str,
    title: &str,
    color: plotters::style::RGBColor,
) -> Result<HistogramChart> {
    let values = finite_values(&ds.f64_values(column)?);
    let hist = histogram::histogram(&values, config.max_bins);
    let kde = hist
        .as_ref()
        .and_then(|h| histogram::kde(&values, h.bin_width()));
    Ok(HistogramChart {
        title: title.to_string(),
        x_desc: column.to_string(),
        histogram: hist,
        kde,
        color,
        size: (1000, 500),
    })
}

/// The six charts, in presentation order.
#[tracing::instrument(level = "info", skip_all)]
pub fn build_charts(ds: &Dataset, config: &Config) -> Result<Vec<NamedChart>> {
    let hourly = counts::hourly_counts(ds)?;
    let weekly = counts::weekday_counts(ds)?;
    let weather = counts::top_values(ds, &config.weather_column, config.top_weather)
        .context("top weather conditions")?;
    let corr = correlation::correlation_matrix(ds, &config.correlation_columns)
        .context("severity correlation")?;
    info!(rows_used = corr.rows_used, "correlation rows");

    let charts = vec![
        NamedChart {
            stem: "accidents_by_hour",
            chart: Chart::Bar(BarChart {
                title: "Accidents by Hour".into(),
                x_desc: Some("Hour of the Day".into()),
                y_desc: Some("Number of Accidents".into()),
                colors: Colormap::Plasma.discrete(hourly.labels.len()),
                counts: hourly,
                size: (1200, 600),
                grid: true,
                rotate_labels: false,
            }),
        },
        NamedChart {
            stem: "accidents_by_weekday",
            chart: Chart::Bar(BarChart {
                title: "Accidents by Day of Week".into(),
                x_desc: Some("Day of Week".into()),
                y_desc: Some("Number of Accidents".into()),
                colors: Colormap::Viridis.discrete(weekly.labels.len()),
                counts: weekly,
                size: (1200, 600),
                grid: true,
                rotate_labels: false,
            }),
        },
        NamedChart {
            stem: "top_weather_conditions",
            chart: Chart::Bar(BarChart {
                title: "Top Weather Conditions during Accidents".into(),
                x_desc: None,
                y_desc: None,
                colors: Colormap::Coolwarm.discrete(weather.labels.len()),
                counts: weather,
                size: (1500, 600),
                grid: false,
                rotate_labels: true,
            }),
        },
        NamedChart {
            stem: "visibility_distribution",
            chart: Chart::Histogram(distribution_chart(
                ds,
                config,
                &config.visibility_column,
                "Accidents vs Visibility",
                ORANGE,
            )?),
        },
        NamedChart {
            stem: "temperature_distribution",
            chart: Chart::Histogram(distribution_chart(
                ds,
                config,
                &config.temperature_column,
                "Accidents vs Temperature",
                SKY_BLUE,
            )?),
        },
        NamedChart {
            stem: "severity_correlation",
            chart: Chart::Correlation(CorrelationHeatmap {
                title: "Correlation Between Severity and Environmental Factors".into(),
                matrix: corr,
                colormap: Colormap::YlGnBu,
                size: (1000, 600),
            }),
        },
    ];
    Ok(charts)
}

/// Write each chart under the output directory; returns the paths in order.
pub fn render_charts(charts: &[NamedChart], config: &Config) -> Result<Vec<PathBuf>> {
    charts
        .par_iter()
        .map(|c| -> Result<PathBuf> {
            let path = config.chart_path(c.stem);
            let start = Instant::now();
            render_to_file(&c.chart, &path, config.format)?;
            info!(path = %path.display(), elapsed = ?start.elapsed(), "chart written");
            Ok(path)
        })
        .collect()
}

/// Sample coordinates and write the heat-map page.
/// Returns the page path, the usable point count and the sample size.
#[tracing::instrument(level = "info", skip_all)]
pub fn write_hotspots(ds: &Dataset, config: &Config) -> Result<(PathBuf, usize, usize)> {
    let points = geo::collect_points(ds, &config.map.lat_column, &config.map.lng_column)?;
    let mut rng = match config.map.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sample = geo::sample_points(&points, config.map.sample_size, &mut rng);

    let path = config.heatmap_path();
    geo::write_heatmap(&path, &sample, &config.map.view)?;
    Ok((path, points.len(), sample.len()))
}

/// The whole run: prepare, six charts, heat map.
#[tracing::instrument(level = "info", skip_all)]
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let start = Instant::now();

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let (ds, stats) = prepare(config)?;
    let charts = build_charts(&ds, config)?;
    let chart_paths = render_charts(&charts, config)?;
    let (heatmap, points_available, points_sampled) = write_hotspots(&ds, config)?;

    info!(
        rows = stats.rows,
        charts = chart_paths.len(),
        sampled = points_sampled,
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunReport {
        stats,
        charts: chart_paths,
        heatmap,
        points_available,
        points_sampled,
    })
}
