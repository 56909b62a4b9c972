use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::geo::HeatmapOptions;
use crate::render::ChartFormat;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Everything a run needs. Every field has a default, so a YAML file only
/// has to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub format: ChartFormat,
    pub batch_size: usize,
    pub print_summary: bool,
    pub drop_columns: Vec<String>,
    pub time_column: String,
    pub weather_column: String,
    pub top_weather: usize,
    pub visibility_column: String,
    pub temperature_column: String,
    pub max_bins: usize,
    pub correlation_columns: Vec<String>,
    pub map: MapConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub file_name: String,
    pub sample_size: usize,
    /// Fixed seed for reproducible sampling; random when absent.
    pub seed: Option<u64>,
    pub lat_column: String,
    pub lng_column: String,
    pub view: HeatmapOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("US_Accidents_March23.csv"),
            output_dir: PathBuf::from("."),
            format: ChartFormat::Png,
            batch_size: 65_536,
            print_summary: true,
            drop_columns: strings(&["ID", "Source", "Description", "Number", "Street", "City"]),
            time_column: "Start_Time".into(),
            weather_column: "Weather_Condition".into(),
            top_weather: 10,
            visibility_column: "Visibility(mi)".into(),
            temperature_column: "Temperature(F)".into(),
            max_bins: 2000,
            correlation_columns: strings(&[
                "Severity",
                "Temperature(F)",
                "Humidity(%)",
                "Pressure(in)",
                "Visibility(mi)",
                "Wind_Speed(mph)",
            ]),
            map: MapConfig::default(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            file_name: "us_accident_hotspots.html".into(),
            sample_size: 10_000,
            seed: None,
            lat_column: "Start_Lat".into(),
            lng_column: "Start_Lng".into(),
            view: HeatmapOptions::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(s).context("parsing YAML config")?;
        Ok(cfg)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if self.top_weather == 0 {
            bail!("top_weather must be positive");
        }
        if self.max_bins == 0 {
            bail!("max_bins must be positive");
        }
        if self.correlation_columns.len() < 2 {
            bail!(
                "correlation needs at least two columns, got {}",
                self.correlation_columns.len()
            );
        }
        if self.map.sample_size == 0 {
            bail!("map.sample_size must be positive");
        }
        if self.map.file_name.trim().is_empty() {
            bail!("map.file_name must not be empty");
        }

        let view = &self.map.view;
        let [lat, lng] = view.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            bail!("map.view.center {:?} is not a valid [lat, lng]", view.center);
        }
        if view.zoom > 18 || view.max_zoom > 18 {
            bail!("map zoom levels must be at most 18");
        }
        if !(0.0..=1.0).contains(&view.min_opacity) {
            bail!("map.view.min_opacity must be within [0, 1]");
        }
        if view.radius == 0 {
            bail!("map.view.radius must be positive");
        }
        Ok(())
    }

    pub fn chart_path(&self, stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", stem, self.format.extension()))
    }

    pub fn heatmap_path(&self) -> PathBuf {
        self.output_dir.join(&self.map.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.drop_columns.len(), 6);
        assert_eq!(cfg.map.sample_size, 10_000);
        assert_eq!(cfg.map.view.center, [39.8283, -98.5795]);
        assert_eq!(cfg.chart_path("accidents_by_hour"), PathBuf::from("./accidents_by_hour.png"));
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let cfg = Config::from_yaml_str(
            "input: data/sample.csv\nformat: svg\nmap:\n  sample_size: 500\n  seed: 9\n  view:\n    radius: 12\n",
        )?;
        assert_eq!(cfg.input, PathBuf::from("data/sample.csv"));
        assert_eq!(cfg.format, ChartFormat::Svg);
        assert_eq!(cfg.map.sample_size, 500);
        assert_eq!(cfg.map.seed, Some(9));
        assert_eq!(cfg.map.view.radius, 12);
        assert_eq!(cfg.map.view.zoom, 4);
        assert_eq!(cfg.time_column, "Start_Time");
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml_str("inptu: typo.csv\n").is_err());
        assert!(Config::from_yaml_str("map:\n  sampel_size: 3\n").is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = Config::default();
        cfg.map.sample_size = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.correlation_columns = vec!["Severity".into()];
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.map.view.center = [120.0, 0.0];
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.map.view.min_opacity = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn reads_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("accidents.yaml");
        fs::write(&path, "top_weather: 5\n")?;
        assert_eq!(Config::from_yaml_file(&path)?.top_weather, 5);
        assert!(Config::from_yaml_file(dir.path().join("missing.yaml")).is_err());
        Ok(())
    }
}
