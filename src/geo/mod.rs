pub mod heatmap;
pub mod sample;

pub use heatmap::{render_html, write_heatmap, HeatmapOptions};
pub use sample::{collect_points, sample_points, GeoPoint};
