pub mod config;
pub mod geo;
pub mod load;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod stats;
pub mod summary;
pub mod table;
