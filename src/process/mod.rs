// src/process/mod.rs
pub mod date_parser;
pub mod features;
pub mod prune;
