// pbir-filters - platform/mod.rs
//
// Platform layer: configuration files and atomic document I/O.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
