// pbir-filters - core/mod.rs
//
// Core business logic layer.
// `discovery` walks the filesystem; every other module is pure logic over
// already-loaded documents.

pub mod aggregate;
pub mod discovery;
pub mod filters;
pub mod model;
pub mod models;
pub mod report;
