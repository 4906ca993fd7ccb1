// pbir-filters - lib.rs
//
// Library entry point. All logic lives here so it can be driven from tests
// without touching the disk as a side effect of loading the crate; `main.rs`
// only parses arguments, resolves configuration and dispatches.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
