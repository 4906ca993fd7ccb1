// pbir-filters - app/mod.rs
//
// Application layer: batch operations over discovered reports and the
// default pipeline that strings them together.

pub mod pipeline;
pub mod reconcile;
pub mod summary;
