// logtriage - core/mod.rs
//
// Classification and cleaning engine.
// Pure logic except `split::flush`, which writes through the
// platform filesystem abstraction.
// Must NOT depend on: app or the CLI front-end.

pub mod classify;
pub mod junk;
pub mod model;
pub mod split;
