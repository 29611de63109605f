// logtriage - platform/mod.rs
//
// Platform layer: filesystem access and configuration resolution.

pub mod config;
pub mod fs;
