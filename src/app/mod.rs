// logtriage - app/mod.rs
//
// Application layer: run orchestration and the stateful tail watcher.

pub mod pipeline;
pub mod tail;
