// crates/seismark-core/src/helpers/mod.rs

pub mod time;
