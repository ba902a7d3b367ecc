pub mod config;
pub mod morning;
pub mod recover;
pub mod reflect;
pub mod stats;
