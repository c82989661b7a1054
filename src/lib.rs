pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod load;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use dataset::Dataset;
pub use pipeline::{run, Outcome};
