pub mod catalog;
pub mod dates;
pub mod normalize;
pub mod payload;

// Re-export key types for convenience
#[allow(unused_imports)]
pub use payload::{MetricOption, MetricUnit, PayloadModel, SeriesData};
