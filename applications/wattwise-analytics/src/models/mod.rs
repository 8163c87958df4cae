pub mod metric;
pub mod reading;

pub use metric::Metric;
pub use reading::{parse_timestamp, readings_from_json, Reading};
