pub mod query;
pub mod responses;

pub use query::*;
pub use responses::*;
