pub mod billing;
pub mod cost;
pub mod health;
pub mod insights;
pub mod readings;
pub mod usage;
