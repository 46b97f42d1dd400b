mod health;
mod meter;

pub use health::{about, health_check};
pub use meter::{add_usage, billing_stats};
