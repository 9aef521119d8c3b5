pub mod dashboard;
pub mod query;
pub mod resources;
pub mod staged;
