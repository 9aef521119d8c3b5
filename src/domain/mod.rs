pub mod error;
pub mod key;
pub mod model;
pub mod traits;
