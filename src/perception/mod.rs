pub mod resolver;
pub mod traits;
pub mod types;
