pub mod coords;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod history;
pub mod state;
