pub mod progress;
pub mod runner;

pub use progress::*;
pub use runner::*;
