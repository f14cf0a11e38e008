pub mod input;
pub mod output;

pub use input::*;
pub use output::*;
