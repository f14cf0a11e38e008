pub mod diff;
pub mod history;
pub mod stage;

pub use diff::*;
pub use history::*;
pub use stage::*;
